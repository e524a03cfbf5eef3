//! Outbound email notifications.
//!
//! [`Notifier`] abstracts delivery so the service layer can be tested
//! without a mail server; [`SmtpMailer`] is the SMTP implementation
//! used in production.

pub mod smtp;

use async_trait::async_trait;

use crate::domain::Task;

pub use smtp::SmtpMailer;

/// Error sending a notification email.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The recipient or sender address could not be parsed.
    #[error("invalid mail address: {0}")]
    Address(String),

    /// The SMTP transport rejected or failed to deliver the message.
    #[error("mail transport error: {0}")]
    Transport(String),
}

/// Outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a short notification naming the task to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] if the address is invalid or the
    /// message cannot be delivered.
    async fn send_notification(
        &self,
        task_title: &str,
        recipient: &str,
        subject: &str,
    ) -> Result<(), NotifyError>;

    /// Sends a reminder with the full task details to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] if the address is invalid or the
    /// message cannot be delivered.
    async fn send_reminder(&self, task: &Task, recipient: &str) -> Result<(), NotifyError>;
}
