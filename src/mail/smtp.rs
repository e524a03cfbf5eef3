//! SMTP notifier backed by `lettre`.

use std::fmt;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Notifier, NotifyError};
use crate::config::SmtpSettings;
use crate::domain::Task;

/// Display name used in the `From` header.
const SENDER_NAME: &str = "Taskcast";

/// Sends notification emails through an SMTP relay with STARTTLS.
///
/// The transport pools connections internally; one mailer instance is
/// shared across the whole service.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    /// Builds a mailer from SMTP settings.
    ///
    /// The relay is not contacted here; connection failures surface on
    /// first send.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] if the relay cannot be configured or
    /// the sender address is invalid.
    pub fn from_settings(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let address: Address = settings
            .sender_email
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Address(e.to_string()))?;
        let sender = Mailbox::new(Some(SENDER_NAME.to_string()), address);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.sender_email.clone(),
                settings.sender_password.clone(),
            ))
            .build();

        Ok(Self { transport, sender })
    }

    async fn send(&self, recipient: &str, subject: &str, body: String) -> Result<(), NotifyError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Address(e.to_string()))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(())
    }
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn send_notification(
        &self,
        task_title: &str,
        recipient: &str,
        subject: &str,
    ) -> Result<(), NotifyError> {
        self.send(recipient, subject, format!("Task: {task_title}"))
            .await
    }

    async fn send_reminder(&self, task: &Task, recipient: &str) -> Result<(), NotifyError> {
        let subject = format!("Task reminder: {}", task.title);
        let body = format!(
            "Don't forget to complete the task: {}\nDescription: {}",
            task.title, task.description
        );
        self.send(recipient, &subject, body).await
    }
}
