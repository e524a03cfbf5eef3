//! Query parameter types for the task endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

/// Optional notification recipient for create and update requests.
///
/// When `recipientEmail` is present and a mailer is configured, a
/// notification email is dispatched after the mutation commits.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotifyParams {
    /// Email address to notify about the change.
    #[serde(rename = "recipientEmail")]
    pub recipient_email: Option<String>,
}

/// Query parameters for the reminder endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReminderParams {
    /// Id of the task to remind about.
    #[serde(rename = "taskId")]
    pub task_id: i32,
    /// Email address the reminder is sent to.
    #[serde(rename = "recipientEmail")]
    pub recipient_email: String,
}
