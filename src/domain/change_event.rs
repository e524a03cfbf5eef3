//! Change events broadcast to WebSocket subscribers after task mutations.
//!
//! Every successful mutation emits exactly one [`ChangeEvent`] through
//! the [`Broadcaster`](crate::ws::Broadcaster). Events carry full task
//! state (or just the id for deletions) so clients never need a
//! follow-up fetch.

use serde::Serialize;

use super::Task;

/// Event emitted after every successful task mutation.
///
/// The JSON layout is part of the public wire contract:
///
/// ```json
/// {"Action":"Add","Task":{"Id":1,"Title":"t","Description":"","IsCompleted":false}}
/// {"Action":"Update","Task":{"Id":1,"Title":"t","Description":"","IsCompleted":true}}
/// {"Action":"Delete","TaskId":1}
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "Action")]
pub enum ChangeEvent {
    /// A task was created.
    Add {
        /// Full state of the new task, including its assigned id.
        #[serde(rename = "Task")]
        task: Task,
    },

    /// A task was replaced with new state.
    Update {
        /// Full state of the task after the update.
        #[serde(rename = "Task")]
        task: Task,
    },

    /// A task was removed.
    Delete {
        /// Identifier of the removed task.
        #[serde(rename = "TaskId")]
        task_id: i32,
    },
}

impl ChangeEvent {
    /// Returns the identifier of the task this event refers to.
    #[must_use]
    pub fn task_id(&self) -> i32 {
        match self {
            Self::Add { task } | Self::Update { task } => task.id,
            Self::Delete { task_id } => *task_id,
        }
    }

    /// Returns the action name as a static string slice.
    #[must_use]
    pub const fn action_str(&self) -> &'static str {
        match self {
            Self::Add { .. } => "Add",
            Self::Update { .. } => "Update",
            Self::Delete { .. } => "Delete",
        }
    }
}
