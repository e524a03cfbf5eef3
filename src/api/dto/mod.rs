//! Request parameter types for the REST API.

pub mod task_dto;

pub use task_dto::{NotifyParams, ReminderParams};
