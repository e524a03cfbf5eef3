//! Domain layer: the task entity and its change events.
//!
//! This module contains the server-side domain model: the task record
//! itself and the change events that describe every mutation to
//! WebSocket subscribers.

pub mod change_event;
pub mod task;

pub use change_event::ChangeEvent;
pub use task::Task;
