//! HTTP request handlers.

pub mod system;
pub mod tasks;
