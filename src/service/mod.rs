//! Business logic for task management.

pub mod task_service;

pub use task_service::TaskService;
