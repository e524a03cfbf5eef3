//! Persistence layer: task storage behind the [`TaskStore`] trait.
//!
//! Two implementations ship with the crate: [`PostgresTaskStore`] for
//! durable storage via `sqlx::PgPool`, and [`InMemoryTaskStore`] used
//! when persistence is disabled and as the default test double.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::Task;
use crate::error::GatewayError;

pub use memory::InMemoryTaskStore;
pub use postgres::PostgresTaskStore;

/// Storage abstraction for task records.
///
/// Identifier assignment belongs to the store: [`TaskStore::insert`]
/// ignores any client-supplied id and returns the stored record with
/// its real one.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns all tasks ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn list(&self) -> Result<Vec<Task>, GatewayError>;

    /// Returns the task with the given identifier, if present.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn find_by_id(&self, id: i32) -> Result<Option<Task>, GatewayError>;

    /// Inserts a new task, returning it with its storage-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn insert(&self, task: Task) -> Result<Task, GatewayError>;

    /// Replaces an existing task in place.
    ///
    /// Returns `false` if no task with `task.id` exists.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn update(&self, task: &Task) -> Result<bool, GatewayError>;

    /// Deletes the task with the given identifier.
    ///
    /// Returns `false` if no task with `id` exists.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn delete(&self, id: i32) -> Result<bool, GatewayError>;
}
