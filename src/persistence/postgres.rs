//! PostgreSQL implementation of the task store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::TaskStore;
use crate::config::GatewayConfig;
use crate::domain::Task;
use crate::error::GatewayError;

/// Row shape shared by all task queries.
type TaskRow = (i32, String, String, bool);

fn row_to_task((id, title, description, completed): TaskRow) -> Task {
    Task {
        id,
        title,
        description,
        is_completed: completed,
    }
}

/// PostgreSQL-backed task store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to PostgreSQL using the pool settings from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the connection
    /// cannot be established.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Applies pending schema migrations from `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if a migration fails.
    pub async fn run_migrations(&self) -> Result<(), GatewayError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn list(&self) -> Result<Vec<Task>, GatewayError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, description, completed FROM tasks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows.into_iter().map(row_to_task).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Task>, GatewayError> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, description, completed FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row.map(row_to_task))
    }

    async fn insert(&self, task: Task) -> Result<Task, GatewayError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO tasks (title, description, completed) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_completed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(Task { id, ..task })
    }

    async fn update(&self, task: &Task) -> Result<bool, GatewayError> {
        let result =
            sqlx::query("UPDATE tasks SET title = $1, description = $2, completed = $3 WHERE id = $4")
                .bind(&task.title)
                .bind(&task.description)
                .bind(task.is_completed)
                .bind(task.id)
                .execute(&self.pool)
                .await
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i32) -> Result<bool, GatewayError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
