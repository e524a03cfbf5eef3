//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::TaskService;
use crate::ws::ConnectionRegistry;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Task service for all business logic.
    pub task_service: Arc<TaskService>,
    /// Registry of live WebSocket connections.
    pub registry: Arc<ConnectionRegistry>,
}
