//! REST API layer: route handlers, request DTOs, and router composition.
//!
//! Task endpoints are mounted under `/api`; system endpoints live at
//! the root level.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::domain::Task;
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI document covering the full REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        handlers::tasks::list_tasks,
        handlers::tasks::get_task,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,
        handlers::tasks::send_reminder,
        handlers::system::health_handler,
    ),
    components(schemas(Task, ErrorResponse, ErrorBody)),
    tags(
        (name = "Tasks", description = "Task CRUD, change broadcast, and reminder emails"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::tasks::routes())
        .merge(handlers::system::routes())
}
