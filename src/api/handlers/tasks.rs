//! Task CRUD handlers plus the reminder email endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{NotifyParams, ReminderParams};
use crate::app_state::AppState;
use crate::domain::Task;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /tasks` — List all tasks.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    summary = "List tasks",
    description = "Returns every stored task.",
    responses(
        (status = 200, description = "All tasks", body = [Task]),
    )
)]
pub async fn list_tasks(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let tasks = state.task_service.list_tasks().await?;
    Ok(Json(tasks))
}

/// `GET /tasks/:id` — Get a single task.
///
/// # Errors
///
/// Returns [`GatewayError::TaskNotFound`] if the task does not exist.
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    summary = "Get a task",
    description = "Returns the task with the given id.",
    params(
        ("id" = i32, Path, description = "Task id"),
    ),
    responses(
        (status = 200, description = "The task", body = Task),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, GatewayError> {
    let task = state.task_service.get_task(id).await?;
    Ok(Json(task))
}

/// `POST /tasks` — Create a new task.
///
/// The stored task is broadcast to every WebSocket subscriber. When
/// `recipientEmail` is given and a mailer is configured, a
/// notification email is dispatched in the background.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if the title is empty.
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    summary = "Create a task",
    description = "Stores a new task, broadcasts an Add event to all WebSocket subscribers, and optionally emails the given recipient. The id is assigned by storage; any id in the request body is ignored.",
    request_body = Task,
    params(NotifyParams),
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid task payload", body = ErrorResponse),
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    Query(params): Query<NotifyParams>,
    Json(task): Json<Task>,
) -> Result<impl IntoResponse, GatewayError> {
    let created = state
        .task_service
        .create_task(task, params.recipient_email.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /tasks/:id` — Replace a task.
///
/// The new state is broadcast to every WebSocket subscriber. When
/// `recipientEmail` is given and a mailer is configured, a
/// notification email is dispatched in the background.
///
/// # Errors
///
/// Returns [`GatewayError::IdMismatch`] if the path id differs from
/// the body id, and [`GatewayError::TaskNotFound`] if the task does
/// not exist.
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    summary = "Update a task",
    description = "Replaces the task with the given id, broadcasts an Update event to all WebSocket subscribers, and optionally emails the given recipient. The path id must match the id in the request body.",
    request_body = Task,
    params(
        ("id" = i32, Path, description = "Task id"),
        NotifyParams,
    ),
    responses(
        (status = 204, description = "Task updated"),
        (status = 400, description = "Id mismatch or invalid payload", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<NotifyParams>,
    Json(task): Json<Task>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .task_service
        .update_task(id, task, params.recipient_email.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /tasks/:id` — Delete a task.
///
/// The removal is broadcast to every WebSocket subscriber.
///
/// # Errors
///
/// Returns [`GatewayError::TaskNotFound`] if the task does not exist.
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    summary = "Delete a task",
    description = "Removes the task with the given id and broadcasts a Delete event to all WebSocket subscribers.",
    params(
        ("id" = i32, Path, description = "Task id"),
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = ErrorResponse),
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, GatewayError> {
    state.task_service.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /tasks/send-email` — Send a reminder email for a task.
///
/// Unlike the create/update notifications this call waits for the
/// mail transport, so delivery failures surface as a 500.
///
/// # Errors
///
/// Returns [`GatewayError::TaskNotFound`] if the task does not exist
/// and [`GatewayError::MailError`] if delivery fails.
#[utoipa::path(
    post,
    path = "/api/tasks/send-email",
    tag = "Tasks",
    summary = "Send a reminder email",
    description = "Sends a reminder email for the given task to the given recipient and waits for the mail transport to accept it.",
    params(ReminderParams),
    responses(
        (status = 200, description = "Reminder email sent", body = String),
        (status = 400, description = "No mailer configured", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Mail delivery failed", body = ErrorResponse),
    )
)]
pub async fn send_reminder(
    State(state): State<AppState>,
    Query(params): Query<ReminderParams>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .task_service
        .send_reminder(params.task_id, &params.recipient_email)
        .await?;
    Ok("Email sent")
}

/// Task management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/send-email", post(send_reminder))
        .route("/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
}
