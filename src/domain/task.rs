//! Task entity shared by the REST API, storage, and change events.
//!
//! [`Task`] serializes with PascalCase field names (`Id`, `Title`,
//! `Description`, `IsCompleted`) on every surface: REST bodies, change
//! events pushed over WebSocket, and the OpenAPI schema. The layout is
//! part of the public wire contract and must not drift.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single task record.
///
/// Identifiers are assigned by the store at creation time; a
/// client-supplied `Id` on create is ignored. All fields default when
/// absent from a request body, so validation (non-empty title) happens
/// in the service layer rather than during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct Task {
    /// Storage-assigned identifier.
    pub id: i32,
    /// Short task title. Must be non-empty.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Completion flag.
    pub is_completed: bool,
}

impl Task {
    /// Creates a task with the given fields.
    #[must_use]
    pub fn new(id: i32, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            is_completed: false,
        }
    }
}
