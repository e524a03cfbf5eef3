//! # taskcast
//!
//! REST API and WebSocket broadcast gateway for a shared task list.
//!
//! This crate serves plain HTTP CRUD over tasks and pushes every
//! committed change (create, update, delete) to all connected
//! WebSocket clients, so task-list UIs stay live without polling.
//! Create and update requests can additionally trigger a notification
//! email to a given recipient.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── TaskService (service/)
//!     ├── Broadcaster + ConnectionRegistry (ws/)
//!     │
//!     ├── SmtpMailer (mail/)
//!     │
//!     └── Task Store (persistence/, in-memory or PostgreSQL)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod mail;
pub mod persistence;
pub mod service;
pub mod ws;
