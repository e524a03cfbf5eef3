//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;
use futures_util::StreamExt;

use super::connection::{Connection, WsSink, drive_connection};
use crate::app_state::AppState;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// Non-upgrade requests are rejected by the extractor before this
/// handler runs. The connection is registered before the receive loop
/// starts, making it eligible for every subsequent broadcast.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let registry = Arc::clone(&state.registry);

    ws.on_upgrade(move |socket| async move {
        let (ws_tx, ws_rx) = socket.split();
        let conn = Arc::new(Connection::new(WsSink::new(ws_tx)));
        tracing::info!(conn_id = %conn.id(), "ws client connected");

        registry.register(Arc::clone(&conn)).await;
        drive_connection(ws_rx, conn, registry).await;
    })
}
