//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;

use taskcast::api;
use taskcast::app_state::AppState;
use taskcast::persistence::InMemoryTaskStore;
use taskcast::service::TaskService;
use taskcast::ws::handler::ws_handler;
use taskcast::ws::{Broadcaster, ConnectionRegistry};

/// Boots a full gateway on an ephemeral port with an in-memory store
/// and no mailer. Returns the bound address and the registry so tests
/// can observe connection lifecycles.
pub async fn spawn_server() -> (SocketAddr, Arc<ConnectionRegistry>) {
    let registry = Arc::new(ConnectionRegistry::new());
    let broadcaster = Broadcaster::new(Arc::clone(&registry));
    let store = Arc::new(InMemoryTaskStore::new());
    let task_service = Arc::new(TaskService::new(store, broadcaster, None));

    let app_state = AppState {
        task_service,
        registry: Arc::clone(&registry),
    };

    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, registry)
}

/// Polls the registry until it holds exactly `n` connections or a
/// short deadline expires.
pub async fn wait_for_connections(registry: &ConnectionRegistry, n: usize) {
    for _ in 0..200 {
        if registry.len().await == n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {n} ws connections");
}
