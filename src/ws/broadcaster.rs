//! Fan-out of change events to every registered connection.

use std::sync::Arc;

use futures_util::future::join_all;

use super::connection::ConnectionState;
use super::registry::ConnectionRegistry;
use crate::domain::ChangeEvent;

/// Delivers serialized change events to all open connections.
///
/// Fan-out runs in four steps: serialize the event once, snapshot the
/// registry, send to every open connection concurrently, then sweep
/// failed connections out of the registry. The call returns only after
/// every send has settled, so callers that broadcast sequentially get
/// per-connection delivery in commit order.
///
/// Failures never propagate: a connection that cannot be written is
/// marked [`ConnectionState::Closed`] and deregistered before the call
/// returns, so one bad peer cannot affect the others or the caller.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    /// Creates a broadcaster over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Broadcasts one event to every open connection.
    ///
    /// Connections in `Closing` or `Closed` state are skipped. Returns
    /// the number of connections the event was delivered to; with no
    /// open connections the event is silently dropped and 0 returned.
    pub async fn broadcast(&self, event: &ChangeEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "change event serialization failed");
                return 0;
            }
        };

        let targets = self.registry.snapshot().await;

        let sends = targets
            .iter()
            .filter(|conn| conn.state() == ConnectionState::Open)
            .map(|conn| {
                let payload = payload.as_str();
                async move { (Arc::clone(conn), conn.send_text(payload).await) }
            });

        let mut delivered = 0usize;
        for (conn, result) in join_all(sends).await {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(conn_id = %conn.id(), error = %e, "dropping unreachable ws client");
                    conn.mark_closed();
                    self.registry.deregister(conn.id()).await;
                }
            }
        }

        tracing::debug!(action = event.action_str(), delivered, "change event broadcast");
        delivered
    }
}
