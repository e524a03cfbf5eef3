//! Concurrent registry of live WebSocket connections.
//!
//! [`ConnectionRegistry`] owns every registered [`Connection`] behind
//! a single `RwLock<HashMap<..>>`. The lock protects map access only:
//! broadcast snapshots the membership and performs all network sends
//! after the lock is released.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::connection::{Connection, ConnectionId};

/// Central store of live WebSocket subscribers.
///
/// # Concurrency
///
/// - Registration and deregistration take the write lock briefly.
/// - Broadcast takes the read lock only to snapshot membership.
/// - No lock is ever held across a network send.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a connection, making it visible to subsequent broadcasts.
    pub async fn register(&self, conn: Arc<Connection>) {
        let mut map = self.connections.write().await;
        map.insert(conn.id(), conn);
    }

    /// Removes a connection by id, returning whether it was present.
    ///
    /// Unknown ids are ignored, so the receive loop and the broadcaster
    /// may both deregister the same connection without coordination.
    pub async fn deregister(&self, id: ConnectionId) -> bool {
        let mut map = self.connections.write().await;
        map.remove(&id).is_some()
    }

    /// Returns the current membership as an owned snapshot.
    pub async fn snapshot(&self) -> Vec<Arc<Connection>> {
        let map = self.connections.read().await;
        map.values().map(Arc::clone).collect()
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if the registry contains no connections.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
