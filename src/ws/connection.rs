//! WebSocket connection identity, state machine, and receive loop.
//!
//! Each accepted socket becomes a [`Connection`]: a stable id, an
//! atomic lifecycle state, and the write half behind the [`EventSink`]
//! trait. The receive loop in [`drive_connection`] exists only to
//! observe the peer; clients never send commands.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, close_code};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::Mutex;

use super::registry::ConnectionRegistry;

/// Error writing to a WebSocket peer.
///
/// Stays inside the WebSocket layer: a failed send marks the
/// connection [`ConnectionState::Closed`] and is never surfaced to
/// HTTP callers.
#[derive(Debug, thiserror::Error)]
#[error("websocket transport error: {0}")]
pub struct TransportError(pub String);

/// Unique identifier for a WebSocket connection.
///
/// Wraps a UUID v4. Generated once when the socket is accepted and
/// immutable thereafter. Used as the dictionary key in
/// [`ConnectionRegistry`] and as the correlation id in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a WebSocket connection.
///
/// Transitions are one-way: `Open` → `Closing` → `Closed`, or straight
/// to `Closed` on transport failure. A connection never reopens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Healthy and eligible for broadcast delivery.
    Open = 0,
    /// Close handshake in progress; not eligible for delivery.
    Closing = 1,
    /// Terminal state; the connection is gone.
    Closed = 2,
}

impl ConnectionState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Open,
            1 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Write half of a WebSocket connection.
///
/// Abstracted as a trait so connection and fan-out logic can be
/// exercised against an in-memory sink.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Sends a text frame to the peer.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the frame cannot be written.
    async fn send_text(&self, text: &str) -> Result<(), TransportError>;

    /// Sends a close frame acknowledging the close handshake.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the frame cannot be written.
    async fn send_close(&self) -> Result<(), TransportError>;
}

/// [`EventSink`] backed by the write half of an Axum WebSocket.
pub struct WsSink {
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

impl WsSink {
    /// Wraps the write half of a split socket.
    #[must_use]
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }
}

impl fmt::Debug for WsSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsSink").finish_non_exhaustive()
    }
}

#[async_trait]
impl EventSink for WsSink {
    async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::text(text))
            .await
            .map_err(|e| TransportError(e.to_string()))
    }

    async fn send_close(&self) -> Result<(), TransportError> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Close(Some(CloseFrame {
            code: close_code::NORMAL,
            reason: Utf8Bytes::from_static("closed by client"),
        })))
        .await
        .map_err(|e| TransportError(e.to_string()))
    }
}

/// A registered WebSocket subscriber.
///
/// Tracks identity, lifecycle state, and the write half used for
/// broadcast delivery. The state field is atomic so the broadcaster
/// and the receive loop can both react to peer failures without
/// taking a lock.
pub struct Connection {
    id: ConnectionId,
    state: AtomicU8,
    sink: Box<dyn EventSink>,
}

impl Connection {
    /// Creates an open connection over the given sink.
    #[must_use]
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self {
            id: ConnectionId::new(),
            state: AtomicU8::new(ConnectionState::Open as u8),
            sink: Box::new(sink),
        }
    }

    /// Returns the connection id.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns `true` if the connection is eligible for delivery.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Marks the close handshake as started. No-op once `Closed`.
    pub fn mark_closing(&self) {
        self.state
            .fetch_max(ConnectionState::Closing as u8, Ordering::AcqRel);
    }

    /// Marks the connection terminally closed.
    pub fn mark_closed(&self) {
        self.state
            .fetch_max(ConnectionState::Closed as u8, Ordering::AcqRel);
    }

    /// Sends a text frame to the peer.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the frame cannot be written.
    pub async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.sink.send_text(text).await
    }

    /// Sends a close acknowledgement to the peer.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the frame cannot be written.
    pub async fn send_close(&self) -> Result<(), TransportError> {
        self.sink.send_close().await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Runs the receive loop for a registered connection.
///
/// Client frames other than `Close` are drained and ignored. On a
/// close frame the connection transitions to `Closing`, the close
/// acknowledgement is sent, and the connection is deregistered as
/// `Closed`. On a transport error or end of stream the connection is
/// deregistered without an acknowledgement.
pub async fn drive_connection<S>(
    mut frames: S,
    conn: Arc<Connection>,
    registry: Arc<ConnectionRegistry>,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(Message::Close(_)) => {
                conn.mark_closing();
                if let Err(e) = conn.send_close().await {
                    tracing::debug!(conn_id = %conn.id(), error = %e, "close ack not delivered");
                }
                conn.mark_closed();
                registry.deregister(conn.id()).await;
                tracing::info!(conn_id = %conn.id(), "ws client closed connection");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(conn_id = %conn.id(), error = %e, "ws receive error");
                break;
            }
        }
    }

    // Peer vanished without a close handshake.
    conn.mark_closed();
    registry.deregister(conn.id()).await;
    tracing::info!(conn_id = %conn.id(), "ws client disconnected");
}
