//! WebSocket layer: connection registry and change-event fan-out.
//!
//! The WebSocket endpoint at `/ws` is outbound-only: every task
//! mutation is pushed as a JSON change event to all connected clients.
//! The only client frame acted upon is the close handshake.

pub mod broadcaster;
pub mod connection;
pub mod handler;
pub mod registry;

pub use broadcaster::Broadcaster;
pub use connection::{Connection, ConnectionId, ConnectionState, EventSink, TransportError, WsSink};
pub use registry::ConnectionRegistry;
