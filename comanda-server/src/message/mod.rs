//! Real-time message bus
//!
//! Fan-out path for the two broadcast channels
//! (`reception-notifications`, `restaurant-updates`):
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               MessageBus                 │
//! │  ┌───────────────────────────────────┐  │
//! │  │  broadcast::Sender<BusMessage>    │  │
//! │  └───────────────────────────────────┘  │
//! └────────────────┬────────────────────────┘
//!                  │
//!         ┌────────┴────────┐
//!         │ Transport Trait │  ◄── pluggable
//!         └────────┬────────┘
//!                  │
//!         ┌────────┴────────┐
//!         ▼                 ▼
//!   TcpTransport     MemoryTransport
//!   (dashboards)     (in-process, tests)
//! ```
//!
//! Delivery is best-effort: a subscriber that misses a message
//! recovers by its normal refresh-on-load, never by replay.

pub mod bus;
pub mod transport;

pub use bus::{MessageBus, TransportConfig};
pub use shared::message::{BusMessage, Channel, EventType, NotificationPayload, SyncPayload};
pub use transport::{MemoryTransport, TcpTransport, Transport};

use std::net::SocketAddr;

/// Connected client info (for diagnostics)
#[derive(Debug, Clone)]
pub struct ConnectedClient {
    pub id: String,
    pub addr: Option<SocketAddr>,
}
