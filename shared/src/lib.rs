//! Shared types for the Comanda front-of-house system
//!
//! Common types used by the server and connected clients: order/table
//! lifecycle enums, the message bus envelope and payloads, and small
//! time utilities.

pub mod message;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, Channel, EventType};

// Lifecycle re-exports
pub use order::{Actor, KitchenPrintType, OrderItemStatus, OrderStatus, Role, TableStatus};
