use serde::{Deserialize, Serialize};

use crate::util::now_millis;

// ==================== Payloads ====================

/// Handshake payload (client → server)
///
/// Carries the client protocol version so the server can reject
/// incompatible dashboards early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakePayload {
    /// Protocol version
    pub version: u16,
    /// Client name/identifier
    pub client_name: Option<String>,
    /// Client unique id (UUID)
    pub client_id: Option<String>,
}

/// Notification payload (server → clients)
///
/// One per domain transition on the reception channel. `data` embeds
/// the updated entity so a client can render without refetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Event name: "TableAssigned", "OrderCancelled", "OrderUpdated"
    pub event: String,
    /// Human-readable message
    pub message: String,
    /// Optional deep link into the dashboard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Updated entity representation (JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

impl NotificationPayload {
    pub fn new(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            message: message.into(),
            link: None,
            data: None,
            created_at: now_millis(),
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Sync payload (server → all clients)
///
/// Broadcast when a resource changes; interested clients refetch.
/// The version is a per-resource monotonic counter - a client that
/// observes a gap does a full refresh instead of trusting its cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Resource kind ("order", "dining_table", "inventory_item", ...)
    pub resource: String,
    /// Per-resource monotonic version
    pub version: u64,
    /// Change kind ("created", "updated", "status_changed", "deleted")
    pub action: String,
    /// Entity id ("table:id" form)
    pub id: String,
    /// Entity data (None for deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
