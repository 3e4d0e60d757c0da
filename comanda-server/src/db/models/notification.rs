//! Notification Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Per-user notification row
///
/// Created by the fan-out on domain transitions; mutated only to mark
/// read, bulk-cleared by the recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub recipient: RecordId,
    /// Type tag ("table_assigned", "order_ready", "kitchen_issue", ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Unread while null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<i64>,
    pub created_at: i64,
}

impl Notification {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// New notification payload (fan-out internal)
#[derive(Debug, Clone)]
pub struct NotificationCreate {
    pub recipient: RecordId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub link: Option<String>,
}
