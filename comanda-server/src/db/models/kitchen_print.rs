//! Kitchen Print Model
//!
//! Append-only ticket log: one row per "sent to the kitchen"-class
//! event. Never updated or deleted.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::KitchenPrintType;
use surrealdb::RecordId;

/// Kitchen print record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenPrint {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub employee: RecordId,
    /// Acting employee name snapshot
    pub employee_name: String,
    #[serde(rename = "type")]
    pub print_type: KitchenPrintType,
    pub printed_at: i64,
}
