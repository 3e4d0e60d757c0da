//! Order and Order Item Models

use super::dining_table::DiningTable;
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::{OrderItemStatus, OrderStatus};
use surrealdb::RecordId;

/// Order entity
///
/// `total_amount` is derived - recomputed from items after every item
/// mutation, never trusted incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub dining_table: RecordId,
    /// Table name snapshot for messages and tickets
    pub table_name: String,
    #[serde(with = "serde_helpers::record_id")]
    pub waiter: RecordId,
    /// Waiter display name snapshot
    pub waiter_name: String,
    pub customer_count: i32,
    pub status: OrderStatus,
    pub total_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl Order {
    /// "order:xyz" form of the id, for messages and links
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// Order item entity
///
/// `price_at_order` is captured from the menu at creation and never
/// recalculated from later menu edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub menu_item: RecordId,
    /// Menu item name snapshot
    pub name: String,
    pub quantity: i32,
    pub price_at_order: f64,
    #[serde(default)]
    pub status: OrderItemStatus,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub printed_to_kitchen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

impl OrderItem {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    /// Line total for this item (quantity × price-at-order)
    pub fn line_total(&self) -> f64 {
        crate::orders::money::line_total(self.quantity, self.price_at_order)
    }
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// Item input for order creation / add-items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    /// Menu item id ("menu_item:xxx")
    pub menu_item_id: String,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Item update payload (waiter side)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemUpdate {
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Full order representation with eager-loaded associations
///
/// Returned by every mutating endpoint so clients can re-render
/// without a follow-up fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<DiningTable>,
}

/// Order summary used in table overviews
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub items_count: usize,
}
