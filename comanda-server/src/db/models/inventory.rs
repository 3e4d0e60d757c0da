//! Inventory Models

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Inventory item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stock unit ("kg", "bottle", "unit")
    pub unit: String,
    pub quantity: i32,
    pub unit_price: f64,
    /// Low-stock threshold for the dashboard warning
    pub reorder_level: i32,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub supplier: Option<RecordId>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl InventoryItem {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// Create inventory item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub reorder_level: i32,
    /// Supplier id ("supplier:xxx")
    pub supplier_id: Option<String>,
}

/// Update inventory item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub reorder_level: Option<i32>,
    pub supplier_id: Option<String>,
}

/// Supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Stock adjustment kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockAdjustKind {
    Add,
    Remove,
    Set,
}

/// Stock movement audit row, appended on every quantity change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransaction {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub item: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub employee: RecordId,
    #[serde(rename = "type")]
    pub kind: StockAdjustKind,
    /// Requested delta (or absolute value for `set`)
    pub quantity: i32,
    pub old_quantity: i32,
    pub new_quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Stock adjustment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustRequest {
    #[serde(rename = "type")]
    pub kind: StockAdjustKind,
    pub quantity: i32,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}
