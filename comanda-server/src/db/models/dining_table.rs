//! Dining Table Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::TableStatus;
use surrealdb::RecordId;

/// Reservation metadata, present while a table is `reserved`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    /// Reservation time (Unix millis)
    pub time: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_count: i32,
}

/// Visual layout rectangle for the floor-plan view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TableLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Dining table entity
///
/// Invariant: `occupied` iff exactly one non-terminal order references
/// this table; status mutations for the occupancy lifecycle go through
/// the order engine only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub capacity: i32,
    #[serde(default)]
    pub status: TableStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<Reservation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<TableLayout>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub name: String,
    pub capacity: Option<i32>,
    pub layout: Option<TableLayout>,
}

/// Update dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<TableStatus>,
    pub layout: Option<TableLayout>,
    pub is_active: Option<bool>,
}
