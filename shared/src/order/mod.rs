//! Order and table lifecycle types
//!
//! The status enums and the legal-transition table live here so the
//! server engine and any connected client agree on the lifecycle
//! without a round trip.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Order Status
// ============================================================================

/// Order lifecycle status
///
/// Happy path: `pending → confirmed → preparing → ready → served → paid`.
/// Any non-terminal status may transition to `cancelled`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses permit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Whether an explicit transition to `next` is legal from this status
    ///
    /// Encodes the event table:
    /// - send to kitchen re-confirms from any non-terminal status
    ///   (items can be added and sent again after the first print)
    /// - kitchen advance is strictly `confirmed → preparing → ready`
    /// - `served` only from `ready`
    /// - `paid` and `cancelled` from any non-terminal status
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            OrderStatus::Pending => false,
            OrderStatus::Confirmed => true,
            OrderStatus::Preparing => self == OrderStatus::Confirmed,
            OrderStatus::Ready => self == OrderStatus::Preparing,
            OrderStatus::Served => self == OrderStatus::Ready,
            OrderStatus::Paid => true,
            OrderStatus::Cancelled => true,
        }
    }

    /// Whether the all-items-ready check may auto-advance this order
    ///
    /// Fires before the kitchen has explicitly started an order too
    /// (every item can reach `ready` while the order is still
    /// `pending`/`confirmed`). Re-checking an already-`ready` order is
    /// a no-op, never an error.
    pub fn auto_ready_eligible(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Order Item Status
// ============================================================================

/// Per-item kitchen workflow status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderItemStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Cancelled,
}

impl OrderItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "pending",
            OrderItemStatus::Preparing => "preparing",
            OrderItemStatus::Ready => "ready",
            OrderItemStatus::Cancelled => "cancelled",
        }
    }
}

// ============================================================================
// Table Status
// ============================================================================

/// Dining table occupancy status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl TableStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Kitchen Print Events
// ============================================================================

/// Kitchen ticket event kinds (append-only print log)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KitchenPrintType {
    NewOrder,
    AddItems,
    SendToKitchen,
    StartPreparing,
    Ready,
    Cancellation,
}

impl KitchenPrintType {
    pub fn as_str(self) -> &'static str {
        match self {
            KitchenPrintType::NewOrder => "new_order",
            KitchenPrintType::AddItems => "add_items",
            KitchenPrintType::SendToKitchen => "send_to_kitchen",
            KitchenPrintType::StartPreparing => "start_preparing",
            KitchenPrintType::Ready => "ready",
            KitchenPrintType::Cancellation => "cancellation",
        }
    }
}

// ============================================================================
// Roles and Actors
// ============================================================================

/// Staff roles - every engine operation is gated on these
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Waiter,
    Kitchen,
    Reception,
    Owner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Waiter => "waiter",
            Role::Kitchen => "kitchen",
            Role::Reception => "reception",
            Role::Owner => "owner",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "waiter" => Some(Role::Waiter),
            "kitchen" => Some(Role::Kitchen),
            "reception" => Some(Role::Reception),
            "owner" => Some(Role::Owner),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting staff member, passed explicitly into every engine
/// operation (never read from ambient request state)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Employee record id ("employee:xxx")
    pub id: String,
    /// Display name snapshot for audit rows
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_legal() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::Paid,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn terminal_states_reject_everything() {
        for terminal in [OrderStatus::Paid, OrderStatus::Cancelled] {
            for next in [
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                OrderStatus::Ready,
                OrderStatus::Served,
                OrderStatus::Paid,
                OrderStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn cancel_from_any_non_terminal() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
        ] {
            assert!(status.can_transition_to(OrderStatus::Cancelled));
        }
    }

    #[test]
    fn kitchen_advance_is_strict() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Preparing));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Served));
    }

    #[test]
    fn resend_to_kitchen_allowed() {
        // Adding items after the first send re-confirms the order
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Confirmed));
    }

    #[test]
    fn auto_ready_eligibility() {
        assert!(OrderStatus::Pending.auto_ready_eligible());
        assert!(OrderStatus::Preparing.auto_ready_eligible());
        assert!(!OrderStatus::Ready.auto_ready_eligible());
        assert!(!OrderStatus::Served.auto_ready_eligible());
        assert!(!OrderStatus::Paid.auto_ready_eligible());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"preparing\""
        );
        let s: OrderStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(s, OrderStatus::Paid);
    }
}
