//! Database Models

// Serde helpers
pub mod serde_helpers;

// Staff
pub mod employee;

// Floor
pub mod dining_table;

// Menu
pub mod menu;

// Orders
pub mod kitchen_print;
pub mod order;

// Inventory
pub mod inventory;

// Notifications
pub mod notification;

// Re-exports
pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate, Reservation, TableLayout};
pub use employee::{Employee, EmployeeCreate, EmployeeResponse};
pub use inventory::{
    InventoryItem, InventoryItemCreate, InventoryItemUpdate, StockAdjustKind, StockAdjustRequest,
    StockTransaction, Supplier,
};
pub use kitchen_print::KitchenPrint;
pub use menu::{Category, CategoryCreate, MenuItem, MenuItemCreate, MenuItemUpdate};
pub use notification::{Notification, NotificationCreate};
pub use order::{Order, OrderDetail, OrderItem, OrderItemInput, OrderItemUpdate, OrderSummary};
