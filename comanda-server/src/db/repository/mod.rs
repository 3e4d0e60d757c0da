//! Repository Module
//!
//! CRUD access to the embedded SurrealDB tables. One repository per
//! aggregate; conditional updates (`UPDATE … WHERE status = …`) are the
//! transactional guards the engine relies on.

pub mod dining_table;
pub mod employee;
pub mod inventory;
pub mod kitchen_print;
pub mod menu;
pub mod notification;
pub mod order;

// Re-exports
pub use dining_table::DiningTableRepository;
pub use employee::EmployeeRepository;
pub use inventory::InventoryRepository;
pub use kitchen_print::KitchenPrintRepository;
pub use menu::MenuRepository;
pub use notification::NotificationRepository;
pub use order::{OrderRepository, new_order};

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:id" strings on the API surface
// =============================================================================
//
// surrealdb::RecordId handles all ids:
//   - parse:   let id: RecordId = "order:abc".parse()?;
//   - create:  RecordId::from_table_key("order", "abc")
//   - CRUD:    db.select(id) / db.delete(id) take the RecordId directly
//
// Raw queries never name the `order` table in FROM position (keyword
// clash); they go through `type::table('order')` or a bound record id.

/// Parse a "table:id" string, expecting a specific table
pub fn parse_record_id(id: &str, expected_table: &str) -> RepoResult<surrealdb::RecordId> {
    let rid: surrealdb::RecordId = id
        .parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
    if rid.table() != expected_table {
        return Err(RepoError::Validation(format!(
            "Expected a {} id, got {}",
            expected_table, id
        )));
    }
    Ok(rid)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
