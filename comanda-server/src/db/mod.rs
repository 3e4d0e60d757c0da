//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) bootstrap and schema setup.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at the given path
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns("comanda")
            .use_db("main")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        ensure_schema(&db).await?;

        tracing::info!("Database ready (SurrealDB/RocksDB at {db_path})");
        Ok(Self { db })
    }
}

/// Define the indexes the repositories rely on
///
/// SurrealDB tables are schemaless; the unique indexes back the
/// duplicate checks and the lookup indexes keep the hot queries off
/// full scans.
async fn ensure_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS dining_table_name ON TABLE dining_table FIELDS name UNIQUE;
        DEFINE INDEX IF NOT EXISTS employee_username ON TABLE employee FIELDS username UNIQUE;
        DEFINE INDEX IF NOT EXISTS order_item_order ON TABLE order_item FIELDS order_id;
        DEFINE INDEX IF NOT EXISTS kitchen_print_order ON TABLE kitchen_print FIELDS order_id;
        DEFINE INDEX IF NOT EXISTS notification_recipient ON TABLE notification FIELDS recipient;
        DEFINE INDEX IF NOT EXISTS stock_transaction_item ON TABLE stock_transaction FIELDS item;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
    Ok(())
}
