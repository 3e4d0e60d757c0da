//! Kitchen Print Repository
//!
//! Append-only: rows are created and queried, never updated or
//! deleted.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::KitchenPrint;
use shared::KitchenPrintType;
use shared::util::{now_millis, today_start_millis};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "kitchen_print";

#[derive(Clone)]
pub struct KitchenPrintRepository {
    base: BaseRepository,
}

impl KitchenPrintRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append a print event
    pub async fn create(
        &self,
        order: &RecordId,
        employee: &RecordId,
        employee_name: &str,
        print_type: KitchenPrintType,
    ) -> RepoResult<KitchenPrint> {
        let print = KitchenPrint {
            id: None,
            order_id: order.clone(),
            employee: employee.clone(),
            employee_name: employee_name.to_string(),
            print_type,
            printed_at: now_millis(),
        };
        let created: Option<KitchenPrint> = self.base.db().create(TABLE).content(print).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create kitchen print".to_string()))
    }

    /// Print history of one order, oldest first
    pub async fn find_by_order(&self, order: &RecordId) -> RepoResult<Vec<KitchenPrint>> {
        let prints: Vec<KitchenPrint> = self
            .base
            .db()
            .query("SELECT * FROM kitchen_print WHERE order_id = $order ORDER BY printed_at ASC")
            .bind(("order", order.clone()))
            .await?
            .take(0)?;
        Ok(prints)
    }

    /// Today's prints, newest first (kitchen dashboard feed)
    pub async fn find_today(&self) -> RepoResult<Vec<KitchenPrint>> {
        let prints: Vec<KitchenPrint> = self
            .base
            .db()
            .query("SELECT * FROM kitchen_print WHERE printed_at >= $start ORDER BY printed_at DESC")
            .bind(("start", today_start_millis()))
            .await?
            .take(0)?;
        Ok(prints)
    }
}
