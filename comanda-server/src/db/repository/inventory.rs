//! Inventory Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{
    InventoryItem, InventoryItemCreate, InventoryItemUpdate, StockAdjustKind, StockTransaction,
    Supplier,
};
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const ITEM_TABLE: &str = "inventory_item";
const SUPPLIER_TABLE: &str = "supplier";
const TXN_TABLE: &str = "stock_transaction";

#[derive(Clone)]
pub struct InventoryRepository {
    base: BaseRepository,
}

impl InventoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ========================================================================
    // Items
    // ========================================================================

    pub async fn find_items(&self) -> RepoResult<Vec<InventoryItem>> {
        let items: Vec<InventoryItem> = self
            .base
            .db()
            .query("SELECT * FROM inventory_item WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(items)
    }

    pub async fn find_item(&self, id: &str) -> RepoResult<Option<InventoryItem>> {
        let thing = parse_record_id(id, ITEM_TABLE)?;
        let item: Option<InventoryItem> = self.base.db().select(thing).await?;
        Ok(item)
    }

    pub async fn create_item(&self, data: InventoryItemCreate) -> RepoResult<InventoryItem> {
        let supplier = match data.supplier_id {
            Some(ref sid) => Some(parse_record_id(sid, SUPPLIER_TABLE)?),
            None => None,
        };
        let item = InventoryItem {
            id: None,
            name: data.name,
            description: data.description,
            unit: data.unit,
            quantity: data.quantity,
            unit_price: data.unit_price,
            reorder_level: data.reorder_level,
            supplier,
            is_active: true,
        };
        let created: Option<InventoryItem> =
            self.base.db().create(ITEM_TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create inventory item".to_string()))
    }

    pub async fn update_item(
        &self,
        id: &str,
        data: InventoryItemUpdate,
    ) -> RepoResult<InventoryItem> {
        let thing = parse_record_id(id, ITEM_TABLE)?;
        let existing = self
            .find_item(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Inventory item {} not found", id)))?;

        let supplier = match data.supplier_id {
            Some(ref sid) => Some(parse_record_id(sid, SUPPLIER_TABLE)?),
            None => existing.supplier,
        };
        let name = data.name.unwrap_or(existing.name);
        let description = data.description.or(existing.description);
        let unit = data.unit.unwrap_or(existing.unit);
        let unit_price = data.unit_price.unwrap_or(existing.unit_price);
        let reorder_level = data.reorder_level.unwrap_or(existing.reorder_level);

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET name = $name, description = $description, unit = $unit, unit_price = $unit_price, reorder_level = $reorder_level, supplier = $supplier RETURN AFTER")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("description", description))
            .bind(("unit", unit))
            .bind(("unit_price", unit_price))
            .bind(("reorder_level", reorder_level))
            .bind(("supplier", supplier))
            .await?;
        let updated: Vec<InventoryItem> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Inventory item {} not found", id)))
    }

    pub async fn delete_item(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id, ITEM_TABLE)?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Overwrite an item's stock level
    pub async fn set_quantity(&self, id: &RecordId, quantity: i32) -> RepoResult<InventoryItem> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET quantity = $quantity RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("quantity", quantity))
            .await?;
        let updated: Vec<InventoryItem> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Inventory item {} not found", id)))
    }

    // ========================================================================
    // Stock transactions
    // ========================================================================

    /// Append one stock movement audit row
    #[allow(clippy::too_many_arguments)]
    pub async fn record_transaction(
        &self,
        item: &RecordId,
        employee: &RecordId,
        kind: StockAdjustKind,
        quantity: i32,
        old_quantity: i32,
        new_quantity: i32,
        cost: Option<f64>,
        notes: Option<String>,
    ) -> RepoResult<StockTransaction> {
        let txn = StockTransaction {
            id: None,
            item: item.clone(),
            employee: employee.clone(),
            kind,
            quantity,
            old_quantity,
            new_quantity,
            cost,
            notes,
            created_at: now_millis(),
        };
        let created: Option<StockTransaction> =
            self.base.db().create(TXN_TABLE).content(txn).await?;
        created.ok_or_else(|| RepoError::Database("Failed to record stock transaction".to_string()))
    }

    /// Movement history of one item, newest first
    pub async fn find_history(&self, item: &RecordId) -> RepoResult<Vec<StockTransaction>> {
        let txns: Vec<StockTransaction> = self
            .base
            .db()
            .query("SELECT * FROM stock_transaction WHERE item = $item ORDER BY created_at DESC")
            .bind(("item", item.clone()))
            .await?
            .take(0)?;
        Ok(txns)
    }

    // ========================================================================
    // Suppliers
    // ========================================================================

    pub async fn find_suppliers(&self) -> RepoResult<Vec<Supplier>> {
        let suppliers: Vec<Supplier> = self
            .base
            .db()
            .query("SELECT * FROM supplier ORDER BY name")
            .await?
            .take(0)?;
        Ok(suppliers)
    }
}
