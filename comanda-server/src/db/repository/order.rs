//! Order Repository
//!
//! Rows for the `order` and `order_item` tables. The conditional
//! status updates here are the engine's transactional guards: a racing
//! writer that loses the precondition check gets an empty result and
//! no state change.

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Order, OrderItem};
use shared::{OrderItemStatus, OrderStatus};
use shared::util::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "order";
const ITEM_TABLE: &str = "order_item";

/// Marker thrown inside the finalize transaction when the order is
/// already terminal; mapped back to a conflict by the caller.
const NOT_MODIFIABLE: &str = "order_not_modifiable";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Create a new order row
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id string ("order:xxx")
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(id, TABLE)?;
        self.find_by_record(&thing).await
    }

    /// Find order by record id
    pub async fn find_by_record(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// List orders, newest first
    pub async fn find_all(&self, limit: i64, offset: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM type::table('order') ORDER BY created_at DESC LIMIT $limit START $offset")
            .bind(("limit", limit))
            .bind(("offset", offset))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// List orders in the given statuses
    pub async fn find_by_status(
        &self,
        statuses: &[OrderStatus],
        oldest_first: bool,
    ) -> RepoResult<Vec<Order>> {
        let allowed: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let sql = if oldest_first {
            "SELECT * FROM type::table('order') WHERE status INSIDE $allowed ORDER BY created_at ASC"
        } else {
            "SELECT * FROM type::table('order') WHERE status INSIDE $allowed ORDER BY created_at DESC"
        };
        let orders: Vec<Order> = self
            .base
            .db()
            .query(sql)
            .bind(("allowed", allowed))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// The single non-terminal order occupying a table, if any
    pub async fn find_active_by_table(&self, table: &RecordId) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM type::table('order') WHERE dining_table = $table AND status NOTINSIDE ['paid', 'cancelled'] LIMIT 1")
            .bind(("table", table.clone()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// A waiter's active (non-terminal) orders, newest first
    pub async fn find_active_by_waiter(&self, waiter: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM type::table('order') WHERE waiter = $waiter AND status NOTINSIDE ['paid', 'cancelled'] ORDER BY created_at DESC")
            .bind(("waiter", waiter.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Conditionally transition an order's status
    ///
    /// Applies only while the current status is in `allowed`; `None`
    /// means the precondition no longer held (lost race or illegal
    /// transition) and nothing changed.
    pub async fn try_set_status(
        &self,
        id: &RecordId,
        allowed: &[OrderStatus],
        to: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        let allowed: Vec<String> = allowed.iter().map(|s| s.as_str().to_string()).collect();
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $to WHERE status INSIDE $allowed RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("to", to.as_str().to_string()))
            .bind(("allowed", allowed))
            .await?;
        let updated: Vec<Order> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Terminal transition: close the order and free its table in one
    /// transaction
    ///
    /// The order update and the table release commit together, so a
    /// paid/cancelled order can never be observed with its table still
    /// occupied. Returns `None` when the order was already terminal.
    pub async fn finalize_and_free_table(
        &self,
        order: &RecordId,
        table: &RecordId,
        to: OrderStatus,
        completed_at: Option<i64>,
    ) -> RepoResult<Option<Order>> {
        let sql = format!(
            r#"
            BEGIN TRANSACTION;
            LET $updated = (UPDATE $order_id SET status = $to, completed_at = $completed_at WHERE status NOTINSIDE ['paid', 'cancelled'] RETURN AFTER);
            IF array::len($updated) == 0 {{ THROW "{NOT_MODIFIABLE}" }};
            UPDATE $table_id SET status = 'available', reservation = NONE;
            RETURN array::first($updated);
            COMMIT TRANSACTION;
            "#
        );
        let result = self
            .base
            .db()
            .query(sql)
            .bind(("order_id", order.clone()))
            .bind(("table_id", table.clone()))
            .bind(("to", to.as_str().to_string()))
            .bind(("completed_at", completed_at))
            .await;

        // The thrown marker surfaces either on the query itself or on
        // result extraction, depending on the engine
        let mut response = match result {
            Ok(response) => response,
            Err(e) if e.to_string().contains(NOT_MODIFIABLE) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match response.take::<Option<Order>>(0) {
            Ok(updated) => Ok(updated),
            Err(e) if e.to_string().contains(NOT_MODIFIABLE) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the derived total
    pub async fn update_total(&self, id: &RecordId, total: f64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET total_amount = $total")
            .bind(("thing", id.clone()))
            .bind(("total", total))
            .await?;
        Ok(())
    }

    /// Overwrite the free-text notes
    pub async fn update_notes(&self, id: &RecordId, notes: String) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET notes = $notes")
            .bind(("thing", id.clone()))
            .bind(("notes", notes))
            .await?;
        Ok(())
    }

    /// Hard delete an order and its items (admin, pending orders only;
    /// guarded by the engine)
    pub async fn delete_with_items(&self, id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE order_item WHERE order_id = $thing")
            .query("DELETE $thing")
            .bind(("thing", id.clone()))
            .await?;
        Ok(())
    }

    /// Revenue from orders paid since `start` (Unix millis)
    pub async fn paid_revenue_since(&self, start: i64) -> RepoResult<f64> {
        let amounts: Vec<f64> = self
            .base
            .db()
            .query("SELECT VALUE total_amount FROM type::table('order') WHERE status = 'paid' AND completed_at >= $start")
            .bind(("start", start))
            .await?
            .take(0)?;
        Ok(amounts.iter().sum())
    }

    /// Count of orders created since `start`
    pub async fn created_count_since(&self, start: i64) -> RepoResult<usize> {
        let ids: Vec<String> = self
            .base
            .db()
            .query("SELECT VALUE <string>id FROM type::table('order') WHERE created_at >= $start")
            .bind(("start", start))
            .await?
            .take(0)?;
        Ok(ids.len())
    }

    // ========================================================================
    // Order Items
    // ========================================================================

    /// Create an order item row
    pub async fn add_item(&self, item: OrderItem) -> RepoResult<OrderItem> {
        let created: Option<OrderItem> = self.base.db().create(ITEM_TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order item".to_string()))
    }

    /// All items of an order, oldest first
    pub async fn find_items(&self, order: &RecordId) -> RepoResult<Vec<OrderItem>> {
        let items: Vec<OrderItem> = self
            .base
            .db()
            .query("SELECT * FROM order_item WHERE order_id = $order ORDER BY created_at ASC")
            .bind(("order", order.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Find item by id string ("order_item:xxx")
    pub async fn find_item(&self, id: &str) -> RepoResult<Option<OrderItem>> {
        let thing = parse_record_id(id, ITEM_TABLE)?;
        let item: Option<OrderItem> = self.base.db().select(thing).await?;
        Ok(item)
    }

    /// Update quantity/note on an item
    pub async fn update_item(
        &self,
        id: &RecordId,
        quantity: i32,
        note: Option<String>,
    ) -> RepoResult<OrderItem> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET quantity = $quantity, note = $note RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("quantity", quantity))
            .bind(("note", note))
            .await?;
        let updated: Vec<OrderItem> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order item {} not found", id)))
    }

    /// Set an item's kitchen status
    pub async fn set_item_status(
        &self,
        id: &RecordId,
        status: OrderItemStatus,
    ) -> RepoResult<Option<OrderItem>> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $status RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("status", status.as_str().to_string()))
            .await?;
        let updated: Vec<OrderItem> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Delete an item row
    pub async fn delete_item(&self, id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", id.clone()))
            .await?;
        Ok(())
    }

    /// Ids of non-cancelled items not yet sent to the kitchen
    pub async fn unprinted_item_ids(&self, order: &RecordId) -> RepoResult<Vec<RecordId>> {
        let items = self.find_items(order).await?;
        Ok(items
            .into_iter()
            .filter(|i| i.status != OrderItemStatus::Cancelled && !i.printed_to_kitchen)
            .filter_map(|i| i.id)
            .collect())
    }

    /// Mark the given items as sent to the kitchen
    pub async fn mark_items_printed(&self, ids: &[RecordId]) -> RepoResult<()> {
        for id in ids {
            self.base
                .db()
                .query("UPDATE $thing SET printed_to_kitchen = true")
                .bind(("thing", id.clone()))
                .await?;
        }
        Ok(())
    }

    /// Count of non-cancelled items still awaiting a kitchen print
    pub async fn unprinted_count(&self, order: &RecordId) -> RepoResult<usize> {
        Ok(self.unprinted_item_ids(order).await?.len())
    }
}

/// Build a new order row (status pending, zero total)
pub fn new_order(
    table: RecordId,
    table_name: String,
    waiter: RecordId,
    waiter_name: String,
    customer_count: i32,
    notes: Option<String>,
) -> Order {
    Order {
        id: None,
        dining_table: table,
        table_name,
        waiter,
        waiter_name,
        customer_count,
        status: OrderStatus::Pending,
        total_amount: 0.0,
        notes,
        created_at: now_millis(),
        completed_at: None,
    }
}
