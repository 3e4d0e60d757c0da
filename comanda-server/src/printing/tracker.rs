//! Kitchen ticket tracker
//!
//! Append-only view over the kitchen print log plus the derivation of
//! what still needs printing. A reprint is distinguished from an
//! incremental send by event type only - it never resets the items'
//! printed flags.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::KitchenPrint;
use crate::db::repository::{KitchenPrintRepository, OrderRepository, parse_record_id};
use crate::utils::{AppError, AppResult};
use shared::{Actor, KitchenPrintType};

#[derive(Clone)]
pub struct KitchenTicketTracker {
    prints: KitchenPrintRepository,
    orders: OrderRepository,
}

impl KitchenTicketTracker {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            prints: KitchenPrintRepository::new(db.clone()),
            orders: OrderRepository::new(db),
        }
    }

    /// Append a print event for an order
    ///
    /// Pure append - always succeeds if the order exists.
    pub async fn record_print(
        &self,
        order_id: &str,
        actor: &Actor,
        print_type: KitchenPrintType,
    ) -> AppResult<KitchenPrint> {
        let order_rec = parse_record_id(order_id, "order")?;
        if self.orders.find_by_record(&order_rec).await?.is_none() {
            return Err(AppError::not_found(format!("Order {} not found", order_id)));
        }
        let actor_rec = parse_record_id(&actor.id, "employee")
            .map_err(|_| AppError::validation(format!("Invalid actor id: {}", actor.id)))?;

        let print = self
            .prints
            .create(&order_rec, &actor_rec, &actor.name, print_type)
            .await?;
        Ok(print)
    }

    /// Count of non-cancelled items not yet sent to the kitchen
    pub async fn unprinted_count(&self, order_id: &str) -> AppResult<usize> {
        let order_rec = parse_record_id(order_id, "order")?;
        Ok(self.orders.unprinted_count(&order_rec).await?)
    }

    /// Mark the given items as sent
    ///
    /// Used after a send/reprint so subsequent unprinted queries
    /// reflect only genuinely new items.
    pub async fn mark_printed(&self, order_id: &str, item_ids: &[String]) -> AppResult<()> {
        let order_rec = parse_record_id(order_id, "order")?;
        let mut records = Vec::with_capacity(item_ids.len());
        for id in item_ids {
            let item = self
                .orders
                .find_item(id)
                .await?
                .filter(|i| i.order_id == order_rec)
                .ok_or_else(|| {
                    AppError::not_found(format!("Order item {} not found on this order", id))
                })?;
            if let Some(rec) = item.id {
                records.push(rec);
            }
        }
        self.orders.mark_items_printed(&records).await?;
        Ok(())
    }

    /// Print history of one order, oldest first
    pub async fn history(&self, order_id: &str) -> AppResult<Vec<KitchenPrint>> {
        let order_rec = parse_record_id(order_id, "order")?;
        Ok(self.prints.find_by_order(&order_rec).await?)
    }

    /// Today's print feed, newest first
    pub async fn today(&self) -> AppResult<Vec<KitchenPrint>> {
        Ok(self.prints.find_today().await?)
    }
}
