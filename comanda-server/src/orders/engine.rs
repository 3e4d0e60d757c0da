//! Order/Table State Engine
//!
//! The single authority for order-status transitions and their side
//! effects on table occupancy and totals. Every operation:
//!
//! 1. checks the actor's role (owners pass every gate),
//! 2. enforces the transition precondition with a conditional update:
//!    the loser of a race sees no matching row and gets a Conflict
//!    with no state change,
//! 3. recomputes the derived total where items changed,
//! 4. appends the kitchen print row where the event calls for one,
//! 5. hands the result to the fan-out (notifications persist before
//!    the response; the broadcast itself is best-effort).
//!
//! Terminal orders (`paid`, `cancelled`) reject every mutation with a
//! Conflict - never a silent no-op.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use crate::db::models::{
    DiningTable, Order, OrderDetail, OrderItem, OrderItemInput, OrderItemUpdate,
};
use crate::db::repository::{
    DiningTableRepository, KitchenPrintRepository, MenuRepository, OrderRepository,
    new_order, parse_record_id,
};
use crate::orders::money;
use crate::services::Fanout;
use crate::utils::validation::{validate_note, validate_quantity};
use crate::utils::{AppError, AppResult};
use serde::Deserialize;
use shared::util::now_millis;
use shared::{Actor, KitchenPrintType, OrderItemStatus, OrderStatus, Role, TableStatus};

/// Roles allowed to run the floor flows (assign, items, send)
const FLOOR_ROLES: &[Role] = &[Role::Waiter, Role::Reception];
/// Roles allowed to advance the kitchen workflow
const KITCHEN_ROLES: &[Role] = &[Role::Kitchen];
/// Roles allowed to mark an order served
const SERVE_ROLES: &[Role] = &[Role::Waiter, Role::Kitchen, Role::Reception];
/// Roles allowed to settle bills
const BILLING_ROLES: &[Role] = &[Role::Reception];
/// Roles allowed to cancel an order
const CANCEL_ROLES: &[Role] = &[Role::Waiter, Role::Reception];

/// Every non-terminal status
const NON_TERMINAL: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Served,
];

/// Statuses from which the all-items-ready check may auto-advance
const AUTO_READY_FROM: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
];

/// Assign-table request
#[derive(Debug, Clone, Deserialize)]
pub struct AssignTableRequest {
    pub customer_count: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The state engine
#[derive(Clone)]
pub struct OrderEngine {
    orders: OrderRepository,
    tables: DiningTableRepository,
    menu: MenuRepository,
    prints: KitchenPrintRepository,
    fanout: Fanout,
}

impl OrderEngine {
    pub fn new(db: Surreal<Db>, fanout: Fanout) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            tables: DiningTableRepository::new(db.clone()),
            menu: MenuRepository::new(db.clone()),
            prints: KitchenPrintRepository::new(db),
            fanout,
        }
    }

    // ========================================================================
    // Floor flows
    // ========================================================================

    /// Assign a table: create a pending order and occupy the table
    ///
    /// The conditional claim on the table is the linearization point:
    /// of two concurrent assignments exactly one sees `available`.
    pub async fn assign_table(
        &self,
        actor: &Actor,
        table_id: &str,
        req: AssignTableRequest,
    ) -> AppResult<OrderDetail> {
        check_role(actor, FLOOR_ROLES)?;
        validate_note(req.notes.as_deref(), "notes")?;

        let table = self
            .tables
            .find_by_id(table_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", table_id)))?;
        let table_rec = record_of_table(&table)?;

        if req.customer_count < 1 {
            return Err(AppError::validation("customer_count must be at least 1"));
        }
        if req.customer_count > table.capacity {
            return Err(AppError::validation(format!(
                "customer_count exceeds table capacity ({})",
                table.capacity
            )));
        }

        let claimed = self
            .tables
            .try_set_status(&table_rec, &[TableStatus::Available], TableStatus::Occupied)
            .await?
            .ok_or_else(|| {
                AppError::conflict(format!("Table {} is not available", table.name))
            })?;

        let actor_rec = actor_record(actor)?;
        let order = match self
            .orders
            .create(new_order(
                table_rec.clone(),
                claimed.name.clone(),
                actor_rec.clone(),
                actor.name.clone(),
                req.customer_count,
                req.notes,
            ))
            .await
        {
            Ok(order) => order,
            Err(e) => {
                // Release the claim so a failed create leaves no
                // phantom-occupied table
                let _ = self
                    .tables
                    .try_set_status(&table_rec, &[TableStatus::Occupied], TableStatus::Available)
                    .await;
                return Err(e.into());
            }
        };

        let order_rec = record_of_order(&order)?;
        self.prints
            .create(&order_rec, &actor_rec, &actor.name, KitchenPrintType::NewOrder)
            .await?;

        let detail = self.detail(order).await?;
        self.fanout.table_assigned(&detail, &claimed).await?;
        Ok(detail)
    }

    /// Add items to a non-terminal order
    ///
    /// Each item snapshots the current menu price into
    /// `price_at_order`; later menu edits never touch it.
    pub async fn add_items(
        &self,
        actor: &Actor,
        order_id: &str,
        items: Vec<OrderItemInput>,
    ) -> AppResult<OrderDetail> {
        check_role(actor, FLOOR_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;
        ensure_not_terminal(&order)?;

        if items.is_empty() {
            return Err(AppError::validation("items must not be empty"));
        }

        for input in &items {
            validate_quantity(input.quantity)?;
            validate_note(input.note.as_deref(), "note")?;

            let menu_item = self
                .menu
                .find_item(&input.menu_item_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Menu item {} not found", input.menu_item_id))
                })?;
            if !menu_item.is_available {
                return Err(AppError::validation(format!(
                    "Menu item '{}' is not available",
                    menu_item.name
                )));
            }
            let menu_rec = menu_item
                .id
                .clone()
                .ok_or_else(|| AppError::internal("Menu item without id"))?;

            self.orders
                .add_item(OrderItem {
                    id: None,
                    order_id: order_rec.clone(),
                    menu_item: menu_rec,
                    name: menu_item.name,
                    quantity: input.quantity,
                    price_at_order: menu_item.price,
                    status: OrderItemStatus::Pending,
                    printed_to_kitchen: false,
                    note: input.note.clone(),
                    created_at: now_millis(),
                })
                .await?;
        }

        self.recompute_total(&order_rec).await?;

        let actor_rec = actor_record(actor)?;
        self.prints
            .create(&order_rec, &actor_rec, &actor.name, KitchenPrintType::AddItems)
            .await?;

        let detail = self.reload_detail(&order_rec).await?;
        self.fanout.order_updated(&detail).await?;
        Ok(detail)
    }

    /// Update an item's quantity/note, recomputing the order total
    pub async fn update_item(
        &self,
        actor: &Actor,
        order_id: &str,
        item_id: &str,
        req: OrderItemUpdate,
    ) -> AppResult<OrderDetail> {
        check_role(actor, FLOOR_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;
        ensure_not_terminal(&order)?;
        validate_quantity(req.quantity)?;
        validate_note(req.note.as_deref(), "note")?;

        let (_, item_rec) = self.load_item(&order_rec, item_id).await?;
        self.orders
            .update_item(&item_rec, req.quantity, req.note)
            .await?;
        self.recompute_total(&order_rec).await?;

        let detail = self.reload_detail(&order_rec).await?;
        self.fanout.order_updated(&detail).await?;
        Ok(detail)
    }

    /// Remove an item; when the last non-cancelled item goes, the
    /// order auto-cancels and the table is freed
    pub async fn remove_item(
        &self,
        actor: &Actor,
        order_id: &str,
        item_id: &str,
    ) -> AppResult<OrderDetail> {
        check_role(actor, FLOOR_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;
        ensure_not_terminal(&order)?;

        let (_, item_rec) = self.load_item(&order_rec, item_id).await?;
        self.orders.delete_item(&item_rec).await?;
        self.recompute_total(&order_rec).await?;

        let remaining = self
            .orders
            .find_items(&order_rec)
            .await?
            .iter()
            .filter(|i| i.status != OrderItemStatus::Cancelled)
            .count();

        if remaining == 0 {
            if let Some(cancelled) = self
                .orders
                .finalize_and_free_table(&order_rec, &order.dining_table, OrderStatus::Cancelled, None)
                .await?
            {
                let actor_rec = actor_record(actor)?;
                self.prints
                    .create(&order_rec, &actor_rec, &actor.name, KitchenPrintType::Cancellation)
                    .await?;
                let detail = self.detail(cancelled).await?;
                self.fanout.order_cancelled(&detail).await?;
                return Ok(detail);
            }
        }

        let detail = self.reload_detail(&order_rec).await?;
        self.fanout.order_updated(&detail).await?;
        Ok(detail)
    }

    /// Send the order to the kitchen: mark unprinted items, confirm
    pub async fn send_to_kitchen(&self, actor: &Actor, order_id: &str) -> AppResult<OrderDetail> {
        check_role(actor, FLOOR_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;
        ensure_not_terminal(&order)?;

        let unprinted = self.orders.unprinted_item_ids(&order_rec).await?;
        self.orders.mark_items_printed(&unprinted).await?;

        let updated = self
            .orders
            .try_set_status(&order_rec, NON_TERMINAL, OrderStatus::Confirmed)
            .await?
            .ok_or_else(|| not_modifiable(&order))?;

        let actor_rec = actor_record(actor)?;
        self.prints
            .create(&order_rec, &actor_rec, &actor.name, KitchenPrintType::SendToKitchen)
            .await?;

        let detail = self.detail(updated).await?;
        self.fanout.order_updated(&detail).await?;
        Ok(detail)
    }

    // ========================================================================
    // Kitchen flows
    // ========================================================================

    /// Kitchen takes the order: confirmed → preparing
    pub async fn start_preparing(&self, actor: &Actor, order_id: &str) -> AppResult<OrderDetail> {
        check_role(actor, KITCHEN_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;

        let updated = self
            .orders
            .try_set_status(&order_rec, &[OrderStatus::Confirmed], OrderStatus::Preparing)
            .await?
            .ok_or_else(|| {
                if order.status.is_terminal() {
                    not_modifiable(&order)
                } else {
                    AppError::conflict(format!(
                        "Order {} is not awaiting preparation (status: {})",
                        order.id_string(),
                        order.status
                    ))
                }
            })?;

        let actor_rec = actor_record(actor)?;
        self.prints
            .create(&order_rec, &actor_rec, &actor.name, KitchenPrintType::StartPreparing)
            .await?;

        let detail = self.detail(updated).await?;
        self.fanout.preparing_started(&detail).await?;
        Ok(detail)
    }

    /// Explicit kitchen mark-ready: preparing → ready
    pub async fn mark_ready(&self, actor: &Actor, order_id: &str) -> AppResult<OrderDetail> {
        check_role(actor, KITCHEN_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;

        let updated = self
            .orders
            .try_set_status(&order_rec, &[OrderStatus::Preparing], OrderStatus::Ready)
            .await?
            .ok_or_else(|| {
                if order.status.is_terminal() {
                    not_modifiable(&order)
                } else {
                    AppError::conflict(format!(
                        "Order {} is not being prepared (status: {})",
                        order.id_string(),
                        order.status
                    ))
                }
            })?;

        let actor_rec = actor_record(actor)?;
        self.prints
            .create(&order_rec, &actor_rec, &actor.name, KitchenPrintType::Ready)
            .await?;

        let detail = self.detail(updated).await?;
        self.fanout.order_ready(&detail).await?;
        Ok(detail)
    }

    /// Set one item's kitchen status
    ///
    /// After the change, if every non-cancelled item is `ready`, the
    /// order auto-advances to `ready` exactly once; re-checking an
    /// already-ready order is a no-op, not an error.
    pub async fn update_item_status(
        &self,
        actor: &Actor,
        order_id: &str,
        item_id: &str,
        status: OrderItemStatus,
    ) -> AppResult<OrderDetail> {
        check_role(actor, KITCHEN_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;
        ensure_not_terminal(&order)?;

        let (_, item_rec) = self.load_item(&order_rec, item_id).await?;
        self.orders
            .set_item_status(&item_rec, status)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order item {} not found", item_id)))?;

        // Cancelled items leave the total; uniform recompute keeps the
        // invariant regardless of which way the status moved
        self.recompute_total(&order_rec).await?;

        let items = self.orders.find_items(&order_rec).await?;
        let active: Vec<_> = items
            .iter()
            .filter(|i| i.status != OrderItemStatus::Cancelled)
            .collect();
        let all_ready =
            !active.is_empty() && active.iter().all(|i| i.status == OrderItemStatus::Ready);

        if all_ready
            && let Some(advanced) = self
                .orders
                .try_set_status(&order_rec, AUTO_READY_FROM, OrderStatus::Ready)
                .await?
        {
            let actor_rec = actor_record(actor)?;
            self.prints
                .create(&order_rec, &actor_rec, &actor.name, KitchenPrintType::Ready)
                .await?;
            let detail = self.detail(advanced).await?;
            self.fanout.order_ready(&detail).await?;
            return Ok(detail);
        }

        let detail = self.reload_detail(&order_rec).await?;
        self.fanout.order_updated(&detail).await?;
        Ok(detail)
    }

    /// Append a timestamped kitchen note to the order
    pub async fn append_note(
        &self,
        actor: &Actor,
        order_id: &str,
        note: &str,
    ) -> AppResult<OrderDetail> {
        check_role(actor, KITCHEN_ROLES)?;
        let trimmed = note.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("note must not be empty"));
        }
        validate_note(Some(trimmed), "note")?;

        let (order, order_rec) = self.load_order(order_id).await?;
        ensure_not_terminal(&order)?;

        let stamp = chrono::Utc::now().format("%H:%M");
        let line = format!("{}: {}", stamp, trimmed);
        let notes = match order.notes.as_deref() {
            Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, line),
            _ => line,
        };
        self.orders.update_notes(&order_rec, notes).await?;

        self.reload_detail(&order_rec).await
    }

    /// Kitchen reports a problem; reception is notified, no state change
    pub async fn report_issue(&self, actor: &Actor, order_id: &str, issue: &str) -> AppResult<()> {
        check_role(actor, KITCHEN_ROLES)?;
        let trimmed = issue.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("issue must not be empty"));
        }
        validate_note(Some(trimmed), "issue")?;

        let (order, _) = self.load_order(order_id).await?;
        self.fanout.kitchen_issue(&order, trimmed).await
    }

    // ========================================================================
    // Serving and settlement
    // ========================================================================

    /// Mark a ready order as served
    pub async fn mark_served(&self, actor: &Actor, order_id: &str) -> AppResult<OrderDetail> {
        check_role(actor, SERVE_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;

        let updated = self
            .orders
            .try_set_status(&order_rec, &[OrderStatus::Ready], OrderStatus::Served)
            .await?
            .ok_or_else(|| {
                if order.status.is_terminal() {
                    not_modifiable(&order)
                } else {
                    AppError::conflict(format!(
                        "Order {} is not ready to serve (status: {})",
                        order.id_string(),
                        order.status
                    ))
                }
            })?;

        let detail = self.detail(updated).await?;
        self.fanout.order_updated(&detail).await?;
        Ok(detail)
    }

    /// Settle the bill: order → paid, table freed in the same
    /// transaction
    pub async fn mark_paid(&self, actor: &Actor, order_id: &str) -> AppResult<OrderDetail> {
        check_role(actor, BILLING_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;

        let updated = self
            .orders
            .finalize_and_free_table(
                &order_rec,
                &order.dining_table,
                OrderStatus::Paid,
                Some(now_millis()),
            )
            .await?
            .ok_or_else(|| not_modifiable(&order))?;

        let detail = self.detail(updated).await?;
        self.fanout.order_paid(&detail).await?;
        Ok(detail)
    }

    /// Cancel a non-terminal order, freeing its table in the same
    /// transaction
    pub async fn cancel_order(&self, actor: &Actor, order_id: &str) -> AppResult<OrderDetail> {
        check_role(actor, CANCEL_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;

        let cancelled = self
            .orders
            .finalize_and_free_table(&order_rec, &order.dining_table, OrderStatus::Cancelled, None)
            .await?
            .ok_or_else(|| not_modifiable(&order))?;

        let actor_rec = actor_record(actor)?;
        self.prints
            .create(&order_rec, &actor_rec, &actor.name, KitchenPrintType::Cancellation)
            .await?;

        let detail = self.detail(cancelled).await?;
        self.fanout.order_cancelled(&detail).await?;
        Ok(detail)
    }

    /// Clear a table: cancel its active order if any, then free it
    pub async fn unassign_table(
        &self,
        actor: &Actor,
        table_id: &str,
    ) -> AppResult<(DiningTable, Option<OrderDetail>)> {
        check_role(actor, FLOOR_ROLES)?;
        let table = self
            .tables
            .find_by_id(table_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", table_id)))?;
        let table_rec = record_of_table(&table)?;

        if table.status == TableStatus::Available {
            return Err(AppError::conflict(format!(
                "Table {} is not occupied",
                table.name
            )));
        }

        if let Some(active) = self.orders.find_active_by_table(&table_rec).await? {
            let detail = self.cancel_order(actor, &active.id_string()).await?;
            let freed = self
                .tables
                .find_by_id(table_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Table {} not found", table_id)))?;
            return Ok((freed, Some(detail)));
        }

        let freed = self
            .tables
            .try_set_status(
                &table_rec,
                &[TableStatus::Occupied, TableStatus::Reserved],
                TableStatus::Available,
            )
            .await?
            .ok_or_else(|| {
                AppError::conflict(format!("Table {} is not occupied", table.name))
            })?;
        self.fanout.table_status_changed(&freed).await?;
        Ok((freed, None))
    }

    /// Hard-delete a pending order (admin), freeing its table
    pub async fn delete_order(&self, actor: &Actor, order_id: &str) -> AppResult<()> {
        check_role(actor, BILLING_ROLES)?;
        let (order, order_rec) = self.load_order(order_id).await?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::business_rule(
                "Cannot delete order that is not pending",
            ));
        }

        self.tables
            .try_set_status(
                &order.dining_table,
                &[TableStatus::Occupied],
                TableStatus::Available,
            )
            .await?;
        self.orders.delete_with_items(&order_rec).await?;

        if let Some(table) = self
            .tables
            .find_by_id(&order.dining_table.to_string())
            .await?
        {
            self.fanout.table_status_changed(&table).await?;
        }
        self.fanout.order_deleted(&order.id_string()).await?;
        Ok(())
    }

    // ========================================================================
    // Reads and internals
    // ========================================================================

    /// Full order representation with items and table
    pub async fn order_detail(&self, order_id: &str) -> AppResult<OrderDetail> {
        let (order, _) = self.load_order(order_id).await?;
        self.detail(order).await
    }

    /// Recompute the derived total over non-cancelled items
    ///
    /// Always a full recompute - never incremental - so concurrent
    /// add/remove races cannot drift the stored amount.
    async fn recompute_total(&self, order_rec: &RecordId) -> AppResult<f64> {
        let items = self.orders.find_items(order_rec).await?;
        let total = money::order_total(
            items
                .iter()
                .filter(|i| i.status != OrderItemStatus::Cancelled)
                .map(|i| (i.quantity, i.price_at_order)),
        );
        self.orders.update_total(order_rec, total).await?;
        Ok(total)
    }

    async fn load_order(&self, order_id: &str) -> AppResult<(Order, RecordId)> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        let rec = order
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Order without id"))?;
        Ok((order, rec))
    }

    async fn load_item(
        &self,
        order_rec: &RecordId,
        item_id: &str,
    ) -> AppResult<(OrderItem, RecordId)> {
        let item = self
            .orders
            .find_item(item_id)
            .await?
            .filter(|i| &i.order_id == order_rec)
            .ok_or_else(|| {
                AppError::not_found(format!("Order item {} not found on this order", item_id))
            })?;
        let rec = item
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Order item without id"))?;
        Ok((item, rec))
    }

    async fn detail(&self, order: Order) -> AppResult<OrderDetail> {
        let rec = order
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Order without id"))?;
        let items = self.orders.find_items(&rec).await?;
        let table = self
            .tables
            .find_by_id(&order.dining_table.to_string())
            .await?;
        Ok(OrderDetail {
            order,
            items,
            table,
        })
    }

    async fn reload_detail(&self, order_rec: &RecordId) -> AppResult<OrderDetail> {
        let order = self
            .orders
            .find_by_record(order_rec)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_rec)))?;
        self.detail(order).await
    }
}

/// Capability check - owners pass every gate
fn check_role(actor: &Actor, allowed: &[Role]) -> AppResult<()> {
    if actor.role == Role::Owner || allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Role '{}' may not perform this action",
            actor.role
        )))
    }
}

fn ensure_not_terminal(order: &Order) -> AppResult<()> {
    if order.status.is_terminal() {
        Err(not_modifiable(order))
    } else {
        Ok(())
    }
}

fn not_modifiable(order: &Order) -> AppError {
    AppError::conflict(format!(
        "Order {} can no longer be modified (status: {})",
        order.id_string(),
        order.status
    ))
}

fn actor_record(actor: &Actor) -> AppResult<RecordId> {
    parse_record_id(&actor.id, "employee")
        .map_err(|_| AppError::validation(format!("Invalid actor id: {}", actor.id)))
}

fn record_of_table(table: &DiningTable) -> AppResult<RecordId> {
    table
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Table without id"))
}
