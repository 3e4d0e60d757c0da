//! Notification / broadcast fan-out
//!
//! One entry point per domain transition. Each call:
//! 1. persists a Notification row for every resolved recipient
//!    (failures propagate - the caller's operation fails), then
//! 2. publishes to the named broadcast channels (failures are logged
//!    and swallowed - delivery is best-effort).
//!
//! Event construction has no side effects; persisting and publishing
//! are explicit steps issued by the engine after a transition.

use std::sync::Arc;

use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::ResourceVersions;
use crate::db::models::{DiningTable, NotificationCreate, Order, OrderDetail};
use crate::db::repository::{EmployeeRepository, NotificationRepository};
use crate::message::{BusMessage, MessageBus, NotificationPayload, SyncPayload};
use crate::utils::AppResult;
use shared::Role;

/// Fan-out service
#[derive(Clone)]
pub struct Fanout {
    employees: EmployeeRepository,
    notifications: NotificationRepository,
    bus: Arc<MessageBus>,
    versions: Arc<ResourceVersions>,
}

impl Fanout {
    pub fn new(db: Surreal<Db>, bus: Arc<MessageBus>, versions: Arc<ResourceVersions>) -> Self {
        Self {
            employees: EmployeeRepository::new(db.clone()),
            notifications: NotificationRepository::new(db),
            bus,
            versions,
        }
    }

    // ========================================================================
    // Domain transitions
    // ========================================================================

    /// Table assigned: notify reception, announce on both channels
    pub async fn table_assigned(&self, detail: &OrderDetail, table: &DiningTable) -> AppResult<()> {
        let order_id = detail.order.id_string();
        let message = format!(
            "Table {} has been assigned to Order {} with {} customers.",
            table.name, order_id, detail.order.customer_count
        );
        let link = bill_link(&order_id);

        self.notify_reception(
            "table_assigned",
            "Table Assigned",
            &message,
            Some(link.clone()),
            Some(json!({ "order_id": order_id, "table_id": table_id(table) })),
        )
        .await?;

        self.publish_notification(
            NotificationPayload::new("TableAssigned", message)
                .with_link(link)
                .with_data(json!({ "order": detail, "table": table })),
        );
        self.publish_sync("dining_table", "status_changed", &table_id(table), Some(table));
        self.publish_sync("order", "created", &order_id, Some(detail));
        Ok(())
    }

    /// Order contents changed (items added/updated/removed, sent to kitchen)
    pub async fn order_updated(&self, detail: &OrderDetail) -> AppResult<()> {
        let order_id = detail.order.id_string();
        self.publish_notification(
            NotificationPayload::new(
                "OrderUpdated",
                format!("Order {} has been updated.", order_id),
            )
            .with_data(json!({ "order": detail })),
        );
        self.publish_sync("order", "updated", &order_id, Some(detail));
        Ok(())
    }

    /// Kitchen started preparing: notify reception
    pub async fn preparing_started(&self, detail: &OrderDetail) -> AppResult<()> {
        let order_id = detail.order.id_string();
        let message = format!("Order {} is now being prepared.", order_id);

        self.notify_reception(
            "order_status",
            "Order Started",
            &message,
            None,
            Some(json!({ "order_id": order_id, "status": "preparing" })),
        )
        .await?;

        self.publish_notification(
            NotificationPayload::new("OrderUpdated", message)
                .with_data(json!({ "order": detail })),
        );
        self.publish_sync("order", "updated", &order_id, Some(detail));
        Ok(())
    }

    /// Order ready: notify the owning waiter
    pub async fn order_ready(&self, detail: &OrderDetail) -> AppResult<()> {
        let order_id = detail.order.id_string();
        let message = format!("Order {} is ready to serve.", order_id);

        self.notifications
            .create(NotificationCreate {
                recipient: detail.order.waiter.clone(),
                kind: "order_ready".to_string(),
                title: "Order Ready".to_string(),
                message: message.clone(),
                data: Some(json!({ "order_id": order_id })),
                link: None,
            })
            .await?;

        self.publish_notification(
            NotificationPayload::new("OrderUpdated", message)
                .with_data(json!({ "order": detail })),
        );
        self.publish_sync("order", "updated", &order_id, Some(detail));
        Ok(())
    }

    /// Order paid: notify the owning waiter, table goes available
    pub async fn order_paid(&self, detail: &OrderDetail) -> AppResult<()> {
        let order_id = detail.order.id_string();
        let message = format!("Order {} has been paid and table cleared.", order_id);

        self.notifications
            .create(NotificationCreate {
                recipient: detail.order.waiter.clone(),
                kind: "order_paid".to_string(),
                title: "Order Paid".to_string(),
                message: message.clone(),
                data: Some(json!({ "order_id": order_id })),
                link: None,
            })
            .await?;

        self.publish_notification(
            NotificationPayload::new("OrderUpdated", message)
                .with_data(json!({ "order": detail })),
        );
        self.publish_sync("order", "updated", &order_id, Some(detail));
        if let Some(table) = &detail.table {
            self.publish_sync("dining_table", "status_changed", &table_id(table), Some(table));
        }
        Ok(())
    }

    /// Order cancelled: notify reception, table goes available
    pub async fn order_cancelled(&self, detail: &OrderDetail) -> AppResult<()> {
        let order_id = detail.order.id_string();
        let message = format!(
            "Order {} for Table {} has been cancelled.",
            order_id, detail.order.table_name
        );
        let link = bill_link(&order_id);

        self.notify_reception(
            "order_cancelled",
            "Order Cancelled",
            &message,
            Some(link.clone()),
            Some(json!({ "order_id": order_id })),
        )
        .await?;

        self.publish_notification(
            NotificationPayload::new("OrderCancelled", message)
                .with_link(link)
                .with_data(json!({ "order": detail })),
        );
        self.publish_sync("order", "updated", &order_id, Some(detail));
        if let Some(table) = &detail.table {
            self.publish_sync("dining_table", "status_changed", &table_id(table), Some(table));
        }
        Ok(())
    }

    /// Kitchen reported a problem with an order
    pub async fn kitchen_issue(&self, order: &Order, issue: &str) -> AppResult<()> {
        let order_id = order.id_string();
        let message = format!("Issue with Order {}: {}", order_id, issue);

        self.notify_reception(
            "kitchen_issue",
            "Kitchen Issue",
            &message,
            None,
            Some(json!({ "order_id": order_id, "issue": issue })),
        )
        .await?;

        self.publish_notification(
            NotificationPayload::new("OrderUpdated", message)
                .with_data(json!({ "order": order })),
        );
        Ok(())
    }

    /// Order hard-deleted (admin path)
    pub async fn order_deleted(&self, order_id: &str) -> AppResult<()> {
        self.publish_sync::<()>("order", "deleted", order_id, None);
        Ok(())
    }

    /// Table status changed outside the order lifecycle (reserve,
    /// maintenance, admin edits)
    pub async fn table_status_changed(&self, table: &DiningTable) -> AppResult<()> {
        self.publish_sync("dining_table", "status_changed", &table_id(table), Some(table));
        Ok(())
    }

    /// Inventory stock level changed
    pub async fn inventory_updated<T: serde::Serialize>(&self, id: &str, item: &T) -> AppResult<()> {
        self.publish_sync("inventory_item", "updated", id, Some(item));
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Persist a notification row for every active reception user
    async fn notify_reception(
        &self,
        kind: &str,
        title: &str,
        message: &str,
        link: Option<String>,
        data: Option<serde_json::Value>,
    ) -> AppResult<()> {
        let recipients = self.employees.find_active_by_role(Role::Reception).await?;
        if recipients.is_empty() {
            tracing::warn!(kind, "No reception users found to notify");
        }
        for recipient in recipients {
            let Some(id) = recipient.id else { continue };
            self.notifications
                .create(NotificationCreate {
                    recipient: id,
                    kind: kind.to_string(),
                    title: title.to_string(),
                    message: message.to_string(),
                    data: data.clone(),
                    link: link.clone(),
                })
                .await?;
        }
        Ok(())
    }

    /// Publish on the reception channel; best-effort
    fn publish_notification(&self, payload: NotificationPayload) {
        if let Err(e) = self.bus.publish(BusMessage::notification(&payload)) {
            tracing::warn!(error = %e, "Notification broadcast failed");
        }
    }

    /// Publish a sync event on the restaurant-updates channel; best-effort
    fn publish_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        if let Err(e) = self.bus.publish(BusMessage::sync(&payload)) {
            tracing::warn!(error = %e, "Sync broadcast failed");
        }
    }
}

fn table_id(table: &DiningTable) -> String {
    table.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
}

fn bill_link(order_id: &str) -> String {
    format!("/api/reception/orders/{}/bill", order_id)
}
