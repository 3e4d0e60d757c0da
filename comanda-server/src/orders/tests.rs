//! Engine integration tests
//!
//! Run against a throwaway RocksDB data dir; every test gets its own
//! database, bus and seeded staff.

use std::sync::Arc;

use tempfile::TempDir;

use super::*;
use crate::core::ResourceVersions;
use crate::db::DbService;
use crate::db::models::{CategoryCreate, DiningTableCreate, MenuItemCreate, OrderItemInput, OrderItemUpdate};
use crate::db::repository::{
    DiningTableRepository, EmployeeRepository, MenuRepository, NotificationRepository,
    OrderRepository,
};
use crate::message::{EventType, MessageBus, Transport};
use crate::printing::KitchenTicketTracker;
use crate::services::Fanout;
use crate::utils::AppError;
use shared::{Actor, KitchenPrintType, OrderItemStatus, OrderStatus, Role, TableStatus};

struct TestEnv {
    engine: OrderEngine,
    db: surrealdb::Surreal<surrealdb::engine::local::Db>,
    bus: Arc<MessageBus>,
    waiter: Actor,
    kitchen: Actor,
    reception: Actor,
    // Keeps the data dir alive for the test's duration
    _dir: TempDir,
}

impl TestEnv {
    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.clone())
    }

    fn tables(&self) -> DiningTableRepository {
        DiningTableRepository::new(self.db.clone())
    }

    fn notifications(&self) -> NotificationRepository {
        NotificationRepository::new(self.db.clone())
    }

    async fn create_table(&self, name: &str, capacity: i32) -> String {
        let table = self
            .tables()
            .create(DiningTableCreate {
                name: name.to_string(),
                capacity: Some(capacity),
                layout: None,
            })
            .await
            .unwrap();
        table.id.unwrap().to_string()
    }

    async fn create_menu_item(&self, name: &str, price: f64) -> String {
        let menu = MenuRepository::new(self.db.clone());
        let category = match menu.find_categories().await.unwrap().into_iter().next() {
            Some(c) => c,
            None => menu
                .create_category(CategoryCreate {
                    name: "Mains".to_string(),
                    description: None,
                    display_order: None,
                })
                .await
                .unwrap(),
        };
        let item = menu
            .create_item(MenuItemCreate {
                name: name.to_string(),
                description: None,
                price,
                category_id: category.id.unwrap().to_string(),
            })
            .await
            .unwrap();
        item.id.unwrap().to_string()
    }
}

async fn setup() -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = DbService::new(&db_path.to_string_lossy()).await.unwrap().db;

    let bus = Arc::new(MessageBus::new());
    let fanout = Fanout::new(db.clone(), bus.clone(), Arc::new(ResourceVersions::new()));
    let engine = OrderEngine::new(db.clone(), fanout);

    let employees = EmployeeRepository::new(db.clone());
    let mut actors = Vec::new();
    for (username, role) in [
        ("ana", Role::Waiter),
        ("bruno", Role::Kitchen),
        ("carla", Role::Reception),
    ] {
        let employee = employees
            .create(crate::db::models::EmployeeCreate {
                username: username.to_string(),
                password: "secret-pass".to_string(),
                display_name: None,
                role,
            })
            .await
            .unwrap();
        actors.push(Actor::new(
            employee.id_string(),
            employee.display_name,
            role,
        ));
    }
    let reception = actors.pop().unwrap();
    let kitchen = actors.pop().unwrap();
    let waiter = actors.pop().unwrap();

    TestEnv {
        engine,
        db,
        bus,
        waiter,
        kitchen,
        reception,
        _dir: dir,
    }
}

fn item_input(menu_item_id: &str, quantity: i32) -> OrderItemInput {
    OrderItemInput {
        menu_item_id: menu_item_id.to_string(),
        quantity,
        note: None,
    }
}

fn assign_req(customer_count: i32) -> AssignTableRequest {
    AssignTableRequest {
        customer_count,
        notes: None,
    }
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn assign_order_pay_flow() {
    let env = setup().await;
    let table_id = env.create_table("T1", 4).await;
    let dish = env.create_menu_item("Paella", 10.0).await;

    // Assign with 2 customers
    let detail = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(2))
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.total_amount, 0.0);
    assert_eq!(detail.order.customer_count, 2);

    let table = env.tables().find_by_id(&table_id).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Occupied);

    // Two units of a $10 dish
    let order_id = detail.order.id_string();
    let detail = env
        .engine
        .add_items(
            &env.waiter,
            &order_id,
            vec![item_input(&dish, 1), item_input(&dish, 1)],
        )
        .await
        .unwrap();
    assert_eq!(detail.order.total_amount, 20.0);
    assert_eq!(detail.items.len(), 2);

    // Remove one unit
    let removed_id = detail.items[0].id_string();
    let detail = env
        .engine
        .remove_item(&env.waiter, &order_id, &removed_id)
        .await
        .unwrap();
    assert_eq!(detail.order.total_amount, 10.0);

    // Settle the bill
    let detail = env
        .engine
        .mark_paid(&env.reception, &order_id)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Paid);
    assert!(detail.order.completed_at.is_some());

    let table = env.tables().find_by_id(&table_id).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Available);
}

#[tokio::test]
async fn totals_always_derived_from_items() {
    let env = setup().await;
    let table_id = env.create_table("T1", 4).await;
    let dish_a = env.create_menu_item("Gazpacho", 4.5).await;
    let dish_b = env.create_menu_item("Tortilla", 7.25).await;

    let detail = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(3))
        .await
        .unwrap();
    let order_id = detail.order.id_string();

    let detail = env
        .engine
        .add_items(
            &env.waiter,
            &order_id,
            vec![item_input(&dish_a, 2), item_input(&dish_b, 1)],
        )
        .await
        .unwrap();
    assert_eq!(detail.order.total_amount, 16.25);

    // Quantity update recomputes
    let item_id = detail
        .items
        .iter()
        .find(|i| i.name == "Gazpacho")
        .unwrap()
        .id_string();
    let detail = env
        .engine
        .update_item(
            &env.waiter,
            &order_id,
            &item_id,
            OrderItemUpdate {
                quantity: 3,
                note: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(detail.order.total_amount, 20.75);

    // A cancelled item leaves the total
    let detail = env
        .engine
        .update_item_status(&env.kitchen, &order_id, &item_id, OrderItemStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(detail.order.total_amount, 7.25);
}

#[tokio::test]
async fn price_at_order_survives_menu_edits() {
    let env = setup().await;
    let table_id = env.create_table("T1", 4).await;
    let dish = env.create_menu_item("Croquetas", 6.0).await;

    let detail = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(1))
        .await
        .unwrap();
    let order_id = detail.order.id_string();
    env.engine
        .add_items(&env.waiter, &order_id, vec![item_input(&dish, 2)])
        .await
        .unwrap();

    // Menu price doubles after the order was taken
    let menu = MenuRepository::new(env.db.clone());
    menu.update_item(
        &dish,
        crate::db::models::MenuItemUpdate {
            name: None,
            description: None,
            price: Some(12.0),
            category_id: None,
            is_available: None,
        },
    )
    .await
    .unwrap();

    let detail = env.engine.order_detail(&order_id).await.unwrap();
    assert_eq!(detail.items[0].price_at_order, 6.0);
    assert_eq!(detail.order.total_amount, 12.0);
}

// ============================================================================
// Conflicts and terminal states
// ============================================================================

#[tokio::test]
async fn assigning_occupied_table_conflicts() {
    let env = setup().await;
    let table_id = env.create_table("T2", 4).await;

    let first = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(2))
        .await
        .unwrap();

    let second = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(2))
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    // Still exactly one active order, table still occupied by it
    let table = env.tables().find_by_id(&table_id).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
    let active = env
        .orders()
        .find_active_by_table(&table.id.clone().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id_string(), first.order.id_string());
}

#[tokio::test]
async fn concurrent_assignment_has_one_winner() {
    let env = setup().await;
    let table_id = env.create_table("T3", 6).await;

    let e1 = env.engine.clone();
    let e2 = env.engine.clone();
    let (a, b) = tokio::join!(
        e1.assign_table(&env.waiter, &table_id, assign_req(2)),
        e2.assign_table(&env.reception, &table_id, assign_req(3)),
    );

    let winners = [a.is_ok(), b.is_ok()].iter().filter(|&&ok| ok).count();
    assert_eq!(winners, 1, "exactly one concurrent assignment must win");

    let table = env.tables().find_by_id(&table_id).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
}

#[tokio::test]
async fn terminal_orders_reject_every_mutation() {
    let env = setup().await;
    let table_id = env.create_table("T1", 4).await;
    let dish = env.create_menu_item("Flan", 3.5).await;

    let detail = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(2))
        .await
        .unwrap();
    let order_id = detail.order.id_string();
    env.engine
        .add_items(&env.waiter, &order_id, vec![item_input(&dish, 1)])
        .await
        .unwrap();
    env.engine.mark_paid(&env.reception, &order_id).await.unwrap();

    // Paying again conflicts, state unchanged
    let again = env.engine.mark_paid(&env.reception, &order_id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    let order = env.orders().find_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Paid);

    // So does every other mutation
    let add = env
        .engine
        .add_items(&env.waiter, &order_id, vec![item_input(&dish, 1)])
        .await;
    assert!(matches!(add, Err(AppError::Conflict(_))));

    let cancel = env.engine.cancel_order(&env.waiter, &order_id).await;
    assert!(matches!(cancel, Err(AppError::Conflict(_))));

    let send = env.engine.send_to_kitchen(&env.waiter, &order_id).await;
    assert!(matches!(send, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn cancel_frees_the_table() {
    let env = setup().await;
    let table_id = env.create_table("T1", 2).await;

    let detail = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(2))
        .await
        .unwrap();
    let order_id = detail.order.id_string();

    let detail = env.engine.cancel_order(&env.waiter, &order_id).await.unwrap();
    assert_eq!(detail.order.status, OrderStatus::Cancelled);

    let table = env.tables().find_by_id(&table_id).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Available);
}

#[tokio::test]
async fn removing_last_item_cancels_order_and_frees_table() {
    let env = setup().await;
    let table_id = env.create_table("T1", 4).await;
    let dish = env.create_menu_item("Pan", 1.5).await;

    let detail = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(1))
        .await
        .unwrap();
    let order_id = detail.order.id_string();
    let detail = env
        .engine
        .add_items(&env.waiter, &order_id, vec![item_input(&dish, 1)])
        .await
        .unwrap();

    let item_id = detail.items[0].id_string();
    let detail = env
        .engine
        .remove_item(&env.waiter, &order_id, &item_id)
        .await
        .unwrap();

    assert_eq!(detail.order.status, OrderStatus::Cancelled);
    assert_eq!(detail.order.total_amount, 0.0);
    let table = env.tables().find_by_id(&table_id).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Available);
}

// ============================================================================
// Kitchen workflow
// ============================================================================

async fn confirmed_order(env: &TestEnv, dish_count: usize) -> (String, Vec<String>) {
    let table_id = env.create_table("K1", 8).await;
    let mut inputs = Vec::new();
    for i in 0..dish_count {
        let dish = env.create_menu_item(&format!("Dish {}", i), 5.0).await;
        inputs.push(item_input(&dish, 1));
    }
    let detail = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(2))
        .await
        .unwrap();
    let order_id = detail.order.id_string();
    env.engine
        .add_items(&env.waiter, &order_id, inputs)
        .await
        .unwrap();
    let detail = env
        .engine
        .send_to_kitchen(&env.waiter, &order_id)
        .await
        .unwrap();
    let item_ids = detail.items.iter().map(|i| i.id_string()).collect();
    (order_id, item_ids)
}

#[tokio::test]
async fn kitchen_advance_is_strict() {
    let env = setup().await;
    let (order_id, _) = confirmed_order(&env, 1).await;

    // Ready before preparing conflicts
    let early = env.engine.mark_ready(&env.kitchen, &order_id).await;
    assert!(matches!(early, Err(AppError::Conflict(_))));

    let detail = env
        .engine
        .start_preparing(&env.kitchen, &order_id)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Preparing);

    // Starting again conflicts
    let twice = env.engine.start_preparing(&env.kitchen, &order_id).await;
    assert!(matches!(twice, Err(AppError::Conflict(_))));

    let detail = env.engine.mark_ready(&env.kitchen, &order_id).await.unwrap();
    assert_eq!(detail.order.status, OrderStatus::Ready);

    let detail = env.engine.mark_served(&env.waiter, &order_id).await.unwrap();
    assert_eq!(detail.order.status, OrderStatus::Served);
}

#[tokio::test]
async fn serving_requires_ready() {
    let env = setup().await;
    let (order_id, _) = confirmed_order(&env, 1).await;

    let early = env.engine.mark_served(&env.waiter, &order_id).await;
    assert!(matches!(early, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn all_items_ready_auto_advances_once() {
    let env = setup().await;
    let (order_id, item_ids) = confirmed_order(&env, 3).await;
    env.engine
        .start_preparing(&env.kitchen, &order_id)
        .await
        .unwrap();

    // ready, ready, cancelled → auto mark-ready
    env.engine
        .update_item_status(&env.kitchen, &order_id, &item_ids[0], OrderItemStatus::Ready)
        .await
        .unwrap();
    env.engine
        .update_item_status(
            &env.kitchen,
            &order_id,
            &item_ids[2],
            OrderItemStatus::Cancelled,
        )
        .await
        .unwrap();
    let detail = env
        .engine
        .update_item_status(&env.kitchen, &order_id, &item_ids[1], OrderItemStatus::Ready)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Ready);

    // Re-triggering the check on a ready order is a no-op, not an error
    let detail = env
        .engine
        .update_item_status(&env.kitchen, &order_id, &item_ids[0], OrderItemStatus::Ready)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Ready);
}

#[tokio::test]
async fn tickets_track_unprinted_items() {
    let env = setup().await;
    let table_id = env.create_table("T1", 4).await;
    let dish = env.create_menu_item("Calamares", 8.0).await;
    let tracker = KitchenTicketTracker::new(env.db.clone());

    let detail = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(2))
        .await
        .unwrap();
    let order_id = detail.order.id_string();

    env.engine
        .add_items(&env.waiter, &order_id, vec![item_input(&dish, 2)])
        .await
        .unwrap();
    assert_eq!(tracker.unprinted_count(&order_id).await.unwrap(), 1);

    env.engine
        .send_to_kitchen(&env.waiter, &order_id)
        .await
        .unwrap();
    assert_eq!(tracker.unprinted_count(&order_id).await.unwrap(), 0);

    // New items after the first send need printing again
    env.engine
        .add_items(&env.waiter, &order_id, vec![item_input(&dish, 1)])
        .await
        .unwrap();
    assert_eq!(tracker.unprinted_count(&order_id).await.unwrap(), 1);

    // Marking printed through the tracker clears the unprinted set
    let detail = env.engine.order_detail(&order_id).await.unwrap();
    let unprinted_ids: Vec<String> = detail
        .items
        .iter()
        .filter(|i| !i.printed_to_kitchen)
        .map(|i| i.id_string())
        .collect();
    tracker
        .mark_printed(&order_id, &unprinted_ids)
        .await
        .unwrap();
    assert_eq!(tracker.unprinted_count(&order_id).await.unwrap(), 0);

    // A reprint is a new log entry, it does not reset printed flags
    tracker
        .record_print(&order_id, &env.waiter, KitchenPrintType::SendToKitchen)
        .await
        .unwrap();
    assert_eq!(tracker.unprinted_count(&order_id).await.unwrap(), 0);

    // The log is append-only and carries the event kinds
    let history = tracker.history(&order_id).await.unwrap();
    let kinds: Vec<KitchenPrintType> = history.iter().map(|p| p.print_type).collect();
    assert_eq!(
        kinds,
        vec![
            KitchenPrintType::NewOrder,
            KitchenPrintType::AddItems,
            KitchenPrintType::SendToKitchen,
            KitchenPrintType::AddItems,
            KitchenPrintType::SendToKitchen,
        ]
    );
}

// ============================================================================
// Capability checks
// ============================================================================

#[tokio::test]
async fn role_gates_hold() {
    let env = setup().await;
    let table_id = env.create_table("T1", 4).await;

    // Kitchen cannot open tables
    let assign = env
        .engine
        .assign_table(&env.kitchen, &table_id, assign_req(2))
        .await;
    assert!(matches!(assign, Err(AppError::Forbidden(_))));

    let detail = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(2))
        .await
        .unwrap();
    let order_id = detail.order.id_string();
    env.engine
        .send_to_kitchen(&env.waiter, &order_id)
        .await
        .unwrap();

    // Waiters cannot run the kitchen workflow
    let prep = env.engine.start_preparing(&env.waiter, &order_id).await;
    assert!(matches!(prep, Err(AppError::Forbidden(_))));

    // Waiters cannot settle bills
    let paid = env.engine.mark_paid(&env.waiter, &order_id).await;
    assert!(matches!(paid, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn customer_count_validated_against_capacity() {
    let env = setup().await;
    let table_id = env.create_table("T1", 2).await;

    let too_many = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(5))
        .await;
    assert!(matches!(too_many, Err(AppError::Validation(_))));

    let zero = env
        .engine
        .assign_table(&env.waiter, &table_id, assign_req(0))
        .await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    // Neither attempt touched the table
    let table = env.tables().find_by_id(&table_id).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Available);
}

// ============================================================================
// Fan-out
// ============================================================================

#[tokio::test]
async fn assignment_notifies_reception_and_broadcasts() {
    let env = setup().await;
    let table_id = env.create_table("T1", 4).await;
    let transport = env.bus.memory_transport();

    env.engine
        .assign_table(&env.waiter, &table_id, assign_req(2))
        .await
        .unwrap();

    // Reception got a persisted notification row
    let reception_rec = env.reception.id.parse().unwrap();
    let rows = env
        .notifications()
        .find_by_recipient(&reception_rec, 50)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, "table_assigned");
    assert!(!rows[0].is_read());

    // And the broadcast went out (notification + sync events)
    let first = transport.read_message().await.unwrap();
    assert_eq!(first.event_type, EventType::Notification);
    let mut saw_sync = false;
    for _ in 0..2 {
        let msg = transport.read_message().await.unwrap();
        if msg.event_type == EventType::Sync {
            saw_sync = true;
        }
    }
    assert!(saw_sync);
}

#[tokio::test]
async fn ready_and_paid_notify_the_owning_waiter() {
    let env = setup().await;
    let (order_id, _) = confirmed_order(&env, 1).await;
    env.engine
        .start_preparing(&env.kitchen, &order_id)
        .await
        .unwrap();
    env.engine.mark_ready(&env.kitchen, &order_id).await.unwrap();
    env.engine.mark_served(&env.waiter, &order_id).await.unwrap();
    env.engine.mark_paid(&env.reception, &order_id).await.unwrap();

    let waiter_rec = env.waiter.id.parse().unwrap();
    let rows = env
        .notifications()
        .find_by_recipient(&waiter_rec, 50)
        .await
        .unwrap();
    let kinds: Vec<&str> = rows.iter().map(|n| n.kind.as_str()).collect();
    assert!(kinds.contains(&"order_ready"));
    assert!(kinds.contains(&"order_paid"));
}

#[tokio::test]
async fn kitchen_issue_reaches_reception() {
    let env = setup().await;
    let (order_id, _) = confirmed_order(&env, 1).await;

    env.engine
        .report_issue(&env.kitchen, &order_id, "out of saffron")
        .await
        .unwrap();

    let reception_rec = env.reception.id.parse().unwrap();
    let rows = env
        .notifications()
        .find_by_recipient(&reception_rec, 50)
        .await
        .unwrap();
    assert!(rows.iter().any(|n| n.kind == "kitchen_issue"
        && n.message.contains("out of saffron")));
}
