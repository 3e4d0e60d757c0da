//! Reception API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::api::tables::handler::{TablesOverviewResponse, build_overview};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::OrderDetail;
use crate::db::repository::{DiningTableRepository, OrderRepository};
use crate::orders::money;
use crate::utils::AppResult;
use shared::util::today_start_millis;
use shared::{OrderItemStatus, OrderStatus, TableStatus};

/// GET /api/reception/tables
pub async fn tables(State(state): State<ServerState>) -> AppResult<Json<TablesOverviewResponse>> {
    Ok(Json(build_overview(&state).await?))
}

#[derive(Debug, Default, Serialize)]
pub struct ActiveOrderStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub preparing: usize,
    pub ready: usize,
}

#[derive(Debug, Serialize)]
pub struct ActiveOrdersResponse {
    pub orders: Vec<OrderDetail>,
    pub stats: ActiveOrderStats,
}

/// GET /api/reception/orders - orders in flight, newest first
pub async fn orders(State(state): State<ServerState>) -> AppResult<Json<ActiveOrdersResponse>> {
    let repo = OrderRepository::new(state.db.clone());
    let engine = state.order_engine();

    let orders = repo
        .find_by_status(
            &[
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                OrderStatus::Ready,
            ],
            false,
        )
        .await?;

    let mut stats = ActiveOrderStats {
        total: orders.len(),
        ..Default::default()
    };
    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
        match order.status {
            OrderStatus::Pending => stats.pending += 1,
            OrderStatus::Confirmed => stats.confirmed += 1,
            OrderStatus::Preparing => stats.preparing += 1,
            OrderStatus::Ready => stats.ready += 1,
            _ => {}
        }
        details.push(engine.order_detail(&order.id_string()).await?);
    }

    Ok(Json(ActiveOrdersResponse {
        orders: details,
        stats,
    }))
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub today_revenue: f64,
    pub today_orders: usize,
    pub active_tables: usize,
    pub total_tables: usize,
    pub pending_orders: usize,
    pub ready_orders: usize,
}

/// GET /api/reception/stats
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<DashboardStats>> {
    let orders = OrderRepository::new(state.db.clone());
    let tables = DiningTableRepository::new(state.db.clone()).find_all().await?;
    let start = today_start_millis();

    let active = orders
        .find_by_status(&[OrderStatus::Pending, OrderStatus::Confirmed], false)
        .await?;
    let ready = orders.find_by_status(&[OrderStatus::Ready], false).await?;

    Ok(Json(DashboardStats {
        today_revenue: orders.paid_revenue_since(start).await?,
        today_orders: orders.created_count_since(start).await?,
        active_tables: tables
            .iter()
            .filter(|t| t.status == TableStatus::Occupied)
            .count(),
        total_tables: tables.len(),
        pending_orders: active.len(),
        ready_orders: ready.len(),
    }))
}

#[derive(Debug, Serialize)]
pub struct BillLine {
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct Bill {
    pub order_id: String,
    pub table: String,
    pub waiter: String,
    pub customer_count: i32,
    pub items: Vec<BillLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// GET /api/reception/orders/{id}/bill
///
/// Tax comes from configuration; the stored order total stays
/// tax-free.
pub async fn bill(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Bill>> {
    let detail = state.order_engine().order_detail(&id).await?;

    let lines: Vec<BillLine> = detail
        .items
        .iter()
        .filter(|i| i.status != OrderItemStatus::Cancelled)
        .map(|i| BillLine {
            name: i.name.clone(),
            quantity: i.quantity,
            price: i.price_at_order,
            total: i.line_total(),
        })
        .collect();

    let subtotal = money::order_total(lines.iter().map(|l| (l.quantity, l.price)));
    let tax = money::tax_amount(subtotal, state.config.tax_rate);

    Ok(Json(Bill {
        order_id: detail.order.id_string(),
        table: detail.order.table_name.clone(),
        waiter: detail.order.waiter_name.clone(),
        customer_count: detail.order.customer_count,
        items: lines,
        subtotal,
        tax,
        total: money::round2(subtotal + tax),
        created_at: detail.order.created_at,
        completed_at: detail.order.completed_at,
    }))
}

/// POST /api/reception/orders/{id}/paid
pub async fn mark_paid(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.order_engine().mark_paid(&user.actor(), &id).await?;
    Ok(Json(detail))
}
