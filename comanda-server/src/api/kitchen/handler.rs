//! Kitchen API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{KitchenPrint, OrderDetail};
use crate::db::repository::OrderRepository;
use crate::printing::KitchenTicketTracker;
use crate::utils::AppResult;
use shared::{OrderItemStatus, OrderStatus};

#[derive(Debug, Default, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub confirmed: usize,
    pub preparing: usize,
    pub ready: usize,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub orders: Vec<OrderDetail>,
    pub stats: QueueStats,
}

/// GET /api/kitchen/orders - active queue, oldest first
pub async fn queue(State(state): State<ServerState>) -> AppResult<Json<QueueResponse>> {
    let repo = OrderRepository::new(state.db.clone());
    let engine = state.order_engine();

    let orders = repo
        .find_by_status(
            &[
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                OrderStatus::Ready,
            ],
            true,
        )
        .await?;

    let mut stats = QueueStats {
        total: orders.len(),
        ..Default::default()
    };
    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
        match order.status {
            OrderStatus::Confirmed => stats.confirmed += 1,
            OrderStatus::Preparing => stats.preparing += 1,
            OrderStatus::Ready => stats.ready += 1,
            _ => {}
        }
        details.push(engine.order_detail(&order.id_string()).await?);
    }

    Ok(Json(QueueResponse {
        orders: details,
        stats,
    }))
}

/// POST /api/kitchen/orders/{id}/start-preparing
pub async fn start_preparing(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state
        .order_engine()
        .start_preparing(&user.actor(), &id)
        .await?;
    Ok(Json(detail))
}

/// POST /api/kitchen/orders/{id}/mark-ready
pub async fn mark_ready(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.order_engine().mark_ready(&user.actor(), &id).await?;
    Ok(Json(detail))
}

/// POST /api/kitchen/orders/{id}/mark-served
pub async fn mark_served(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.order_engine().mark_served(&user.actor(), &id).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct ItemStatusRequest {
    pub status: OrderItemStatus,
}

/// POST /api/kitchen/orders/{id}/items/{item}/status
pub async fn update_item_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, item)): Path<(String, String)>,
    Json(payload): Json<ItemStatusRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state
        .order_engine()
        .update_item_status(&user.actor(), &id, &item, payload.status)
        .await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub note: String,
}

/// POST /api/kitchen/orders/{id}/note - timestamped note append
pub async fn add_note(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<NoteRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state
        .order_engine()
        .append_note(&user.actor(), &id, &payload.note)
        .await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub issue: String,
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub message: &'static str,
}

/// POST /api/kitchen/orders/{id}/issue - report a problem to reception
pub async fn report_issue(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<IssueRequest>,
) -> AppResult<Json<IssueResponse>> {
    state
        .order_engine()
        .report_issue(&user.actor(), &id, &payload.issue)
        .await?;
    Ok(Json(IssueResponse {
        message: "Issue reported successfully",
    }))
}

#[derive(Debug, Serialize)]
pub struct PrintsResponse {
    pub prints: Vec<KitchenPrint>,
    pub today_count: usize,
}

/// GET /api/kitchen/prints - today's ticket feed
pub async fn prints(State(state): State<ServerState>) -> AppResult<Json<PrintsResponse>> {
    let tracker = KitchenTicketTracker::new(state.db.clone());
    let prints = tracker.today().await?;
    let today_count = prints.len();
    Ok(Json(PrintsResponse {
        prints,
        today_count,
    }))
}
