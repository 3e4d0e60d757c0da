//! Waiter API Handlers
//!
//! Thin wrappers over the order engine; the engine owns every
//! transition rule.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::api::tables::handler::{TablesOverviewResponse, build_overview};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{OrderDetail, OrderItemInput, OrderItemUpdate};
use crate::db::repository::{OrderRepository, parse_record_id};
use crate::orders::AssignTableRequest;
use crate::utils::{AppError, AppResult};

/// GET /api/waiter/tables - floor overview
pub async fn tables(State(state): State<ServerState>) -> AppResult<Json<TablesOverviewResponse>> {
    Ok(Json(build_overview(&state).await?))
}

/// GET /api/waiter/orders - the waiter's own active orders
pub async fn orders(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let waiter = parse_record_id(&user.id, "employee")
        .map_err(|_| AppError::validation(format!("Invalid actor id: {}", user.id)))?;
    let repo = OrderRepository::new(state.db.clone());
    let engine = state.order_engine();

    let mut details = Vec::new();
    for order in repo.find_active_by_waiter(&waiter).await? {
        details.push(engine.order_detail(&order.id_string()).await?);
    }
    Ok(Json(details))
}

/// POST /api/waiter/tables/{id}/assign
pub async fn assign_table(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<AssignTableRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state
        .order_engine()
        .assign_table(&user.actor(), &id, payload)
        .await?;
    Ok(Json(detail))
}

/// POST /api/waiter/tables/{id}/unassign
pub async fn unassign_table(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let (table, cancelled) = state
        .order_engine()
        .unassign_table(&user.actor(), &id)
        .await?;
    Ok(Json(serde_json::json!({
        "message": "Table cleared successfully",
        "table": table,
        "cancelled_order": cancelled,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    pub items: Vec<OrderItemInput>,
}

/// POST /api/waiter/orders/{id}/items
pub async fn add_items(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<AddItemsRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state
        .order_engine()
        .add_items(&user.actor(), &id, payload.items)
        .await?;
    Ok(Json(detail))
}

/// POST /api/waiter/orders/{id}/send-to-kitchen
pub async fn send_to_kitchen(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state
        .order_engine()
        .send_to_kitchen(&user.actor(), &id)
        .await?;
    Ok(Json(detail))
}

/// PATCH /api/waiter/orders/{id}/items/{item}
pub async fn update_item(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, item)): Path<(String, String)>,
    Json(payload): Json<OrderItemUpdate>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state
        .order_engine()
        .update_item(&user.actor(), &id, &item, payload)
        .await?;
    Ok(Json(detail))
}

/// DELETE /api/waiter/orders/{id}/items/{item}
pub async fn remove_item(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, item)): Path<(String, String)>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state
        .order_engine()
        .remove_item(&user.actor(), &id, &item)
        .await?;
    Ok(Json(detail))
}
