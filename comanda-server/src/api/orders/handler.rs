//! Orders Admin Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderDetail};
use crate::db::repository::OrderRepository;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// GET /api/orders - paginated, newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.find_all(query.limit, query.offset).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.order_engine().order_detail(&id).await?;
    Ok(Json(detail))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.order_engine().cancel_order(&user.actor(), &id).await?;
    Ok(Json(detail))
}

/// DELETE /api/orders/{id} - pending orders only, frees the table
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.order_engine().delete_order(&user.actor(), &id).await?;
    Ok(Json(true))
}
