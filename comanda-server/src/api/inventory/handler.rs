//! Inventory API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    InventoryItem, InventoryItemCreate, InventoryItemUpdate, StockAdjustKind, StockAdjustRequest,
    StockTransaction, Supplier,
};
use crate::db::repository::{InventoryRepository, parse_record_id};
use crate::orders::money;
use crate::utils::validation::{validate_name, validate_price};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct InventoryStats {
    pub total_items: usize,
    pub low_stock_items: usize,
    pub out_of_stock_items: usize,
    pub total_value: f64,
}

#[derive(Debug, Serialize)]
pub struct InventoryListResponse {
    pub items: Vec<InventoryItem>,
    pub stats: InventoryStats,
}

/// GET /api/inventory/items
pub async fn items(State(state): State<ServerState>) -> AppResult<Json<InventoryListResponse>> {
    let repo = InventoryRepository::new(state.db.clone());
    let items = repo.find_items().await?;

    let stats = InventoryStats {
        total_items: items.len(),
        low_stock_items: items
            .iter()
            .filter(|i| i.quantity <= i.reorder_level)
            .count(),
        out_of_stock_items: items.iter().filter(|i| i.quantity == 0).count(),
        total_value: money::order_total(items.iter().map(|i| (i.quantity, i.unit_price))),
    };

    Ok(Json(InventoryListResponse { items, stats }))
}

/// POST /api/inventory/items
pub async fn create_item(
    State(state): State<ServerState>,
    Json(payload): Json<InventoryItemCreate>,
) -> AppResult<Json<InventoryItem>> {
    validate_name(&payload.name, "name")?;
    validate_price(payload.unit_price, "unit_price")?;
    if payload.quantity < 0 || payload.reorder_level < 0 {
        return Err(AppError::validation(
            "quantity and reorder_level must be non-negative",
        ));
    }
    let repo = InventoryRepository::new(state.db.clone());
    Ok(Json(repo.create_item(payload).await?))
}

/// PATCH /api/inventory/items/{id}
pub async fn update_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<InventoryItemUpdate>,
) -> AppResult<Json<InventoryItem>> {
    if let Some(price) = payload.unit_price {
        validate_price(price, "unit_price")?;
    }
    let repo = InventoryRepository::new(state.db.clone());
    Ok(Json(repo.update_item(&id, payload).await?))
}

/// DELETE /api/inventory/items/{id}
pub async fn delete_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = InventoryRepository::new(state.db.clone());
    Ok(Json(repo.delete_item(&id).await?))
}

/// POST /api/inventory/items/{id}/stock
///
/// add/remove apply a delta (clamped at zero), set overwrites. Every
/// change appends a StockTransaction and broadcasts
/// `InventoryUpdated`.
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustRequest>,
) -> AppResult<Json<InventoryItem>> {
    match payload.kind {
        StockAdjustKind::Add | StockAdjustKind::Remove => {
            if payload.quantity <= 0 {
                return Err(AppError::validation("quantity must be positive"));
            }
        }
        StockAdjustKind::Set => {
            if payload.quantity < 0 {
                return Err(AppError::validation("quantity must be non-negative"));
            }
        }
    }
    if let Some(cost) = payload.cost {
        validate_price(cost, "cost")?;
    }

    let repo = InventoryRepository::new(state.db.clone());
    let item = repo
        .find_item(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Inventory item {} not found", id)))?;
    let rec = item
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Inventory item without id"))?;

    let old_quantity = item.quantity;
    let new_quantity = match payload.kind {
        StockAdjustKind::Add => old_quantity + payload.quantity,
        StockAdjustKind::Remove => (old_quantity - payload.quantity).max(0),
        StockAdjustKind::Set => payload.quantity,
    };

    let updated = repo.set_quantity(&rec, new_quantity).await?;

    let employee = parse_record_id(&user.id, "employee")
        .map_err(|_| AppError::validation(format!("Invalid user id: {}", user.id)))?;
    repo.record_transaction(
        &rec,
        &employee,
        payload.kind,
        payload.quantity,
        old_quantity,
        new_quantity,
        payload.cost,
        payload.notes,
    )
    .await?;

    state.fanout().inventory_updated(&id, &updated).await?;
    Ok(Json(updated))
}

/// GET /api/inventory/items/{id}/history
pub async fn history(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let repo = InventoryRepository::new(state.db.clone());
    let item = repo
        .find_item(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Inventory item {} not found", id)))?;
    let rec = item
        .id
        .ok_or_else(|| AppError::internal("Inventory item without id"))?;
    Ok(Json(repo.find_history(&rec).await?))
}

/// GET /api/inventory/suppliers
pub async fn suppliers(State(state): State<ServerState>) -> AppResult<Json<Vec<Supplier>>> {
    let repo = InventoryRepository::new(state.db.clone());
    Ok(Json(repo.find_suppliers().await?))
}
