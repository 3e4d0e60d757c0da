//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Category, CategoryCreate, MenuItem, MenuItemCreate, MenuItemUpdate};
use crate::db::repository::MenuRepository;
use crate::utils::validation::{validate_name, validate_price};
use crate::utils::AppResult;

/// GET /api/menu/categories
pub async fn categories(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let repo = MenuRepository::new(state.db.clone());
    Ok(Json(repo.find_categories().await?))
}

/// POST /api/menu/categories
pub async fn create_category(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    validate_name(&payload.name, "name")?;
    let repo = MenuRepository::new(state.db.clone());
    Ok(Json(repo.create_category(payload).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    /// Only currently orderable items
    #[serde(default)]
    pub available: bool,
}

/// GET /api/menu/items
pub async fn items(
    State(state): State<ServerState>,
    Query(query): Query<ItemsQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let repo = MenuRepository::new(state.db.clone());
    let items = if query.available {
        repo.find_available_items().await?
    } else {
        repo.find_items().await?
    };
    Ok(Json(items))
}

/// POST /api/menu/items
pub async fn create_item(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<MenuItem>> {
    validate_name(&payload.name, "name")?;
    validate_price(payload.price, "price")?;
    let repo = MenuRepository::new(state.db.clone());
    Ok(Json(repo.create_item(payload).await?))
}

/// PATCH /api/menu/items/{id}
///
/// Price edits never touch existing orders - items carry their
/// price-at-order snapshot.
pub async fn update_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    if let Some(price) = payload.price {
        validate_price(price, "price")?;
    }
    let repo = MenuRepository::new(state.db.clone());
    Ok(Json(repo.update_item(&id, payload).await?))
}

/// DELETE /api/menu/items/{id}
pub async fn delete_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = MenuRepository::new(state.db.clone());
    Ok(Json(repo.delete_item(&id).await?))
}
