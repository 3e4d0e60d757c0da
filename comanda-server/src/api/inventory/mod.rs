//! Inventory API

mod handler;

use axum::{Router, middleware, routing::{get, post}};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

const MANAGE: &[Role] = &[Role::Reception];

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/items", get(handler::items))
        .route("/items/{id}/history", get(handler::history))
        .route("/suppliers", get(handler::suppliers));

    let manage_routes = Router::new()
        .route("/items", post(handler::create_item))
        .route(
            "/items/{id}",
            axum::routing::patch(handler::update_item).delete(handler::delete_item),
        )
        .route("/items/{id}/stock", post(handler::adjust_stock))
        .layer(middleware::from_fn(require_role(MANAGE)));

    Router::new().nest("/api/inventory", read_routes.merge(manage_routes))
}
