//! Menu API

mod handler;

use axum::{Router, middleware, routing::{get, post}};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

const MANAGE: &[Role] = &[Role::Reception];

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/categories", get(handler::categories))
        .route("/items", get(handler::items));

    let manage_routes = Router::new()
        .route("/categories", post(handler::create_category))
        .route("/items", post(handler::create_item))
        .route(
            "/items/{id}",
            axum::routing::patch(handler::update_item).delete(handler::delete_item),
        )
        .layer(middleware::from_fn(require_role(MANAGE)));

    Router::new().nest("/api/menu", read_routes.merge(manage_routes))
}
