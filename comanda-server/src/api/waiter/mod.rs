//! Waiter API

mod handler;

use axum::{Router, middleware, routing::{get, post}};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

const ROLES: &[Role] = &[Role::Waiter];

pub fn router() -> Router<ServerState> {
    let routes = Router::new()
        .route("/tables", get(handler::tables))
        .route("/orders", get(handler::orders))
        .route("/tables/{id}/assign", post(handler::assign_table))
        .route("/tables/{id}/unassign", post(handler::unassign_table))
        .route("/orders/{id}/items", post(handler::add_items))
        .route("/orders/{id}/send-to-kitchen", post(handler::send_to_kitchen))
        .route(
            "/orders/{id}/items/{item}",
            axum::routing::patch(handler::update_item).delete(handler::remove_item),
        )
        .layer(middleware::from_fn(require_role(ROLES)));

    Router::new().nest("/api/waiter", routes)
}
