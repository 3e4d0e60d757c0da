//! Kitchen API

mod handler;

use axum::{Router, middleware, routing::{get, post}};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

const ROLES: &[Role] = &[Role::Kitchen];

pub fn router() -> Router<ServerState> {
    let routes = Router::new()
        .route("/orders", get(handler::queue))
        .route("/orders/{id}/start-preparing", post(handler::start_preparing))
        .route("/orders/{id}/mark-ready", post(handler::mark_ready))
        .route("/orders/{id}/mark-served", post(handler::mark_served))
        .route("/orders/{id}/items/{item}/status", post(handler::update_item_status))
        .route("/orders/{id}/note", post(handler::add_note))
        .route("/orders/{id}/issue", post(handler::report_issue))
        .route("/prints", get(handler::prints))
        .layer(middleware::from_fn(require_role(ROLES)));

    Router::new().nest("/api/kitchen", routes)
}
