//! Reception API

mod handler;

use axum::{Router, middleware, routing::{get, post}};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

const ROLES: &[Role] = &[Role::Reception];

pub fn router() -> Router<ServerState> {
    let routes = Router::new()
        .route("/tables", get(handler::tables))
        .route("/orders", get(handler::orders))
        .route("/stats", get(handler::stats))
        .route("/orders/{id}/bill", get(handler::bill))
        .route("/orders/{id}/paid", post(handler::mark_paid))
        .layer(middleware::from_fn(require_role(ROLES)));

    Router::new().nest("/api/reception", routes)
}
