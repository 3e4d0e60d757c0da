//! Orders admin API

mod handler;

use axum::{Router, middleware, routing::{get, post}};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

const ROLES: &[Role] = &[Role::Reception];

pub fn router() -> Router<ServerState> {
    let routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/cancel", post(handler::cancel))
        .layer(middleware::from_fn(require_role(ROLES)));

    Router::new().nest("/api/orders", routes)
}
