//! Staff administration API (owner)

mod handler;

use axum::{Router, middleware, routing::{get, patch}};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

const ROLES: &[Role] = &[Role::Owner];

pub fn router() -> Router<ServerState> {
    let routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}/toggle", patch(handler::toggle))
        .layer(middleware::from_fn(require_role(ROLES)));

    Router::new().nest("/api/staff", routes)
}
