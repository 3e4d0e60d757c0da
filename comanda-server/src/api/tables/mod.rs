//! Tables API

pub(crate) mod handler;

use axum::{Router, middleware, routing::{get, post, put}};
use shared::Role;

use crate::auth::require_role;
use crate::core::ServerState;

const FLOOR: &[Role] = &[Role::Waiter, Role::Reception];
const MANAGE: &[Role] = &[Role::Reception];

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/layout", get(handler::get_layout))
        .route("/{id}", get(handler::get_by_id));

    let floor_routes = Router::new()
        .route("/{id}/assign", post(handler::assign))
        .route("/{id}/unassign", post(handler::unassign))
        .route("/{id}/reserve", post(handler::reserve))
        .layer(middleware::from_fn(require_role(FLOOR)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/layout", put(handler::update_layout))
        .route(
            "/{id}",
            axum::routing::patch(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_role(MANAGE)));

    Router::new().nest(
        "/api/tables",
        read_routes.merge(floor_routes).merge(manage_routes),
    )
}
