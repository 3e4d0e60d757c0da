//! Notifications API
//!
//! Every route operates on the authenticated user's own feed;
//! touching someone else's notification is a 403.

mod handler;

use axum::{Router, routing::{delete, get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let routes = Router::new()
        .route("/", get(handler::list).delete(handler::clear_all))
        .route("/recent", get(handler::recent))
        .route("/unread-count", get(handler::unread_count))
        .route("/read-all", post(handler::mark_all_read))
        .route("/{id}/read", post(handler::mark_read))
        .route("/{id}", delete(handler::delete_one));

    Router::new().nest("/api/notifications", routes)
}
