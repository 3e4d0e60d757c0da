//! API routes
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`auth`] - login, current user
//! - [`tables`] - table administration, reserve, layout
//! - [`orders`] - order administration
//! - [`waiter`] - waiter dashboard and floor flows
//! - [`kitchen`] - kitchen queue and workflow
//! - [`reception`] - reception dashboard, billing
//! - [`notifications`] - per-user notification feed
//! - [`menu`] - categories and menu items
//! - [`inventory`] - stock and suppliers
//! - [`staff`] - staff administration (owner)

pub mod auth;
pub mod health;

pub mod inventory;
pub mod kitchen;
pub mod menu;
pub mod notifications;
pub mod orders;
pub mod reception;
pub mod staff;
pub mod tables;
pub mod waiter;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(waiter::router())
        .merge(kitchen::router())
        .merge(reception::router())
        .merge(notifications::router())
        .merge(menu::router())
        .merge(inventory::router())
        .merge(staff::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
