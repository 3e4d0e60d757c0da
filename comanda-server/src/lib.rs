//! Comanda Server - restaurant front-of-house management
//!
//! # Architecture overview
//!
//! - **State engine** (`orders`): the single authority for the order/
//!   table lifecycle (assign, items, kitchen workflow, billing)
//! - **Kitchen tickets** (`printing`): append-only print log
//! - **Fan-out** (`services`): notification persistence + channel
//!   broadcasts on domain transitions
//! - **Message bus** (`message`): TCP/memory transports for real-time
//!   dashboard push
//! - **HTTP API** (`api`): role-scoped REST endpoints
//! - **Database** (`db`): embedded SurrealDB storage
//! - **Auth** (`auth`): JWT + Argon2, explicit actor passed into the
//!   engine
//!
//! # Module structure
//!
//! ```text
//! comanda-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT, role gates
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # models and repositories
//! ├── orders/        # state engine, money
//! ├── printing/      # kitchen ticket tracker
//! ├── services/      # fan-out
//! ├── message/       # message bus
//! └── utils/         # errors, logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod message;
pub mod orders;
pub mod printing;
pub mod services;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use message::{BusMessage, Channel, EventType, MessageBus};
pub use orders::OrderEngine;
pub use printing::KitchenTicketTracker;
pub use services::Fanout;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Prepare the process environment: dotenv + logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(level.as_deref(), log_dir.as_deref());

    Ok(())
}
