//! Utilities - error types, logging, input guards

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{AppError, AppResponse, AppResult};
pub use error::{ok, ok_with_message};
