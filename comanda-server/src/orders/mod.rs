//! Order domain - state engine and money helpers
//!
//! [`OrderEngine`] is the single authority for lifecycle transitions;
//! the role-scoped API handlers are thin wrappers around it.

pub mod engine;
pub mod money;

pub use engine::{AssignTableRequest, OrderEngine};

#[cfg(test)]
mod tests;
