//! Kitchen printing

pub mod tracker;

pub use tracker::KitchenTicketTracker;
