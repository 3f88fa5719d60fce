//! API handlers.

pub mod health;
pub mod mutations;
pub mod records;
