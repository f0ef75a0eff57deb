//! Shared types for the canteen ordering system.

mod types;

pub use types::{OrderId, UserId};
