//! Domain layer for the canteen ordering system.
//!
//! This crate provides the order lifecycle model:
//! - `OrderStatus` state machine with a single central transition table
//! - `Order` entity with snapshotted prices and an append-only status history
//! - Payment method/status types and the payment-gate predicate
//! - Actor/role types used for transition authorization
//! - Delivery-performance aggregation (pure read-side computation)

mod actor;
mod error;
mod history;
mod item;
mod order;
mod payment;
mod stats;
mod status;

pub use actor::{Actor, Role};
pub use error::OrderError;
pub use history::StatusEntry;
pub use item::{DishId, Money, OrderItem};
pub use order::Order;
pub use payment::{PaymentMethod, PaymentStatus};
pub use stats::{DeliveryPerformance, staff_performance};
pub use status::OrderStatus;
