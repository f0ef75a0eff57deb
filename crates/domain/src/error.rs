//! Domain error types.

use thiserror::Error;

/// Errors raised by order construction and field-level validation.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order has no items.
    #[error("order has no items")]
    EmptyOrder,

    /// Invalid item quantity.
    #[error("invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid item price.
    #[error("invalid unit price: {cents} cents (must be greater than 0)")]
    InvalidPrice { cents: i64 },

    /// Order totals exceed the representable amount.
    #[error("order amount overflows the representable range")]
    AmountOverflow,

    /// Payment proof reference is empty.
    #[error("payment proof reference must not be empty")]
    EmptyProofReference,

    /// Unknown status name on the wire.
    #[error("unknown order status: {status}")]
    UnknownStatus { status: String },
}
