//! Lifecycle engine error types.

use common::{OrderId, UserId};
use domain::{OrderError, OrderStatus};
use order_store::StoreError;
use thiserror::Error;

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested target status is not reachable from the current one.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The order cannot take or swap a delivery agent in its current status.
    #[error("Order {order_id} is not assignable in status {status}")]
    NotAssignable {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// The order is terminal and no longer accepts payment evidence.
    #[error("Order {order_id} is closed in status {status}")]
    Closed {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// The actor is not permitted to perform this operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The payment evidence on file does not allow delivery.
    #[error("Payment not cleared for order {0}")]
    PaymentNotCleared(OrderId),

    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The named user does not resolve to a delivery agent.
    #[error("Delivery staff not found: {0}")]
    StaffNotFound(UserId),

    /// The order changed underneath this operation; reload and retry.
    #[error(
        "Concurrency conflict for order {order_id}: expected status {expected}, found {actual}"
    )]
    Conflict {
        order_id: OrderId,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// Domain validation error.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Store error other than not-found or conflict.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(order_id) => EngineError::NotFound(order_id),
            StoreError::Conflict {
                order_id,
                expected,
                actual,
            } => EngineError::Conflict {
                order_id,
                expected,
                actual,
            },
            other => EngineError::Store(other),
        }
    }
}

/// Convenience type alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
