use common::OrderId;
use domain::OrderStatus;
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A concurrency conflict occurred on a conditional update.
    /// The expected status did not match the stored status.
    #[error("Concurrency conflict for order {order_id}: expected status {expected}, found {actual}")]
    Conflict {
        order_id: OrderId,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// The order was not found in the store.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// An order with this id already exists.
    #[error("Order already exists: {0}")]
    AlreadyExists(OrderId),

    /// A stored status value could not be parsed.
    #[error("Invalid status in store for order {order_id}: {status}")]
    InvalidStatus { order_id: OrderId, status: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
