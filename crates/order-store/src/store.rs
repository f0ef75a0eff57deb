use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::{Order, OrderStatus};

use crate::{Result, StoreError};

/// Core trait for order store implementations.
///
/// The store persists whole order documents. Writes that follow a read
/// go through [`OrderStore::update_expecting`], which only applies when
/// the stored status still matches the status the caller read; a lost
/// race surfaces as [`StoreError::Conflict`].
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a newly placed order.
    ///
    /// Fails with `AlreadyExists` if an order with this id is present.
    async fn insert(&self, order: &Order) -> Result<()>;

    /// Retrieves an order by id.
    async fn get(&self, order_id: OrderId) -> Result<Order>;

    /// Replaces a stored order, conditional on its current status.
    ///
    /// The write applies only if the stored order's status equals
    /// `expected`; otherwise the call fails with `Conflict` carrying
    /// the status actually found. This is the optimistic-concurrency
    /// primitive every read-modify-write in the lifecycle engine uses.
    async fn update_expecting(&self, order: &Order, expected: OrderStatus) -> Result<()>;

    /// Lists all orders, newest first.
    async fn list(&self) -> Result<Vec<Order>>;

    /// Lists the orders placed by a customer, newest first.
    async fn list_for_customer(&self, customer: UserId) -> Result<Vec<Order>>;

    /// Lists the orders assigned to a delivery agent, newest first.
    async fn list_for_staff(&self, staff: UserId) -> Result<Vec<Order>>;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Checks whether an order exists.
    async fn exists(&self, order_id: OrderId) -> Result<bool> {
        match self.get(order_id).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
