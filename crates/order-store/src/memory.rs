use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::{Order, OrderStatus};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::OrderStore,
};

/// In-memory order store implementation for testing and local runs.
///
/// This implementation keeps all orders in memory and provides the
/// same interface and conflict semantics as the PostgreSQL
/// implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(StoreError::AlreadyExists(order.id()));
        }
        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Order> {
        let orders = self.orders.read().await;
        orders
            .get(&order_id)
            .cloned()
            .ok_or(StoreError::NotFound(order_id))
    }

    async fn update_expecting(&self, order: &Order, expected: OrderStatus) -> Result<()> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(&order.id())
            .ok_or(StoreError::NotFound(order.id()))?;

        if stored.status() != expected {
            return Err(StoreError::Conflict {
                order_id: order.id(),
                expected,
                actual: stored.status(),
            });
        }

        *stored = order.clone();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<_> = orders.values().cloned().collect();
        newest_first(&mut all);
        Ok(all)
    }

    async fn list_for_customer(&self, customer: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<_> = orders
            .values()
            .filter(|o| o.customer() == customer)
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(matching)
    }

    async fn list_for_staff(&self, staff: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<_> = orders
            .values()
            .filter(|o| o.delivery_staff() == Some(staff))
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, OrderItem, PaymentMethod, Role};

    fn place_test_order() -> Order {
        let items = vec![OrderItem::new("DISH-001", "Veg Thali", 1, Money::from_cents(1000))];
        Order::place(UserId::new(), items, PaymentMethod::Cod).unwrap()
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = InMemoryOrderStore::new();
        let order = place_test_order();

        store.insert(&order).await.unwrap();

        let fetched = store.get(order.id()).await.unwrap();
        assert_eq!(fetched.id(), order.id());
        assert_eq!(fetched.status(), OrderStatus::Pending);
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn insert_duplicate_rejected() {
        let store = InMemoryOrderStore::new();
        let order = place_test_order();

        store.insert(&order).await.unwrap();
        let result = store.insert(&order).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn get_missing_order() {
        let store = InMemoryOrderStore::new();
        let result = store.get(OrderId::new()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn conditional_update_succeeds_on_matching_status() {
        let store = InMemoryOrderStore::new();
        let mut order = place_test_order();
        store.insert(&order).await.unwrap();

        order.confirm_with_staff(UserId::new(), Role::Admin, None);
        store
            .update_expecting(&order, OrderStatus::Pending)
            .await
            .unwrap();

        let fetched = store.get(order.id()).await.unwrap();
        assert_eq!(fetched.status(), OrderStatus::Confirmed);
        assert_eq!(fetched.status_history().len(), 2);
    }

    #[tokio::test]
    async fn conditional_update_conflicts_on_stale_status() {
        let store = InMemoryOrderStore::new();
        let order = place_test_order();
        store.insert(&order).await.unwrap();

        // Another writer confirms first
        let mut winner = order.clone();
        winner.confirm_with_staff(UserId::new(), Role::Admin, None);
        store
            .update_expecting(&winner, OrderStatus::Pending)
            .await
            .unwrap();

        // The stale writer still expects pending
        let mut loser = order.clone();
        loser.confirm_with_staff(UserId::new(), Role::Admin, None);
        let result = store.update_expecting(&loser, OrderStatus::Pending).await;

        match result {
            Err(StoreError::Conflict {
                expected, actual, ..
            }) => {
                assert_eq!(expected, OrderStatus::Pending);
                assert_eq!(actual, OrderStatus::Confirmed);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_missing_order() {
        let store = InMemoryOrderStore::new();
        let order = place_test_order();
        let result = store.update_expecting(&order, OrderStatus::Pending).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_for_customer_filters() {
        let store = InMemoryOrderStore::new();
        let order_a = place_test_order();
        let order_b = place_test_order();
        store.insert(&order_a).await.unwrap();
        store.insert(&order_b).await.unwrap();

        let mine = store.list_for_customer(order_a.customer()).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id(), order_a.id());

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn list_for_staff_filters() {
        let store = InMemoryOrderStore::new();
        let staff = UserId::new();

        let mut assigned = place_test_order();
        store.insert(&assigned).await.unwrap();
        assigned.confirm_with_staff(staff, Role::Admin, None);
        store
            .update_expecting(&assigned, OrderStatus::Pending)
            .await
            .unwrap();

        let unassigned = place_test_order();
        store.insert(&unassigned).await.unwrap();

        let theirs = store.list_for_staff(staff).await.unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].id(), assigned.id());
    }
}
