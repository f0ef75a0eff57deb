//! The lifecycle engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::{
    Actor, DeliveryPerformance, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Role,
    staff_performance,
};
use order_store::OrderStore;

use crate::directory::UserDirectory;
use crate::error::{EngineError, Result};
use crate::notify::{NotificationDispatcher, OrderEventKind, OrderNotification};

/// Coordinates every order state change.
///
/// Each mutating operation is one read-modify-write: load the order,
/// validate the rules, mutate a copy, persist it conditionally on the
/// status that was read. Losing the race surfaces as
/// [`EngineError::Conflict`]; the caller reloads and retries if it
/// still wants the change.
pub struct LifecycleEngine<S: OrderStore> {
    store: S,
    directory: Arc<dyn UserDirectory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl<S: OrderStore> LifecycleEngine<S> {
    /// Creates a new lifecycle engine.
    pub fn new(
        store: S,
        directory: Arc<dyn UserDirectory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            directory,
            dispatcher,
        }
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places a new order for the acting employee.
    #[tracing::instrument(skip(self, items), fields(customer = %actor.id))]
    pub async fn place_order(
        &self,
        actor: Actor,
        items: Vec<OrderItem>,
        payment_method: PaymentMethod,
    ) -> Result<Order> {
        if actor.role != Role::Employee {
            return Err(EngineError::Unauthorized(
                "only employees place orders".to_string(),
            ));
        }

        let order = Order::place(actor.id, items, payment_method)?;
        self.store.insert(&order).await?;

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id = %order.id(), amount = %order.final_amount(), "order placed");
        Ok(order)
    }

    /// Retrieves an order by id.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        Ok(self.store.get(order_id).await?)
    }

    /// Lists all orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(self.store.list().await?)
    }

    /// Lists the orders placed by a customer, newest first.
    pub async fn list_orders_for_customer(&self, customer: UserId) -> Result<Vec<Order>> {
        Ok(self.store.list_for_customer(customer).await?)
    }

    /// Moves an order to `target` on behalf of `actor`.
    ///
    /// Validates the transition against the central table, the actor's
    /// role against the authorization rules, and the payment gate when
    /// entering `delivered`. On success the order is persisted
    /// conditionally on its pre-transition status and one notification
    /// is fired.
    #[tracing::instrument(skip(self, notes), fields(order_id = %order_id, target = %target))]
    pub async fn apply_transition(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        actor: Actor,
        notes: Option<String>,
    ) -> Result<Order> {
        let order = self.store.get(order_id).await?;
        let current = order.status();

        if !current.can_transition_to(target) {
            return Err(EngineError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        // Confirmation is reachable only through assignment.
        if current == OrderStatus::Pending && target == OrderStatus::Confirmed {
            return Err(EngineError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        self.authorize_transition(&order, actor)?;

        if target == OrderStatus::Delivered && !order.payment_cleared() {
            return Err(EngineError::PaymentNotCleared(order_id));
        }

        let mut updated = order.clone();
        updated.apply_status(target, actor.role, notes);
        self.store.update_expecting(&updated, current).await?;

        metrics::counter!("order_transitions_total", "target" => target.as_str()).increment(1);
        tracing::info!(from = %current, "order transitioned");

        if let Some(kind) = OrderEventKind::for_transition(target) {
            self.notify(kind, &updated);
        }
        Ok(updated)
    }

    /// Assigns a delivery agent to an order.
    ///
    /// From `pending` this binds the agent and confirms the order as
    /// one atomic operation; from `confirmed` or `delivering` it swaps
    /// the agent without touching the status. Admin only.
    #[tracing::instrument(skip(self, notes), fields(order_id = %order_id, staff = %staff_id))]
    pub async fn assign(
        &self,
        order_id: OrderId,
        staff_id: UserId,
        actor: Actor,
        notes: Option<String>,
    ) -> Result<Order> {
        if actor.role != Role::Admin {
            return Err(EngineError::Unauthorized(
                "only admins assign delivery staff".to_string(),
            ));
        }
        self.resolve_delivery_staff(staff_id).await?;

        let order = self.store.get(order_id).await?;
        let current = order.status();
        if !current.is_assignable() {
            return Err(EngineError::NotAssignable {
                order_id,
                status: current,
            });
        }

        let mut updated = order.clone();
        let kind = if current == OrderStatus::Pending {
            updated.confirm_with_staff(staff_id, actor.role, notes);
            OrderEventKind::Confirmed
        } else {
            updated.reassign_staff(staff_id, actor.role, notes);
            OrderEventKind::Assigned
        };
        self.store.update_expecting(&updated, current).await?;

        metrics::counter!("order_assignments_total").increment(1);
        tracing::info!(status = %updated.status(), "delivery staff assigned");

        self.notify(kind, &updated);
        Ok(updated)
    }

    /// Attaches a payment-proof artifact reference (cash on delivery).
    ///
    /// Terminal orders no longer accept proof; a delivered order's
    /// evidence is already settled and a cancelled one never collects.
    #[tracing::instrument(skip(self, reference), fields(order_id = %order_id))]
    pub async fn attach_payment_proof(
        &self,
        order_id: OrderId,
        reference: String,
    ) -> Result<Order> {
        let order = self.store.get(order_id).await?;
        let current = order.status();
        if current.is_terminal() {
            return Err(EngineError::Closed {
                order_id,
                status: current,
            });
        }

        let mut updated = order.clone();
        updated.attach_payment_proof(reference)?;
        self.store.update_expecting(&updated, current).await?;
        Ok(updated)
    }

    /// Records the outcome of the external payment verification.
    ///
    /// Cancelled orders reject verification writes; delivered orders
    /// still accept them so a refund can land after the fact.
    #[tracing::instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn record_payment_status(
        &self,
        order_id: OrderId,
        status: PaymentStatus,
    ) -> Result<Order> {
        let order = self.store.get(order_id).await?;
        let current = order.status();
        if current == OrderStatus::Cancelled {
            return Err(EngineError::Closed {
                order_id,
                status: current,
            });
        }

        let mut updated = order.clone();
        updated.record_payment_status(status);
        self.store.update_expecting(&updated, current).await?;
        Ok(updated)
    }

    /// Computes delivery performance for a staff member over `[from, to)`.
    pub async fn staff_performance(
        &self,
        staff_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<DeliveryPerformance> {
        self.resolve_delivery_staff(staff_id).await?;
        let orders = self.store.list_for_staff(staff_id).await?;
        Ok(staff_performance(&orders, staff_id, from, to))
    }

    fn authorize_transition(&self, order: &Order, actor: Actor) -> Result<()> {
        let permitted = match order.status() {
            OrderStatus::Pending | OrderStatus::Confirmed => actor.role == Role::Admin,
            OrderStatus::Delivering => {
                actor.role == Role::Admin
                    || (actor.role == Role::Delivery
                        && order.delivery_staff() == Some(actor.id))
            }
            OrderStatus::Delivered | OrderStatus::Cancelled => false,
        };

        if permitted {
            Ok(())
        } else {
            Err(EngineError::Unauthorized(format!(
                "role {} may not transition an order in status {}",
                actor.role,
                order.status()
            )))
        }
    }

    async fn resolve_delivery_staff(&self, staff_id: UserId) -> Result<()> {
        match self.directory.find(staff_id).await {
            Some(profile) if profile.role == Role::Delivery => Ok(()),
            _ => Err(EngineError::StaffNotFound(staff_id)),
        }
    }

    /// Fires one notification without waiting for delivery. Failures
    /// are counted and logged, never surfaced.
    fn notify(&self, kind: OrderEventKind, order: &Order) {
        let notification = OrderNotification {
            kind,
            order_id: order.id(),
            customer: order.customer(),
            delivery_staff: order.delivery_staff(),
            status: order.status(),
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            let order_id = notification.order_id;
            if let Err(e) = dispatcher.dispatch(notification).await {
                metrics::counter!("notification_dispatch_failures_total").increment(1);
                tracing::warn!(%order_id, event = %kind, error = %e, "notification dispatch failed");
            }
        });
    }
}
