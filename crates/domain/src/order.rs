//! The Order entity.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::actor::Role;
use crate::error::OrderError;
use crate::history::StatusEntry;
use crate::item::{Money, OrderItem};
use crate::payment::{PaymentMethod, PaymentStatus};
use crate::status::OrderStatus;

/// An order placed by an employee.
///
/// The status field is mutable only through the lifecycle engine; the
/// mutators below assume the engine has already validated the
/// transition against the table in [`OrderStatus::allowed_next`] and
/// the role rules. Item prices are snapshotted at placement and never
/// recomputed from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer: UserId,
    items: Vec<OrderItem>,
    subtotal: Money,
    final_amount: Money,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    payment_proof: Option<String>,
    status: OrderStatus,
    delivery_staff: Option<UserId>,
    status_history: Vec<StatusEntry>,
    created_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
}

// Construction
impl Order {
    /// Places a new order for a customer.
    ///
    /// Validates that the order has at least one item, every quantity
    /// is at least 1, every unit price is positive and the totals fit
    /// in the amount range, computes the totals from the snapshotted
    /// prices, and seeds the status history with the placement entry
    /// (history length is never 0).
    pub fn place(
        customer: UserId,
        items: Vec<OrderItem>,
        payment_method: PaymentMethod,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let mut subtotal = Money::zero();
        for item in &items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    quantity: item.quantity,
                });
            }
            if !item.unit_price.is_positive() {
                return Err(OrderError::InvalidPrice {
                    cents: item.unit_price.cents(),
                });
            }
            let line = item.line_total().ok_or(OrderError::AmountOverflow)?;
            subtotal = subtotal
                .checked_add(line)
                .ok_or(OrderError::AmountOverflow)?;
        }

        Ok(Self {
            id: OrderId::new(),
            customer,
            items,
            subtotal,
            final_amount: subtotal,
            payment_method,
            payment_status: PaymentStatus::Pending,
            payment_proof: None,
            status: OrderStatus::Pending,
            delivery_staff: None,
            status_history: vec![StatusEntry::new(
                OrderStatus::Pending,
                Role::Employee,
                Some("order placed".to_string()),
            )],
            created_at: Utc::now(),
            delivered_at: None,
        })
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer(&self) -> UserId {
        self.customer
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// The amount owed or collected for this order.
    pub fn final_amount(&self) -> Money {
        self.final_amount
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn payment_proof(&self) -> Option<&str> {
        self.payment_proof.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn delivery_staff(&self) -> Option<UserId> {
        self.delivery_staff
    }

    /// The append-only audit trail; length is at least 1.
    pub fn status_history(&self) -> &[StatusEntry] {
        &self.status_history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The payment gate: true if the evidence on file allows the order
    /// to reach `delivered`.
    ///
    /// Side-effect-free; for online methods this is a completed
    /// verification, for cash on delivery a non-empty proof reference.
    pub fn payment_cleared(&self) -> bool {
        if self.payment_method.is_online() {
            self.payment_status == PaymentStatus::Completed
        } else {
            self.payment_proof.as_deref().is_some_and(|p| !p.is_empty())
        }
    }
}

// Mutators driven by the lifecycle engine
impl Order {
    /// Moves the order to `target` and appends exactly one history entry.
    ///
    /// Entering `delivered` stamps `delivered_at`; the timestamp is set
    /// exactly once, by this transition.
    pub fn apply_status(&mut self, target: OrderStatus, actor_role: Role, notes: Option<String>) {
        debug_assert!(self.status.can_transition_to(target));

        self.status = target;
        self.status_history
            .push(StatusEntry::new(target, actor_role, notes));

        if target == OrderStatus::Delivered && self.delivered_at.is_none() {
            self.delivered_at = Some(Utc::now());
        }
    }

    /// Binds a delivery agent and confirms the order in one step.
    ///
    /// Used for the first assignment from `pending`: binding and
    /// confirmation are a single operation so no order is ever visible
    /// as assigned-but-pending or confirmed-but-unassigned.
    pub fn confirm_with_staff(&mut self, staff: UserId, actor_role: Role, notes: Option<String>) {
        debug_assert_eq!(self.status, OrderStatus::Pending);

        self.delivery_staff = Some(staff);
        self.apply_status(OrderStatus::Confirmed, actor_role, notes);
    }

    /// Swaps the delivery agent without changing status.
    ///
    /// Appends one history entry at the current status so the audit
    /// trail records the swap without implying a transition.
    pub fn reassign_staff(&mut self, staff: UserId, actor_role: Role, notes: Option<String>) {
        debug_assert!(self.status.is_assignable());

        self.delivery_staff = Some(staff);
        self.status_history
            .push(StatusEntry::new(self.status, actor_role, notes));
    }

    /// Records a payment-proof artifact reference (cash on delivery).
    pub fn attach_payment_proof(&mut self, reference: String) -> Result<(), OrderError> {
        if reference.trim().is_empty() {
            return Err(OrderError::EmptyProofReference);
        }
        self.payment_proof = Some(reference);
        Ok(())
    }

    /// Records the external verification outcome (online methods).
    pub fn record_payment_status(&mut self, status: PaymentStatus) {
        self.payment_status = status;
    }
}
