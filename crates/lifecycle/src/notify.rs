//! Notification dispatch trait and in-memory implementation.
//!
//! The engine fires one notification per successful state change and
//! never waits for or retries delivery. The dispatcher owns the push
//! channel; failures are logged by the engine and dropped.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::OrderStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of order event being announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEventKind {
    #[serde(rename = "order_confirmed")]
    Confirmed,
    #[serde(rename = "order_assigned")]
    Assigned,
    #[serde(rename = "order_delivering")]
    Delivering,
    #[serde(rename = "order_delivered")]
    Delivered,
    #[serde(rename = "order_cancelled")]
    Cancelled,
}

impl OrderEventKind {
    /// Returns the event name as it appears on the push channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEventKind::Confirmed => "order_confirmed",
            OrderEventKind::Assigned => "order_assigned",
            OrderEventKind::Delivering => "order_delivering",
            OrderEventKind::Delivered => "order_delivered",
            OrderEventKind::Cancelled => "order_cancelled",
        }
    }

    /// Maps a transition target to the event it announces.
    pub fn for_transition(target: OrderStatus) -> Option<Self> {
        match target {
            OrderStatus::Confirmed => Some(OrderEventKind::Confirmed),
            OrderStatus::Delivering => Some(OrderEventKind::Delivering),
            OrderStatus::Delivered => Some(OrderEventKind::Delivered),
            OrderStatus::Cancelled => Some(OrderEventKind::Cancelled),
            OrderStatus::Pending => None,
        }
    }
}

impl std::fmt::Display for OrderEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One notification about an order state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNotification {
    pub kind: OrderEventKind,
    pub order_id: OrderId,
    pub customer: UserId,
    pub delivery_staff: Option<UserId>,
    pub status: OrderStatus,
}

/// Error returned when a notification could not be delivered.
#[derive(Debug, Clone, Error)]
#[error("Notification dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Trait for pushing order notifications to interested parties.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Dispatches one notification. Best effort; the caller never retries.
    async fn dispatch(&self, notification: OrderNotification) -> Result<(), DispatchError>;
}

#[derive(Debug, Default)]
struct InMemoryDispatcherState {
    sent: Vec<OrderNotification>,
    fail_on_dispatch: bool,
}

/// In-memory dispatcher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDispatcher {
    state: Arc<RwLock<InMemoryDispatcherState>>,
}

impl InMemoryDispatcher {
    /// Creates a new in-memory dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the dispatcher to fail on subsequent dispatch calls.
    pub fn set_fail_on_dispatch(&self, fail: bool) {
        if let Ok(mut state) = self.state.write() {
            state.fail_on_dispatch = fail;
        }
    }

    /// Returns the number of notifications delivered.
    pub fn sent_count(&self) -> usize {
        self.state.read().map(|s| s.sent.len()).unwrap_or(0)
    }

    /// Returns a copy of all delivered notifications.
    pub fn sent(&self) -> Vec<OrderNotification> {
        self.state.read().map(|s| s.sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryDispatcher {
    async fn dispatch(&self, notification: OrderNotification) -> Result<(), DispatchError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| DispatchError("dispatcher state poisoned".to_string()))?;

        if state.fail_on_dispatch {
            return Err(DispatchError("push channel unavailable".to_string()));
        }

        state.sent.push(notification);
        Ok(())
    }
}
