//! Append-only status history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor::Role;
use crate::status::OrderStatus;

/// One entry in an order's audit trail.
///
/// Entries are appended on every successful transition or assignment
/// and never mutated or removed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// The order status after this entry was recorded.
    pub status: OrderStatus,

    /// Role of the actor that triggered the change.
    pub actor_role: Role,

    /// When the change was recorded.
    pub timestamp: DateTime<Utc>,

    /// Optional free-form note (e.g. assignment details, cancel reason).
    pub notes: Option<String>,
}

impl StatusEntry {
    /// Creates a new history entry timestamped now.
    pub fn new(status: OrderStatus, actor_role: Role, notes: Option<String>) -> Self {
        Self {
            status,
            actor_role,
            timestamp: Utc::now(),
            notes,
        }
    }
}
