//! Delivery-performance aggregation.
//!
//! Derived, non-authoritative read path. Computed from order
//! timestamps on demand, never stored.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::status::OrderStatus;

/// Aggregated delivery figures for one staff member over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPerformance {
    /// The delivery agent the figures describe.
    pub staff: UserId,

    /// Inclusive window start.
    pub from: DateTime<Utc>,

    /// Exclusive window end.
    pub to: DateTime<Utc>,

    /// Orders assigned to the agent and created within the window.
    pub total_assigned: usize,

    /// Of those, how many reached `delivered`.
    pub delivered: usize,

    /// `delivered / total_assigned`, 0.0 when nothing was assigned.
    pub delivery_rate: f64,

    /// Mean of `delivered_at - created_at` in milliseconds, over the
    /// delivered orders carrying both timestamps. `None` when no order
    /// qualifies.
    pub average_delivery_ms: Option<i64>,
}

/// Computes delivery performance for `staff` over `[from, to)`.
///
/// Orders not assigned to the agent, or created outside the window,
/// are ignored. Delivered orders missing the `delivered_at` timestamp
/// count towards the rate but are skipped for the average.
pub fn staff_performance(
    orders: &[Order],
    staff: UserId,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> DeliveryPerformance {
    let mut total_assigned = 0usize;
    let mut delivered = 0usize;
    let mut duration_ms_sum = 0i64;
    let mut duration_samples = 0i64;

    for order in orders {
        if order.delivery_staff() != Some(staff) {
            continue;
        }
        let created = order.created_at();
        if created < from || created >= to {
            continue;
        }

        total_assigned += 1;

        if order.status() == OrderStatus::Delivered {
            delivered += 1;
            if let Some(delivered_at) = order.delivered_at() {
                duration_ms_sum += (delivered_at - created).num_milliseconds();
                duration_samples += 1;
            }
        }
    }

    let delivery_rate = if total_assigned == 0 {
        0.0
    } else {
        delivered as f64 / total_assigned as f64
    };

    DeliveryPerformance {
        staff,
        from,
        to,
        total_assigned,
        delivered,
        delivery_rate,
        average_delivery_ms: (duration_samples > 0).then(|| duration_ms_sum / duration_samples),
    }
}
