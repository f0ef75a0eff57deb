//! Payment method and status types.
//!
//! The payment-gate predicate itself lives on [`crate::Order`]
//! (`payment_cleared`), next to the fields it reads. These types only
//! describe the evidence; mutating payment state belongs to the
//! external payment gate, never to the gate check.

use serde::{Deserialize, Serialize};

/// How the order is paid, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery; requires an uploaded proof reference before
    /// the order can be delivered.
    Cod,

    /// UPI online payment; requires a completed verification.
    Upi,

    /// Card online payment; requires a completed verification.
    Card,
}

impl PaymentMethod {
    /// Returns true for methods verified online before delivery.
    pub fn is_online(&self) -> bool {
        matches!(self, PaymentMethod::Upi | PaymentMethod::Card)
    }

    /// Returns the method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the external payment verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// No verification result recorded yet.
    #[default]
    Pending,

    /// Payment verified successfully.
    Completed,

    /// Payment verification failed.
    Failed,

    /// Payment was refunded after the fact.
    Refunded,
}

impl PaymentStatus {
    /// Returns the status name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_methods() {
        assert!(!PaymentMethod::Cod.is_online());
        assert!(PaymentMethod::Upi.is_online());
        assert!(PaymentMethod::Card.is_online());
    }

    #[test]
    fn default_payment_status_is_pending() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"cod\"");
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
