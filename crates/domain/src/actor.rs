//! Actors and roles.

use common::UserId;
use serde::{Deserialize, Serialize};

/// Role of a user in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular employee placing orders.
    Employee,

    /// Delivery staff fulfilling assigned orders.
    Delivery,

    /// Administrator managing the order flow.
    Admin,
}

impl Role {
    /// Returns the role name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Delivery => "delivery",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved actor: who is performing an operation and in what role.
///
/// The lifecycle engine never authenticates; it only needs the
/// `{id, role}` pair the user directory resolved for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    /// Creates an actor from an ID and role.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Creates an employee actor.
    pub fn employee(id: UserId) -> Self {
        Self::new(id, Role::Employee)
    }

    /// Creates a delivery-staff actor.
    pub fn delivery(id: UserId) -> Self {
        Self::new(id, Role::Delivery)
    }

    /// Creates an admin actor.
    pub fn admin(id: UserId) -> Self {
        Self::new(id, Role::Admin)
    }
}
