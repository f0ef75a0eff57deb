//! User directory trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;
use domain::Role;

/// A user known to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl UserProfile {
    /// Creates a new user profile.
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}

/// Trait for resolving user ids to roles.
///
/// The production directory is an external collaborator; the engine
/// only needs lookup.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolves a user id, returning `None` for unknown users.
    async fn find(&self, user_id: UserId) -> Option<UserProfile>;
}

/// In-memory user directory for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryUserDirectory {
    /// Creates a new empty in-memory directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub fn upsert(&self, profile: UserProfile) {
        if let Ok(mut users) = self.users.write() {
            users.insert(profile.id, profile);
        }
    }

    /// Returns the number of registered users.
    pub fn user_count(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find(&self, user_id: UserId) -> Option<UserProfile> {
        self.users.read().ok()?.get(&user_id).cloned()
    }
}
