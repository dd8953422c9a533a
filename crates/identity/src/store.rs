//! User storage trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use tokio::sync::RwLock;

use crate::error::{IdentityError, Result};
use crate::user::User;

/// Trait for durable user storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user, enforcing username and email uniqueness.
    async fn insert(&self, user: User) -> Result<User>;

    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Finds a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// In-memory user store.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    /// Creates a new empty user store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of users stored.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<User> {
        let mut store = self.users.write().await;

        if store.values().any(|u| u.username == user.username) {
            return Err(IdentityError::UsernameTaken);
        }
        if store.values().any(|u| u.email == user.email) {
            return Err(IdentityError::EmailTaken);
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let store = self.users.read().await;
        Ok(store.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let store = self.users.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }
}
