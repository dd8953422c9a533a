//! Identity service wrapping registration and credential checks.

use chrono::Utc;
use common::UserId;

use crate::error::{IdentityError, Result};
use crate::password;
use crate::store::UserStore;
use crate::user::{Registration, User};

/// Service for registering users and verifying credentials.
pub struct IdentityService<S: UserStore> {
    store: S,
}

impl<S: UserStore> IdentityService<S> {
    /// Creates a new identity service with the given user store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new user with a hashed password.
    #[tracing::instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<User> {
        self.create(registration, false).await
    }

    /// Registers an administrator account.
    ///
    /// Only reachable from startup bootstrap and tests; there is no HTTP
    /// route that creates admins.
    pub async fn register_admin(&self, registration: Registration) -> Result<User> {
        self.create(registration, true).await
    }

    async fn create(&self, registration: Registration, is_admin: bool) -> Result<User> {
        registration.validate()?;

        let user = User {
            id: UserId::new(),
            username: registration.username,
            email: registration.email,
            password_hash: password::hash_password(&registration.password)?,
            first_name: registration.first_name,
            last_name: registration.last_name,
            is_admin,
            created_at: Utc::now(),
        };

        self.store.insert(user).await
    }

    /// Verifies a username/password pair and returns the user.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Loads a user by ID.
    pub async fn get_user(&self, id: UserId) -> Result<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(IdentityError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryUserStore;

    fn registration(username: &str, email: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
            password2: "hunter2".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let service = IdentityService::new(InMemoryUserStore::new());

        let user = service
            .register(registration("alice", "alice@example.com"))
            .await
            .unwrap();
        assert!(!user.is_admin);
        assert_ne!(user.password_hash, "hunter2");

        let authed = service.authenticate("alice", "hunter2").await.unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn test_authenticate_rejects_wrong_password() {
        let service = IdentityService::new(InMemoryUserStore::new());
        service
            .register(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = service.authenticate("alice", "wrong").await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let service = IdentityService::new(InMemoryUserStore::new());
        let result = service.authenticate("nobody", "hunter2").await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let service = IdentityService::new(InMemoryUserStore::new());
        service
            .register(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = service
            .register(registration("alice", "other@example.com"))
            .await;
        assert!(matches!(result, Err(IdentityError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let service = IdentityService::new(InMemoryUserStore::new());
        service
            .register(registration("alice", "alice@example.com"))
            .await
            .unwrap();

        let result = service
            .register(registration("bob", "alice@example.com"))
            .await;
        assert!(matches!(result, Err(IdentityError::EmailTaken)));
    }
}
