//! User model and registration input.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};

/// A registered user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,

    /// Unique login name.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Argon2 password hash; never the plaintext.
    pub password_hash: String,

    /// Optional given name.
    pub first_name: Option<String>,

    /// Optional family name.
    pub last_name: Option<String>,

    /// Whether the user may manage products and view all orders.
    pub is_admin: bool,

    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Confirmation copy of the password.
    pub password2: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Registration {
    /// Validates the registration fields.
    ///
    /// Uniqueness of username and email is checked by the store, not here.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(IdentityError::InvalidField { field: "username" });
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(IdentityError::InvalidField { field: "email" });
        }
        if self.password.is_empty() {
            return Err(IdentityError::InvalidField { field: "password" });
        }
        if self.password != self.password2 {
            return Err(IdentityError::PasswordMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
            password2: "hunter2".to_string(),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn test_password_mismatch() {
        let mut reg = registration();
        reg.password2 = "hunter3".to_string();
        assert!(matches!(
            reg.validate(),
            Err(IdentityError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_rejects_blank_username() {
        let mut reg = registration();
        reg.username = "  ".to_string();
        assert!(matches!(
            reg.validate(),
            Err(IdentityError::InvalidField { field: "username" })
        ));
    }

    #[test]
    fn test_rejects_malformed_email() {
        let mut reg = registration();
        reg.email = "not-an-email".to_string();
        assert!(matches!(
            reg.validate(),
            Err(IdentityError::InvalidField { field: "email" })
        ));
    }
}
