use thiserror::Error;

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// A user with that username already exists.
    #[error("A user with that username already exists")]
    UsernameTaken,

    /// A user with that email already exists.
    #[error("A user with that email already exists")]
    EmailTaken,

    /// The two password fields did not match.
    #[error("Password fields didn't match")]
    PasswordMismatch,

    /// A required registration field was missing or malformed.
    #[error("Invalid registration field: {field}")]
    InvalidField { field: &'static str },

    /// The username/password pair did not match a known user.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Password hashing or verification failed.
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

/// Result type for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;
