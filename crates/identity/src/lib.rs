//! User accounts for the MicroMart backend.
//!
//! Provides the [`User`] model, registration validation, Argon2 password
//! hashing, and the [`UserStore`] trait with an in-memory implementation.

pub mod error;
pub mod password;
pub mod service;
pub mod store;
pub mod user;

pub use error::{IdentityError, Result};
pub use service::IdentityService;
pub use store::{InMemoryUserStore, UserStore};
pub use user::{Registration, User};
