//! HTTP route handlers.

pub mod auth;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
