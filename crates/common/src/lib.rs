//! Shared value objects for the MicroMart backend.
//!
//! This crate provides the identifier newtypes and the fixed-point money
//! type used across the catalog, cart, and order layers.

pub mod money;
pub mod types;

pub use money::{Money, MoneyParseError};
pub use types::{OrderId, ProductId, UserId};
