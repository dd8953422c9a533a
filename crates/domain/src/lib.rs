//! Domain layer for the MicroMart backend.
//!
//! This crate provides the two core components of the system:
//! - The cart aggregate: mutable pre-purchase state for one user, with
//!   accumulate-on-add semantics and derived totals
//! - The order placement workflow: an all-or-nothing checkout that
//!   validates the cart against live stock, decrements it atomically, and
//!   materializes an immutable order with frozen prices

pub mod cart;
pub mod error;
pub mod order;

pub use cart::{
    AdjustAction, AdjustOutcome, Cart, CartError, CartItemView, CartLine, CartService, CartStore,
    CartView, InMemoryCartStore,
};
pub use error::DomainError;
pub use order::{
    CheckoutService, InMemoryOrderStore, Order, OrderError, OrderLine, OrderStatus, OrderStore,
};
