//! Cart aggregate and related types.

mod aggregate;
mod service;
mod store;
mod view;

pub use aggregate::{AdjustOutcome, Cart, CartLine};
pub use service::CartService;
pub use store::{CartStore, InMemoryCartStore};
pub use view::{CartItemView, CartView};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction of a quantity adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustAction {
    /// Add `change_by` to the line quantity.
    Increment,
    /// Subtract `change_by`; reaching zero removes the line.
    Decrement,
}

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product is not a line in the cart.
    #[error("Product {product_id} is not in the cart")]
    ItemNotFound { product_id: String },

    /// Quantity must be at least 1.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Cart storage failed.
    #[error("Cart storage error: {0}")]
    Storage(String),
}
