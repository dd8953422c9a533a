//! Derived cart views.
//!
//! Totals are never stored on the cart; they are recomputed from the
//! lines and the *current* catalog prices every time a view is built.

use chrono::{DateTime, Utc};
use common::{Money, ProductId, UserId};
use serde::Serialize;
use uuid::Uuid;

/// One cart line joined with its current product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    /// The product identifier.
    pub product: ProductId,
    /// Current product name.
    pub product_name: String,
    /// Current unit price.
    pub product_price: Money,
    /// Quantity in the cart.
    pub quantity: u32,
    /// `product_price * quantity`.
    pub subtotal: Money,
}

/// A cart with derived totals, ready for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    /// Cart identifier.
    pub id: Uuid,
    /// Owning user.
    pub user: UserId,
    /// Lines in insertion order.
    pub cart_items: Vec<CartItemView>,
    /// Sum of line quantities.
    pub total_items: u32,
    /// Sum of line subtotals at current prices.
    pub total_amount: Money,
    /// Cart creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl CartView {
    /// Builds a view from cart metadata and joined items.
    pub fn new(
        id: Uuid,
        user: UserId,
        cart_items: Vec<CartItemView>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let total_items = cart_items.iter().map(|i| i.quantity).sum();
        let total_amount = cart_items.iter().map(|i| i.subtotal).sum();
        Self {
            id,
            user,
            cart_items,
            total_items,
            total_amount,
            created_at,
            updated_at,
        }
    }
}
