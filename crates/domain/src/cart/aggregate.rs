//! Cart aggregate implementation.

use chrono::{DateTime, Utc};
use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One (product, quantity) pairing within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product this line refers to.
    pub product_id: ProductId,

    /// Quantity in the cart; always at least 1.
    pub quantity: u32,

    /// When the product was first added.
    pub added_at: DateTime<Utc>,
}

/// Result of adjusting a line quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustOutcome {
    /// The line now holds this quantity.
    Updated(u32),
    /// The adjustment reached zero and the line was removed.
    Removed,
}

/// The mutable pre-purchase state for one user.
///
/// Lines are kept in insertion order and a product appears at most once:
/// repeated adds merge by incrementing the existing quantity. Totals are
/// always derived from the lines and current catalog prices, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    id: Uuid,
    user_id: UserId,
    lines: Vec<CartLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the cart identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line for a product, if present.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the total quantity across all lines.
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Returns the creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last mutation time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Adds a quantity of a product, merging with an existing line.
    ///
    /// Returns the resulting line quantity. This is "add to cart"
    /// semantics: repeated adds accumulate, they never overwrite. Sums
    /// saturate at `u32::MAX`; a line can never wrap to zero.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) -> u32 {
        self.touch();
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
            line.quantity
        } else {
            self.lines.push(CartLine {
                product_id,
                quantity,
                added_at: Utc::now(),
            });
            quantity
        }
    }

    /// Increments an existing line by `change_by`.
    ///
    /// Returns None if the product is not in the cart.
    pub fn increment(&mut self, product_id: &ProductId, change_by: u32) -> Option<u32> {
        let line = self.lines.iter_mut().find(|l| &l.product_id == product_id)?;
        line.quantity = line.quantity.saturating_add(change_by);
        let quantity = line.quantity;
        self.touch();
        Some(quantity)
    }

    /// Decrements an existing line by `change_by`.
    ///
    /// A result of zero or less removes the line entirely; the cart never
    /// holds a zero-quantity line. Returns None if the product is not in
    /// the cart.
    pub fn decrement(&mut self, product_id: &ProductId, change_by: u32) -> Option<AdjustOutcome> {
        let index = self.lines.iter().position(|l| &l.product_id == product_id)?;
        self.touch();

        let line = &mut self.lines[index];
        if line.quantity <= change_by {
            self.lines.remove(index);
            Some(AdjustOutcome::Removed)
        } else {
            line.quantity -= change_by;
            Some(AdjustOutcome::Updated(line.quantity))
        }
    }

    /// Removes a line entirely. Returns false if the product was absent.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        let removed = self.lines.len() < before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Removes all lines. The cart itself survives.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
