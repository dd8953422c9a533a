//! Order aggregate implementation.

use catalog::ReservedLine;
use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::status::OrderStatus;

/// An item frozen into an order at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The ordered product.
    pub product_id: ProductId,

    /// Product name at purchase time.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Unit price at the moment of purchase. Never recomputed from the
    /// live catalog price.
    pub price_at_order: Money,
}

impl OrderLine {
    /// Returns the total price for this line (quantity * price_at_order).
    pub fn subtotal(&self) -> Money {
        self.price_at_order.multiply(self.quantity)
    }
}

impl From<ReservedLine> for OrderLine {
    fn from(line: ReservedLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            price_at_order: line.unit_price,
        }
    }
}

/// An immutable snapshot of a purchase.
///
/// Orders are created only by the placement workflow and never mutated
/// afterwards; the fields are private and exposed through accessors to
/// keep it that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    lines: Vec<OrderLine>,
    total_amount: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Materializes a new pending order from reserved stock lines.
    pub fn place(user_id: UserId, lines: Vec<OrderLine>) -> Self {
        let total_amount = lines.iter().map(OrderLine::subtotal).sum();
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            user_id,
            lines,
            total_amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the order identifier.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the purchasing user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the frozen order lines.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Returns the total amount frozen at creation.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the display status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserved(sku: &str, name: &str, quantity: u32, cents: i64) -> ReservedLine {
        ReservedLine {
            product_id: ProductId::new(sku),
            product_name: name.to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_place_freezes_total_and_status() {
        let lines: Vec<OrderLine> = vec![
            reserved("SKU-001", "Widget", 2, 1000).into(),
            reserved("SKU-002", "Gadget", 1, 500).into(),
        ];
        let order = Order::place(UserId::new(), lines);

        assert_eq!(order.total_amount().cents(), 2500);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.lines().len(), 2);
    }

    #[test]
    fn test_line_subtotal() {
        let line: OrderLine = reserved("SKU-001", "Widget", 3, 1000).into();
        assert_eq!(line.subtotal().cents(), 3000);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let order = Order::place(
            UserId::new(),
            vec![reserved("SKU-001", "Widget", 2, 1000).into()],
        );
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id(), order.id());
        assert_eq!(deserialized.total_amount(), order.total_amount());
    }
}
