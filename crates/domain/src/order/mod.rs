//! Order aggregate and the placement workflow.

mod aggregate;
mod checkout;
mod status;
mod store;

pub use aggregate::{Order, OrderLine};
pub use checkout::CheckoutService;
pub use status::OrderStatus;
pub use store::{InMemoryOrderStore, OrderStore};

use common::OrderId;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order placement was attempted on an empty cart.
    #[error("Your cart is empty. Add items before placing an order.")]
    EmptyCart,

    /// The order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Order storage failed.
    #[error("Order storage error: {0}")]
    Storage(String),
}
