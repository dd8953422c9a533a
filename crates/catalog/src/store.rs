//! Catalog storage trait.

use async_trait::async_trait;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::product::{Product, ProductUpdate};

/// A request to take a quantity of one product out of stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRequest {
    /// The product to decrement.
    pub product_id: ProductId,
    /// Quantity to take.
    pub quantity: u32,
}

impl StockRequest {
    /// Creates a new stock request.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A product snapshot captured inside the reservation boundary.
///
/// The name and unit price are read in the same atomic section that
/// decrements the stock, so they are safe to freeze into an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedLine {
    /// The reserved product.
    pub product_id: ProductId,
    /// Product name at reservation time.
    pub product_name: String,
    /// Quantity taken out of stock.
    pub quantity: u32,
    /// Unit price at reservation time.
    pub unit_price: Money,
}

impl ReservedLine {
    /// Returns the total price for this line (quantity * unit_price).
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Trait for product catalog storage.
///
/// Product stock is the only resource shared across users, so the two
/// stock methods carry the strongest contract in the system: they must
/// validate and mutate every requested row as one atomic unit. Two
/// concurrent reservations for the last unit of a product must serialize,
/// with exactly one succeeding.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Loads a product by ID.
    async fn get_product(&self, id: &ProductId) -> Result<Product>;

    /// Lists all products, ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Inserts a new product.
    ///
    /// Fails with [`crate::CatalogError::DuplicateName`] if a product with
    /// the same name already exists.
    async fn insert_product(&self, product: Product) -> Result<Product>;

    /// Applies a partial update to a product and returns the new state.
    async fn update_product(&self, id: &ProductId, update: ProductUpdate) -> Result<Product>;

    /// Deletes a product.
    async fn delete_product(&self, id: &ProductId) -> Result<()>;

    /// Atomically validates and decrements stock for every request.
    ///
    /// Either all requests are applied and a snapshot of each product is
    /// returned, or no stock changes at all. Fails with
    /// [`crate::CatalogError::InsufficientStock`] naming the first product
    /// whose stock cannot cover the requested quantity.
    async fn reserve_stock(&self, requests: &[StockRequest]) -> Result<Vec<ReservedLine>>;

    /// Returns previously reserved quantities to stock.
    ///
    /// Used to compensate a reservation when a later step of order
    /// placement fails. Products deleted in the meantime are skipped.
    async fn release_stock(&self, requests: &[StockRequest]) -> Result<()>;
}
