//! Product model.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A product available in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier (SKU).
    pub id: ProductId,

    /// Unique display name.
    pub name: String,

    /// Optional free-form description.
    pub description: Option<String>,

    /// Unit price.
    pub price: Money,

    /// Available-to-sell count.
    pub stock: u32,

    /// Optional image URL.
    pub image_url: Option<String>,
}

impl Product {
    /// Creates a new product with the given fields.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        stock: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            stock,
            image_url: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the image URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Returns true if the requested quantity can be satisfied from stock.
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }
}

/// A partial update to a product; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<u32>,
    pub image_url: Option<String>,
}

impl ProductUpdate {
    /// Applies the update to a product in place.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(ref name) = self.name {
            product.name = name.clone();
        }
        if let Some(ref description) = self.description {
            product.description = Some(description.clone());
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(ref url) = self.image_url {
            product.image_url = Some(url.clone());
        }
    }
}
