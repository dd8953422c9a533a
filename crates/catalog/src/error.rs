use common::ProductId;
use thiserror::Error;

/// Errors that can occur when interacting with the product catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A product with the same name already exists.
    #[error("A product named '{name}' already exists")]
    DuplicateName { name: String },

    /// The requested quantity exceeds the available stock.
    #[error(
        "Not enough stock for {product_name}. Available: {available}, Requested: {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: u32,
        requested: u32,
    },

    /// A concurrent writer touched the same stock rows; the operation can
    /// be retried.
    #[error("Stock update conflict, retry the operation")]
    StockConflict,

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
