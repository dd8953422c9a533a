//! Domain error types.

use catalog::CatalogError;
use thiserror::Error;

use crate::cart::CartError;
use crate::order::OrderError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the product catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An error occurred in the cart aggregate.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// An error occurred in the order workflow.
    #[error(transparent)]
    Order(#[from] OrderError),
}
