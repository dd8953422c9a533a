//! Product catalog storage for the MicroMart backend.
//!
//! This crate provides:
//! - The [`Product`] model
//! - The [`Catalog`] storage trait, including atomic multi-product stock
//!   reservation used by order placement
//! - An in-memory implementation for local development and tests
//! - A PostgreSQL implementation using row-level locks

pub mod error;
pub mod memory;
pub mod postgres;
pub mod product;
pub mod store;

pub use error::{CatalogError, Result};
pub use memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;
pub use product::{Product, ProductUpdate};
pub use store::{Catalog, ReservedLine, StockRequest};
