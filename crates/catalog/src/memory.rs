use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::ProductId;
use tokio::sync::RwLock;

use crate::{
    error::{CatalogError, Result},
    product::{Product, ProductUpdate},
    store::{Catalog, ReservedLine, StockRequest},
};

/// In-memory catalog implementation.
///
/// Stores all products behind a single `RwLock`, which makes the
/// validate-then-decrement section of [`Catalog::reserve_stock`] trivially
/// atomic: the write guard is held for the whole section, so no other
/// reservation can interleave.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryCatalog {
    /// Creates a new empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-populated with the given products.
    pub async fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = Self::new();
        {
            let mut store = catalog.products.write().await;
            for product in products {
                store.insert(product.id.clone(), product);
            }
        }
        catalog
    }

    /// Returns the number of products stored.
    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn get_product(&self, id: &ProductId) -> Result<Product> {
        let store = self.products.read().await;
        store
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::ProductNotFound(id.clone()))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let store = self.products.read().await;
        let mut products: Vec<_> = store.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn insert_product(&self, product: Product) -> Result<Product> {
        let mut store = self.products.write().await;

        if store.values().any(|p| p.name == product.name) {
            return Err(CatalogError::DuplicateName {
                name: product.name.clone(),
            });
        }

        store.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &ProductId, update: ProductUpdate) -> Result<Product> {
        let mut store = self.products.write().await;

        if let Some(ref new_name) = update.name
            && store.values().any(|p| &p.name == new_name && &p.id != id)
        {
            return Err(CatalogError::DuplicateName {
                name: new_name.clone(),
            });
        }

        let product = store
            .get_mut(id)
            .ok_or_else(|| CatalogError::ProductNotFound(id.clone()))?;
        update.apply_to(product);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<()> {
        let mut store = self.products.write().await;
        store
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CatalogError::ProductNotFound(id.clone()))
    }

    async fn reserve_stock(&self, requests: &[StockRequest]) -> Result<Vec<ReservedLine>> {
        let mut store = self.products.write().await;

        // Validate every line before touching any stock.
        for request in requests {
            let product = store
                .get(&request.product_id)
                .ok_or_else(|| CatalogError::ProductNotFound(request.product_id.clone()))?;

            if !product.has_stock_for(request.quantity) {
                return Err(CatalogError::InsufficientStock {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    available: product.stock,
                    requested: request.quantity,
                });
            }
        }

        // All lines pass; decrement under the same write guard.
        let mut lines = Vec::with_capacity(requests.len());
        for request in requests {
            let product = store
                .get_mut(&request.product_id)
                .ok_or_else(|| CatalogError::ProductNotFound(request.product_id.clone()))?;

            product.stock -= request.quantity;
            lines.push(ReservedLine {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: request.quantity,
                unit_price: product.price,
            });
        }

        Ok(lines)
    }

    async fn release_stock(&self, requests: &[StockRequest]) -> Result<()> {
        let mut store = self.products.write().await;
        for request in requests {
            if let Some(product) = store.get_mut(&request.product_id) {
                product.stock = product.stock.saturating_add(request.quantity);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;

    fn widget(stock: u32) -> Product {
        Product::new("SKU-001", "Widget", Money::from_cents(1000), stock)
    }

    fn gadget(stock: u32) -> Product {
        Product::new("SKU-002", "Gadget", Money::from_cents(500), stock)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_product(widget(5)).await.unwrap();

        let product = catalog.get_product(&ProductId::new("SKU-001")).await.unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.stock, 5);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let catalog = InMemoryCatalog::new();
        let result = catalog.get_product(&ProductId::new("SKU-404")).await;
        assert!(matches!(result, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_name() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_product(widget(5)).await.unwrap();

        let dup = Product::new("SKU-003", "Widget", Money::from_cents(900), 1);
        let result = catalog.insert_product(dup).await;
        assert!(matches!(result, Err(CatalogError::DuplicateName { .. })));
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let catalog = InMemoryCatalog::with_products([widget(5), gadget(3)]).await;

        let products = catalog.list_products().await.unwrap();
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Gadget", "Widget"]);
    }

    #[tokio::test]
    async fn test_update_product() {
        let catalog = InMemoryCatalog::with_products([widget(5)]).await;

        let updated = catalog
            .update_product(
                &ProductId::new("SKU-001"),
                ProductUpdate {
                    price: Some(Money::from_cents(1100)),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price.cents(), 1100);
        assert_eq!(updated.stock, 5);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let catalog = InMemoryCatalog::with_products([widget(5)]).await;

        catalog.delete_product(&ProductId::new("SKU-001")).await.unwrap();
        assert_eq!(catalog.product_count().await, 0);

        let result = catalog.delete_product(&ProductId::new("SKU-001")).await;
        assert!(matches!(result, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_reserve_decrements_and_snapshots() {
        let catalog = InMemoryCatalog::with_products([widget(5)]).await;

        let lines = catalog
            .reserve_stock(&[StockRequest::new("SKU-001", 3)])
            .await
            .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_name, "Widget");
        assert_eq!(lines[0].unit_price.cents(), 1000);

        let product = catalog.get_product(&ProductId::new("SKU-001")).await.unwrap();
        assert_eq!(product.stock, 2);
    }

    #[tokio::test]
    async fn test_reserve_is_all_or_nothing() {
        let catalog = InMemoryCatalog::with_products([widget(5), gadget(1)]).await;

        // Second line exceeds stock; the first must not be decremented.
        let result = catalog
            .reserve_stock(&[
                StockRequest::new("SKU-001", 2),
                StockRequest::new("SKU-002", 3),
            ])
            .await;

        match result {
            Err(CatalogError::InsufficientStock {
                product_name,
                available,
                requested,
                ..
            }) => {
                assert_eq!(product_name, "Gadget");
                assert_eq!(available, 1);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let widget = catalog.get_product(&ProductId::new("SKU-001")).await.unwrap();
        let gadget = catalog.get_product(&ProductId::new("SKU-002")).await.unwrap();
        assert_eq!(widget.stock, 5);
        assert_eq!(gadget.stock, 1);
    }

    #[tokio::test]
    async fn test_release_restores_stock() {
        let catalog = InMemoryCatalog::with_products([widget(5)]).await;

        let requests = [StockRequest::new("SKU-001", 4)];
        catalog.reserve_stock(&requests).await.unwrap();
        catalog.release_stock(&requests).await.unwrap();

        let product = catalog.get_product(&ProductId::new("SKU-001")).await.unwrap();
        assert_eq!(product.stock, 5);
    }

    #[tokio::test]
    async fn test_release_skips_deleted_products() {
        let catalog = InMemoryCatalog::with_products([widget(5)]).await;

        let requests = [StockRequest::new("SKU-001", 2)];
        catalog.reserve_stock(&requests).await.unwrap();
        catalog.delete_product(&ProductId::new("SKU-001")).await.unwrap();

        catalog.release_stock(&requests).await.unwrap();
        assert_eq!(catalog.product_count().await, 0);
    }
}
