//! Cart service providing the catalog-aware cart operations.

use std::collections::HashMap;
use std::sync::Arc;

use catalog::{Catalog, CatalogError};
use common::{ProductId, UserId};
use tokio::sync::Mutex;

use crate::error::DomainError;

use super::aggregate::{AdjustOutcome, Cart};
use super::store::CartStore;
use super::view::{CartItemView, CartView};
use super::{AdjustAction, CartError};

/// Service for managing a user's cart.
///
/// Mutations on the same user's cart are serialized through a per-user
/// lock; carts of different users never contend. Stock checks here are
/// soft: stock may drift between a mutation and checkout, which is why
/// order placement validates again inside its own atomic boundary.
pub struct CartService<C: Catalog, S: CartStore> {
    catalog: C,
    store: S,
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl<C: Catalog, S: CartStore> CartService<C, S> {
    /// Creates a new cart service.
    pub fn new(catalog: C, store: S) -> Self {
        Self {
            catalog,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock guarding this user's cart.
    pub(crate) async fn user_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Loads the raw cart aggregate, creating it lazily.
    pub(crate) async fn load_cart(&self, user_id: UserId) -> Result<Cart, DomainError> {
        Ok(self.store.get_or_create(user_id).await?)
    }

    /// Persists a cart aggregate.
    pub(crate) async fn save_cart(&self, cart: Cart) -> Result<(), DomainError> {
        Ok(self.store.save(cart).await?)
    }

    /// Joins the cart lines with current catalog data.
    ///
    /// Lines whose product no longer exists in the catalog are pruned in
    /// place, mirroring the cascade delete of the relational model.
    async fn project(&self, cart: &mut Cart) -> Result<CartView, DomainError> {
        let mut items = Vec::with_capacity(cart.lines().len());
        let mut stale: Vec<ProductId> = Vec::new();

        for line in cart.lines() {
            match self.catalog.get_product(&line.product_id).await {
                Ok(product) => items.push(CartItemView {
                    product: product.id,
                    product_name: product.name,
                    product_price: product.price,
                    quantity: line.quantity,
                    subtotal: product.price.multiply(line.quantity),
                }),
                Err(CatalogError::ProductNotFound(_)) => stale.push(line.product_id.clone()),
                Err(e) => return Err(e.into()),
            }
        }

        for product_id in &stale {
            cart.remove(product_id);
        }

        Ok(CartView::new(
            cart.id(),
            cart.user_id(),
            items,
            cart.created_at(),
            cart.updated_at(),
        ))
    }

    /// Returns the user's cart, creating an empty one if absent.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartView, DomainError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let mut cart = self.load_cart(user_id).await?;
        let view = self.project(&mut cart).await?;
        self.save_cart(cart).await?;
        Ok(view)
    }

    /// Adds a quantity of a product to the cart.
    ///
    /// If the product is already a line, the quantities accumulate. The
    /// resulting quantity must not exceed current stock.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, DomainError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity }.into());
        }

        let product = self.catalog.get_product(&product_id).await?;

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let mut cart = self.load_cart(user_id).await?;
        let in_cart = cart.line(&product_id).map(|l| l.quantity).unwrap_or(0);
        // Saturating: a sum past u32::MAX can never pass the stock check.
        let resulting = in_cart.saturating_add(quantity);

        if !product.has_stock_for(resulting) {
            return Err(CatalogError::InsufficientStock {
                product_id: product.id,
                product_name: product.name,
                available: product.stock,
                requested: resulting,
            }
            .into());
        }

        cart.add(product_id, quantity);
        let view = self.project(&mut cart).await?;
        self.save_cart(cart).await?;
        Ok(view)
    }

    /// Increments or decrements an existing line by `change_by`.
    ///
    /// Decrementing to zero or below removes the line. Returns a
    /// human-readable message describing the outcome plus the updated
    /// cart.
    #[tracing::instrument(skip(self))]
    pub async fn adjust_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        action: AdjustAction,
        change_by: u32,
    ) -> Result<(String, CartView), DomainError> {
        if change_by == 0 {
            return Err(CartError::InvalidQuantity {
                quantity: change_by,
            }
            .into());
        }

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let mut cart = self.load_cart(user_id).await?;
        let current = cart
            .line(&product_id)
            .map(|l| l.quantity)
            .ok_or_else(|| CartError::ItemNotFound {
                product_id: product_id.to_string(),
            })?;

        let product = self.catalog.get_product(&product_id).await?;

        let message = match action {
            AdjustAction::Increment => {
                let resulting = current.saturating_add(change_by);
                if !product.has_stock_for(resulting) {
                    return Err(CatalogError::InsufficientStock {
                        product_id: product.id,
                        product_name: product.name,
                        available: product.stock,
                        requested: resulting,
                    }
                    .into());
                }
                cart.increment(&product_id, change_by);
                format!("Quantity of {} incremented to {resulting}.", product.name)
            }
            AdjustAction::Decrement => match cart.decrement(&product_id, change_by) {
                Some(AdjustOutcome::Updated(quantity)) => {
                    format!("Quantity of {} decremented to {quantity}.", product.name)
                }
                Some(AdjustOutcome::Removed) | None => {
                    format!("Product {} removed from cart.", product.name)
                }
            },
        };

        let view = self.project(&mut cart).await?;
        self.save_cart(cart).await?;
        Ok((message, view))
    }

    /// Removes a product from the cart entirely.
    ///
    /// Removing a product that is not in the cart is an error, not a
    /// no-op.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(String, CartView), DomainError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let mut cart = self.load_cart(user_id).await?;
        if !cart.remove(&product_id) {
            return Err(CartError::ItemNotFound {
                product_id: product_id.to_string(),
            }
            .into());
        }

        // Display name for the message; fall back to the SKU if the
        // product vanished from the catalog.
        let name = match self.catalog.get_product(&product_id).await {
            Ok(product) => product.name,
            Err(_) => product_id.to_string(),
        };

        let view = self.project(&mut cart).await?;
        self.save_cart(cart).await?;
        Ok((format!("Product {name} removed from cart."), view))
    }

    /// Removes every line from the cart. Always succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<CartView, DomainError> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let mut cart = self.load_cart(user_id).await?;
        cart.clear();
        let view = self.project(&mut cart).await?;
        self.save_cart(cart).await?;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::store::InMemoryCartStore;
    use catalog::{InMemoryCatalog, Product};
    use common::Money;

    async fn service_with(
        products: Vec<Product>,
    ) -> CartService<InMemoryCatalog, InMemoryCartStore> {
        let catalog = InMemoryCatalog::with_products(products).await;
        CartService::new(catalog, InMemoryCartStore::new())
    }

    fn widget(stock: u32) -> Product {
        Product::new("SKU-001", "Widget", Money::from_cents(1000), stock)
    }

    #[tokio::test]
    async fn test_get_cart_creates_empty_cart() {
        let service = service_with(vec![]).await;
        let view = service.get_cart(UserId::new()).await.unwrap();
        assert!(view.cart_items.is_empty());
        assert_eq!(view.total_items, 0);
        assert!(view.total_amount.is_zero());
    }

    #[tokio::test]
    async fn test_add_item_computes_totals() {
        let service = service_with(vec![widget(5)]).await;
        let user = UserId::new();

        let view = service
            .add_item(user, ProductId::new("SKU-001"), 3)
            .await
            .unwrap();

        assert_eq!(view.total_items, 3);
        assert_eq!(view.total_amount.to_decimal_string(), "30.00");
        assert_eq!(view.cart_items[0].subtotal.to_decimal_string(), "30.00");
    }

    #[tokio::test]
    async fn test_add_item_accumulates() {
        let service = service_with(vec![widget(5)]).await;
        let user = UserId::new();

        service
            .add_item(user, ProductId::new("SKU-001"), 2)
            .await
            .unwrap();
        let view = service
            .add_item(user, ProductId::new("SKU-001"), 3)
            .await
            .unwrap();

        assert_eq!(view.cart_items.len(), 1);
        assert_eq!(view.cart_items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_add_item_unknown_product() {
        let service = service_with(vec![]).await;
        let result = service
            .add_item(UserId::new(), ProductId::new("SKU-404"), 1)
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Catalog(CatalogError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_add_item_zero_quantity() {
        let service = service_with(vec![widget(5)]).await;
        let result = service
            .add_item(UserId::new(), ProductId::new("SKU-001"), 0)
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Cart(CartError::InvalidQuantity { .. }))
        ));
    }

    #[tokio::test]
    async fn test_add_item_merged_quantity_respects_stock() {
        let service = service_with(vec![widget(5)]).await;
        let user = UserId::new();

        service
            .add_item(user, ProductId::new("SKU-001"), 3)
            .await
            .unwrap();

        // 3 already in cart + 3 more exceeds the 5 in stock.
        let result = service.add_item(user, ProductId::new("SKU-001"), 3).await;
        assert!(matches!(
            result,
            Err(DomainError::Catalog(CatalogError::InsufficientStock { .. }))
        ));
    }

    #[tokio::test]
    async fn test_add_item_huge_quantity_rejected() {
        let service = service_with(vec![widget(5)]).await;
        let user = UserId::new();
        let sku = ProductId::new("SKU-001");

        service.add_item(user, sku.clone(), 1).await.unwrap();

        // A merged quantity past u32::MAX must fail the stock check, not
        // wrap around to a small number.
        let result = service.add_item(user, sku, u32::MAX).await;
        assert!(matches!(
            result,
            Err(DomainError::Catalog(CatalogError::InsufficientStock { .. }))
        ));

        let view = service.get_cart(user).await.unwrap();
        assert_eq!(view.total_items, 1);
    }

    #[tokio::test]
    async fn test_adjust_increment_huge_change_rejected() {
        let service = service_with(vec![widget(5)]).await;
        let user = UserId::new();
        let sku = ProductId::new("SKU-001");

        service.add_item(user, sku.clone(), 1).await.unwrap();

        let result = service
            .adjust_quantity(user, sku.clone(), AdjustAction::Increment, u32::MAX)
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Catalog(CatalogError::InsufficientStock { .. }))
        ));

        let view = service.get_cart(user).await.unwrap();
        assert_eq!(view.cart_items[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_adjust_increment_bounded_by_stock() {
        let service = service_with(vec![widget(5)]).await;
        let user = UserId::new();
        let sku = ProductId::new("SKU-001");

        service.add_item(user, sku.clone(), 3).await.unwrap();

        // 3 + 4 = 7 > 5 in stock.
        let result = service
            .adjust_quantity(user, sku.clone(), AdjustAction::Increment, 4)
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Catalog(CatalogError::InsufficientStock { .. }))
        ));

        // 3 + 2 = 5 is exactly the stock.
        let (message, view) = service
            .adjust_quantity(user, sku, AdjustAction::Increment, 2)
            .await
            .unwrap();
        assert_eq!(message, "Quantity of Widget incremented to 5.");
        assert_eq!(view.total_amount.to_decimal_string(), "50.00");
    }

    #[tokio::test]
    async fn test_adjust_decrement_to_zero_removes() {
        let service = service_with(vec![widget(5)]).await;
        let user = UserId::new();
        let sku = ProductId::new("SKU-001");

        service.add_item(user, sku.clone(), 2).await.unwrap();

        let (message, view) = service
            .adjust_quantity(user, sku, AdjustAction::Decrement, 2)
            .await
            .unwrap();
        assert_eq!(message, "Product Widget removed from cart.");
        assert!(view.cart_items.is_empty());
    }

    #[tokio::test]
    async fn test_adjust_missing_item() {
        let service = service_with(vec![widget(5)]).await;
        let result = service
            .adjust_quantity(
                UserId::new(),
                ProductId::new("SKU-001"),
                AdjustAction::Increment,
                1,
            )
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Cart(CartError::ItemNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_remove_item_twice_is_an_error() {
        let service = service_with(vec![widget(5)]).await;
        let user = UserId::new();
        let sku = ProductId::new("SKU-001");

        service.add_item(user, sku.clone(), 1).await.unwrap();

        let (message, _) = service.remove_item(user, sku.clone()).await.unwrap();
        assert_eq!(message, "Product Widget removed from cart.");

        let result = service.remove_item(user, sku).await;
        assert!(matches!(
            result,
            Err(DomainError::Cart(CartError::ItemNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let service = service_with(vec![widget(5)]).await;
        let user = UserId::new();

        service
            .add_item(user, ProductId::new("SKU-001"), 2)
            .await
            .unwrap();

        let view = service.clear(user).await.unwrap();
        assert!(view.cart_items.is_empty());

        // Clearing an already-empty cart still succeeds.
        let view = service.clear(user).await.unwrap();
        assert_eq!(view.total_items, 0);
    }

    #[tokio::test]
    async fn test_deleted_product_pruned_from_view() {
        let catalog = InMemoryCatalog::with_products(vec![widget(5)]).await;
        let service = CartService::new(catalog.clone(), InMemoryCartStore::new());
        let user = UserId::new();

        service
            .add_item(user, ProductId::new("SKU-001"), 2)
            .await
            .unwrap();
        catalog
            .delete_product(&ProductId::new("SKU-001"))
            .await
            .unwrap();

        let view = service.get_cart(user).await.unwrap();
        assert!(view.cart_items.is_empty());
        assert_eq!(view.total_items, 0);
    }

    #[tokio::test]
    async fn test_totals_follow_price_changes() {
        use catalog::ProductUpdate;

        let catalog = InMemoryCatalog::with_products(vec![widget(5)]).await;
        let service = CartService::new(catalog.clone(), InMemoryCartStore::new());
        let user = UserId::new();

        service
            .add_item(user, ProductId::new("SKU-001"), 2)
            .await
            .unwrap();

        catalog
            .update_product(
                &ProductId::new("SKU-001"),
                ProductUpdate {
                    price: Some(Money::from_cents(1500)),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();

        // Cart totals always use the current catalog price.
        let view = service.get_cart(user).await.unwrap();
        assert_eq!(view.total_amount.to_decimal_string(), "30.00");
    }
}
