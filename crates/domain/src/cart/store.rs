//! Cart storage trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use tokio::sync::RwLock;

use super::CartError;
use super::aggregate::Cart;

/// Trait for durable cart storage.
///
/// Carts are created lazily on first access and persist indefinitely;
/// clearing removes the lines, never the cart.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads the user's cart, creating an empty one if absent.
    async fn get_or_create(&self, user_id: UserId) -> Result<Cart, CartError>;

    /// Persists the cart state.
    async fn save(&self, cart: Cart) -> Result<(), CartError>;
}

/// In-memory cart store, keyed by user.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of carts stored.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get_or_create(&self, user_id: UserId) -> Result<Cart, CartError> {
        let mut store = self.carts.write().await;
        Ok(store
            .entry(user_id)
            .or_insert_with(|| Cart::new(user_id))
            .clone())
    }

    async fn save(&self, cart: Cart) -> Result<(), CartError> {
        let mut store = self.carts.write().await;
        store.insert(cart.user_id(), cart);
        Ok(())
    }
}
