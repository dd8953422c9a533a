//! Order storage trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, UserId};
use tokio::sync::RwLock;

use super::OrderError;
use super::aggregate::Order;

/// Trait for durable order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a newly placed order.
    async fn insert(&self, order: Order) -> Result<(), OrderError>;

    /// Loads an order by ID.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError>;

    /// Lists a user's orders, most recent first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError>;

    /// Lists all orders, most recent first.
    async fn list_all(&self) -> Result<Vec<Order>, OrderError>;
}

#[derive(Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderId, Order>,
    fail_on_insert: bool,
}

/// In-memory order store.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Configures the store to fail the next insert.
    ///
    /// Used by tests to exercise the placement rollback path.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        self.state.write().await.fail_on_insert = fail;
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), OrderError> {
        let mut state = self.state.write().await;

        if state.fail_on_insert {
            return Err(OrderError::Storage("simulated insert failure".to_string()));
        }

        state.orders.insert(order.id(), order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        let state = self.state.read().await;
        Ok(state.orders.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::aggregate::OrderLine;
    use common::{Money, ProductId};

    fn order_for(user_id: UserId) -> Order {
        Order::place(
            user_id,
            vec![OrderLine {
                product_id: ProductId::new("SKU-001"),
                product_name: "Widget".to_string(),
                quantity: 1,
                price_at_order: Money::from_cents(1000),
            }],
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryOrderStore::new();
        let order = order_for(UserId::new());
        let id = order.id();

        store.insert(order).await.unwrap();
        assert!(store.get(id).await.unwrap().is_some());
        assert!(store.get(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_for_user_filters_and_sorts() {
        let store = InMemoryOrderStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let first = order_for(alice);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = order_for(alice);

        store.insert(first.clone()).await.unwrap();
        store.insert(second.clone()).await.unwrap();
        store.insert(order_for(bob)).await.unwrap();

        let orders = store.list_for_user(alice).await.unwrap();
        assert_eq!(orders.len(), 2);
        // Most recent first.
        assert_eq!(orders[0].id(), second.id());
        assert_eq!(orders[1].id(), first.id());
    }

    #[tokio::test]
    async fn test_fail_on_insert() {
        let store = InMemoryOrderStore::new();
        store.set_fail_on_insert(true).await;

        let result = store.insert(order_for(UserId::new())).await;
        assert!(matches!(result, Err(OrderError::Storage(_))));
        assert_eq!(store.order_count().await, 0);
    }
}
