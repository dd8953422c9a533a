//! Order placement workflow.

use std::sync::Arc;
use std::time::Instant;

use catalog::{Catalog, CatalogError, StockRequest};
use common::{OrderId, UserId};

use crate::cart::{CartService, CartStore};
use crate::error::DomainError;

use super::aggregate::{Order, OrderLine};
use super::store::OrderStore;
use super::OrderError;

/// How many times a stock reservation is retried after a transient
/// conflict before the failure is surfaced to the caller.
const MAX_RESERVE_ATTEMPTS: u32 = 3;

/// Service executing the all-or-nothing checkout.
///
/// Placement holds the same per-user lock as cart mutations, so a cart
/// cannot change under a checkout in flight. The stock validate+decrement
/// runs inside the catalog's atomic reservation; a failure after the
/// reservation releases the stock again, so no partially placed order is
/// ever observable.
pub struct CheckoutService<C: Catalog, CS: CartStore, OS: OrderStore> {
    catalog: C,
    carts: Arc<CartService<C, CS>>,
    orders: OS,
}

impl<C: Catalog, CS: CartStore, OS: OrderStore> CheckoutService<C, CS, OS> {
    /// Creates a new checkout service.
    pub fn new(catalog: C, carts: Arc<CartService<C, CS>>, orders: OS) -> Self {
        Self {
            catalog,
            carts,
            orders,
        }
    }

    /// Places an order from the user's current cart.
    ///
    /// Validates every line against current stock, decrements all stocks
    /// atomically, freezes prices into order lines, empties the cart, and
    /// returns the created order. Any failure leaves cart and stock
    /// untouched.
    #[tracing::instrument(skip(self))]
    pub async fn place_order(&self, user_id: UserId) -> Result<Order, DomainError> {
        let start = Instant::now();

        let lock = self.carts.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let mut cart = self.carts.load_cart(user_id).await?;
        if cart.is_empty() {
            metrics::counter!("orders_rejected_total").increment(1);
            return Err(OrderError::EmptyCart.into());
        }

        let requests: Vec<StockRequest> = cart
            .lines()
            .iter()
            .map(|line| StockRequest::new(line.product_id.clone(), line.quantity))
            .collect();

        // Hard stock check plus decrement, as one atomic unit. Transient
        // contention is retried a bounded number of times.
        let mut attempt = 1;
        let reserved = loop {
            match self.catalog.reserve_stock(&requests).await {
                Ok(lines) => break lines,
                Err(CatalogError::StockConflict) if attempt < MAX_RESERVE_ATTEMPTS => {
                    tracing::warn!(%user_id, attempt, "stock reservation conflict, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    metrics::counter!("orders_rejected_total").increment(1);
                    return Err(e.into());
                }
            }
        };

        let lines: Vec<OrderLine> = reserved.into_iter().map(OrderLine::from).collect();
        let order = Order::place(user_id, lines);

        if let Err(e) = self.orders.insert(order.clone()).await {
            // Compensate the decrement so the failed placement has no
            // effect on stock.
            if let Err(release_err) = self.catalog.release_stock(&requests).await {
                tracing::error!(
                    %user_id,
                    error = %release_err,
                    "failed to release stock after order insert failure"
                );
            }
            metrics::counter!("orders_rejected_total").increment(1);
            return Err(e.into());
        }

        cart.clear();
        self.carts.save_cart(cart).await?;

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());

        tracing::info!(
            %user_id,
            order_id = %order.id(),
            total = %order.total_amount(),
            "order placed"
        );
        Ok(order)
    }

    /// Loads an order by ID.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.get(id).await?)
    }

    /// Lists a user's orders, most recent first.
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// Lists every order in the system, most recent first.
    pub async fn list_all_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.list_all().await?)
    }
}
