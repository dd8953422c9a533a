//! Cart endpoints.
//!
//! All five verbs operate on the calling user's single cart; there is no
//! cart ID in the URL.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use catalog::Catalog;
use common::ProductId;
use domain::{AdjustAction, CartItemView, CartView};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct CartItemResponse {
    pub product: String,
    pub product_name: String,
    pub product_price: String,
    pub quantity: u32,
    pub subtotal: String,
}

impl From<CartItemView> for CartItemResponse {
    fn from(item: CartItemView) -> Self {
        Self {
            product: item.product.to_string(),
            product_name: item.product_name,
            product_price: item.product_price.to_decimal_string(),
            quantity: item.quantity,
            subtotal: item.subtotal.to_decimal_string(),
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub id: String,
    pub user: String,
    pub cart_items: Vec<CartItemResponse>,
    pub total_items: u32,
    pub total_amount: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        Self {
            id: view.id.to_string(),
            user: view.user.to_string(),
            cart_items: view.cart_items.into_iter().map(Into::into).collect(),
            total_items: view.total_items,
            total_amount: view.total_amount.to_decimal_string(),
            created_at: view.created_at.to_rfc3339(),
            updated_at: view.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct CartMessageResponse {
    pub message: String,
    pub cart: CartResponse,
}

#[derive(Serialize)]
pub struct CartClearedResponse {
    pub detail: String,
    pub cart: CartResponse,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct AdjustItemRequest {
    pub product_id: String,
    pub action: AdjustAction,
    pub change_by: u32,
}

#[derive(Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: String,
}

/// GET /cart — return the caller's cart with derived totals.
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn show<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    user: AuthUser,
) -> Result<Json<CartResponse>, ApiError> {
    let view = state.carts.get_cart(user.user_id).await?;
    Ok(Json(view.into()))
}

/// POST /cart — add a quantity of a product, accumulating with any
/// existing line.
#[tracing::instrument(skip(state, user, req), fields(user_id = %user.user_id))]
pub async fn add<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    user: AuthUser,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let view = state
        .carts
        .add_item(user.user_id, ProductId::new(req.product_id), req.quantity)
        .await?;
    Ok(Json(view.into()))
}

/// PATCH /cart — increment or decrement an existing line.
#[tracing::instrument(skip(state, user, req), fields(user_id = %user.user_id))]
pub async fn adjust<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    user: AuthUser,
    Json(req): Json<AdjustItemRequest>,
) -> Result<Json<CartMessageResponse>, ApiError> {
    let (message, view) = state
        .carts
        .adjust_quantity(
            user.user_id,
            ProductId::new(req.product_id),
            req.action,
            req.change_by,
        )
        .await?;
    Ok(Json(CartMessageResponse {
        message,
        cart: view.into(),
    }))
}

/// PUT /cart — remove one product from the cart.
#[tracing::instrument(skip(state, user, req), fields(user_id = %user.user_id))]
pub async fn remove<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    user: AuthUser,
    Json(req): Json<RemoveItemRequest>,
) -> Result<Json<CartMessageResponse>, ApiError> {
    let (message, view) = state
        .carts
        .remove_item(user.user_id, ProductId::new(req.product_id))
        .await?;
    Ok(Json(CartMessageResponse {
        message,
        cart: view.into(),
    }))
}

/// DELETE /cart — remove every line.
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn clear<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    user: AuthUser,
) -> Result<Json<CartClearedResponse>, ApiError> {
    let view = state.carts.clear(user.user_id).await?;
    Ok(Json(CartClearedResponse {
        detail: "Cart cleared.".to_string(),
        cart: view.into(),
    }))
}
