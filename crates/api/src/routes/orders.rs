//! Order placement and retrieval endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::Catalog;
use common::OrderId;
use domain::Order;
use serde::Serialize;

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product: String,
    pub product_name: String,
    pub quantity: u32,
    /// Unit price frozen at placement time, never the live price.
    pub price_at_order: String,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user: String,
    pub user_username: String,
    pub total_amount: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub order_items: Vec<OrderItemResponse>,
}

async fn order_response<C: Catalog + Clone>(
    state: &AppState<C>,
    order: &Order,
) -> OrderResponse {
    // The username is decoration on the response; an order whose owner
    // cannot be resolved still renders, with the lookup failure logged.
    let user_username = match state.identity.get_user(order.user_id()).await {
        Ok(user) => user.username,
        Err(e) => {
            tracing::warn!(
                order_id = %order.id(),
                user_id = %order.user_id(),
                error = %e,
                "could not resolve order owner"
            );
            String::new()
        }
    };

    OrderResponse {
        id: order.id().to_string(),
        user: order.user_id().to_string(),
        user_username,
        total_amount: order.total_amount().to_decimal_string(),
        status: order.status().to_string(),
        created_at: order.created_at().to_rfc3339(),
        updated_at: order.updated_at().to_rfc3339(),
        order_items: order
            .lines()
            .iter()
            .map(|line| OrderItemResponse {
                product: line.product_id.to_string(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                price_at_order: line.price_at_order.to_decimal_string(),
            })
            .collect(),
    }
}

/// POST /orders — place an order from the caller's cart.
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn place<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    user: AuthUser,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.checkout.place_order(user.user_id).await?;
    let response = order_response(&state, &order).await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /orders — list the caller's orders, newest first. Admins see every
/// order in the system.
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    user: AuthUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = if user.is_admin {
        state.checkout.list_all_orders().await?
    } else {
        state.checkout.list_orders(user.user_id).await?
    };

    let mut responses = Vec::with_capacity(orders.len());
    for order in &orders {
        responses.push(order_response(&state, order).await);
    }
    Ok(Json(responses))
}

/// GET /orders/:id — load one order. Owners and admins only; anyone else
/// gets the same 404 as a missing order.
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;

    let order = state
        .checkout
        .get_order(OrderId::from_uuid(uuid))
        .await?
        .filter(|o| user.is_admin || o.user_id() == user.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    let response = order_response(&state, &order).await;
    Ok(Json(response))
}
