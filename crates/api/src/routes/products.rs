//! Product catalog endpoints.
//!
//! Reads require a bearer token; writes require an admin.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::{Catalog, Product, ProductUpdate};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock: u32,
    pub image_url: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            description: product.description,
            price: product.price.to_decimal_string(),
            stock: product.stock,
            image_url: product.image_url,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    /// SKU; generated when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal string, e.g. `"10.00"`.
    pub price: String,
    pub stock: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn parse_price(input: &str) -> Result<Money, ApiError> {
    let price = Money::parse_decimal(input).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if price.cents() < 100 {
        return Err(ApiError::BadRequest(
            "Price must be at least 1.00".to_string(),
        ));
    }
    Ok(price)
}

/// GET /products — list the catalog, ordered by name.
#[tracing::instrument(skip(state, _user))]
pub async fn list<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    _user: AuthUser,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/:id — load one product.
#[tracing::instrument(skip(state, _user))]
pub async fn get<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get_product(&ProductId::new(id)).await?;
    Ok(Json(product.into()))
}

/// POST /products — create a product (admin only).
#[tracing::instrument(skip(state, _admin, req), fields(name = %req.name))]
pub async fn create<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    _admin: AdminUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let price = parse_price(&req.price)?;
    let id = req
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut product = Product::new(id, req.name, price, req.stock);
    if let Some(description) = req.description {
        product = product.with_description(description);
    }
    if let Some(url) = req.image_url {
        product = product.with_image_url(url);
    }

    let product = state.catalog.insert_product(product).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /products/:id — partially update a product (admin only).
#[tracing::instrument(skip(state, _admin, req))]
pub async fn update<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let price = req.price.as_deref().map(parse_price).transpose()?;

    let update = ProductUpdate {
        name: req.name,
        description: req.description,
        price,
        stock: req.stock,
        image_url: req.image_url,
    };

    let product = state
        .catalog
        .update_product(&ProductId::new(id), update)
        .await?;
    Ok(Json(product.into()))
}

/// DELETE /products/:id — remove a product (admin only).
#[tracing::instrument(skip(state, _admin))]
pub async fn delete<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_product(&ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
