//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;
use domain::{CartError, DomainError, OrderError};
use identity::IdentityError;

/// API-level error type that maps to HTTP responses.
///
/// Every response body is `{"detail": "..."}` with a user-displayable
/// message.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or invalid credentials.
    Unauthorized(String),
    /// Authenticated but not allowed.
    Forbidden(String),
    /// Concurrent writers kept colliding after retries.
    Conflict(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "detail": detail });
        (status, axum::Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match &err {
            CatalogError::ProductNotFound(_) => ApiError::NotFound(err.to_string()),
            CatalogError::DuplicateName { .. } | CatalogError::InsufficientStock { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            CatalogError::StockConflict => ApiError::Conflict(err.to_string()),
            CatalogError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match &err {
            CartError::ItemNotFound { .. } => ApiError::NotFound(err.to_string()),
            CartError::InvalidQuantity { .. } => ApiError::BadRequest(err.to_string()),
            CartError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::EmptyCart => ApiError::BadRequest(err.to_string()),
            OrderError::OrderNotFound(_) => ApiError::NotFound(err.to_string()),
            OrderError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Catalog(e) => e.into(),
            DomainError::Cart(e) => e.into(),
            DomainError::Order(e) => e.into(),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match &err {
            IdentityError::UsernameTaken
            | IdentityError::EmailTaken
            | IdentityError::PasswordMismatch
            | IdentityError::InvalidField { .. } => ApiError::BadRequest(err.to_string()),
            IdentityError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            IdentityError::UserNotFound => ApiError::NotFound(err.to_string()),
            IdentityError::PasswordHash(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProductId;

    #[test]
    fn test_insufficient_stock_maps_to_bad_request() {
        let err: ApiError = CatalogError::InsufficientStock {
            product_id: ProductId::new("SKU-001"),
            product_name: "Widget".to_string(),
            available: 2,
            requested: 5,
        }
        .into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_stock_conflict_maps_to_conflict() {
        let err: ApiError = CatalogError::StockConflict.into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_empty_cart_maps_to_bad_request() {
        let err: ApiError = DomainError::Order(OrderError::EmptyCart).into();
        match err {
            ApiError::BadRequest(msg) => {
                assert_eq!(msg, "Your cart is empty. Add items before placing an order.");
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_credentials_maps_to_unauthorized() {
        let err: ApiError = IdentityError::InvalidCredentials.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
