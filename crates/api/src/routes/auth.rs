//! Registration, login, and profile endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use catalog::Catalog;
use identity::{Registration, User};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{AuthUser, TokenPair};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: ProfileResponse,
    pub access: String,
    pub refresh: String,
}

/// POST /auth/register — create an account and its (empty) cart.
#[tracing::instrument(skip(state, registration), fields(username = %registration.username))]
pub async fn register<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    Json(registration): Json<Registration>,
) -> Result<(axum::http::StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state.identity.register(registration).await?;

    // Every account gets a cart up front.
    state.carts.get_cart(user.id).await?;

    let tokens = state.auth.issue_pair(&user)?;
    let response = RegisterResponse {
        user: user.into(),
        access: tokens.access,
        refresh: tokens.refresh,
    };

    Ok((axum::http::StatusCode::CREATED, Json(response)))
}

/// POST /auth/login — verify credentials and return a token pair.
#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn login<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let user = state
        .identity
        .authenticate(&req.username, &req.password)
        .await?;
    Ok(Json(state.auth.issue_pair(&user)?))
}

/// GET /auth/profile — return the authenticated user's profile.
#[tracing::instrument(skip(state, user), fields(username = %user.username))]
pub async fn profile<C: Catalog + Clone + 'static>(
    State(state): State<Arc<AppState<C>>>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state.identity.get_user(user.user_id).await?;
    Ok(Json(user.into()))
}
