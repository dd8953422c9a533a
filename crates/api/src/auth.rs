//! JWT issuing and the bearer-token extractors.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use catalog::Catalog;
use chrono::{Duration, Utc};
use common::UserId;
use identity::User;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

const ACCESS_TTL_MINUTES: i64 = 30;
const REFRESH_TTL_DAYS: i64 = 1;

/// Claims carried inside every token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user this token belongs to.
    pub sub: Uuid,
    /// Login name at issue time.
    pub username: String,
    /// Whether the user may hit admin routes.
    pub is_admin: bool,
    /// `"access"` or `"refresh"`.
    pub token_type: String,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

/// An access/refresh token pair returned by register and login.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// HMAC keys used to sign and verify tokens.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    /// Creates keys from a shared secret.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues an access/refresh token pair for a user.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, ApiError> {
        let access = self.issue(user, "access", Duration::minutes(ACCESS_TTL_MINUTES))?;
        let refresh = self.issue(user, "refresh", Duration::days(REFRESH_TTL_DAYS))?;
        Ok(TokenPair { access, refresh })
    }

    fn issue(&self, user: &User, token_type: &str, ttl: Duration) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user.id.as_uuid(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            token_type: token_type.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Token signing failed: {e}")))
    }

    /// Verifies an access token and returns its claims.
    pub fn verify_access(&self, token: &str) -> Result<Claims, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| ApiError::Unauthorized("Token is invalid or expired".to_string()))?;

        if data.claims.token_type != "access" {
            return Err(ApiError::Unauthorized(
                "Token is invalid or expired".to_string(),
            ));
        }
        Ok(data.claims)
    }
}

/// The authenticated caller, extracted from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: String,
    pub is_admin: bool,
}

impl<C: Catalog + Clone> FromRequestParts<Arc<AppState<C>>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<C>>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided".to_string())
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Authentication credentials were not provided".to_string())
        })?;

        let claims = state.auth.verify_access(token)?;
        Ok(AuthUser {
            user_id: UserId::from_uuid(claims.sub),
            username: claims.username,
            is_admin: claims.is_admin,
        })
    }
}

/// An authenticated admin; rejects non-admin callers with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<C: Catalog + Clone> FromRequestParts<Arc<AppState<C>>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<C>>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool) -> User {
        User {
            id: UserId::new(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            is_admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let keys = AuthKeys::from_secret("test-secret");
        let user = user(true);

        let pair = keys.issue_pair(&user).unwrap();
        let claims = keys.verify_access(&pair.access).unwrap();

        assert_eq!(claims.sub, user.id.as_uuid());
        assert_eq!(claims.username, "alice");
        assert!(claims.is_admin);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let keys = AuthKeys::from_secret("test-secret");
        let pair = keys.issue_pair(&user(false)).unwrap();

        assert!(keys.verify_access(&pair.refresh).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let keys = AuthKeys::from_secret("test-secret");
        let other = AuthKeys::from_secret("other-secret");
        let pair = keys.issue_pair(&user(false)).unwrap();

        assert!(other.verify_access(&pair.access).is_err());
    }
}
