//! HTTP API server for the MicroMart backend.
//!
//! Exposes auth, product, cart, and order endpoints over Axum, with
//! structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use catalog::{Catalog, InMemoryCatalog};
use domain::{CartService, CheckoutService, InMemoryCartStore, InMemoryOrderStore};
use identity::{IdentityService, InMemoryUserStore, Registration};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::AuthKeys;
use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<C: Catalog + Clone> {
    pub catalog: C,
    pub carts: Arc<CartService<C, InMemoryCartStore>>,
    pub checkout: CheckoutService<C, InMemoryCartStore, InMemoryOrderStore>,
    pub identity: IdentityService<InMemoryUserStore>,
    pub auth: AuthKeys,
}

/// Creates the application state around a catalog implementation.
pub fn create_state<C: Catalog + Clone>(catalog: C, jwt_secret: &str) -> Arc<AppState<C>> {
    let carts = Arc::new(CartService::new(catalog.clone(), InMemoryCartStore::new()));
    let checkout = CheckoutService::new(catalog.clone(), carts.clone(), InMemoryOrderStore::new());
    let identity = IdentityService::new(InMemoryUserStore::new());

    Arc::new(AppState {
        catalog,
        carts,
        checkout,
        identity,
        auth: AuthKeys::from_secret(jwt_secret),
    })
}

/// Creates the default in-memory application state.
pub fn create_default_state(jwt_secret: &str) -> Arc<AppState<InMemoryCatalog>> {
    create_state(InMemoryCatalog::new(), jwt_secret)
}

/// Creates the admin account named in the configuration, if any.
pub async fn bootstrap_admin<C: Catalog + Clone>(state: &AppState<C>, config: &Config) {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return;
    };

    let registration = Registration {
        username: username.clone(),
        email: config
            .admin_email
            .clone()
            .unwrap_or_else(|| format!("{username}@localhost")),
        password: password.clone(),
        password2: password.clone(),
        first_name: None,
        last_name: None,
    };

    match state.identity.register_admin(registration).await {
        Ok(user) => tracing::info!(username = %user.username, "created admin account"),
        Err(e) => tracing::warn!(error = %e, "failed to create admin account"),
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C: Catalog + Clone + 'static>(
    state: Arc<AppState<C>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/auth/register", post(routes::auth::register::<C>))
        .route("/auth/login", post(routes::auth::login::<C>))
        .route("/auth/profile", get(routes::auth::profile::<C>))
        .route(
            "/products",
            get(routes::products::list::<C>).post(routes::products::create::<C>),
        )
        .route(
            "/products/{id}",
            get(routes::products::get::<C>)
                .put(routes::products::update::<C>)
                .delete(routes::products::delete::<C>),
        )
        .route(
            "/cart",
            get(routes::cart::show::<C>)
                .post(routes::cart::add::<C>)
                .patch(routes::cart::adjust::<C>)
                .put(routes::cart::remove::<C>)
                .delete(routes::cart::clear::<C>),
        )
        .route(
            "/orders",
            get(routes::orders::list::<C>).post(routes::orders::place::<C>),
        )
        .route("/orders/{id}", get(routes::orders::get::<C>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
