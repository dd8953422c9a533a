//! API server entry point.

use api::config::Config;
use catalog::{Catalog, PostgresCatalog};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve<C: Catalog + Clone + 'static>(
    state: std::sync::Arc<api::AppState<C>>,
    config: &Config,
) {
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    api::bootstrap_admin(&state, config).await;

    if let Some(count) = config.seed_demo_products
        && let Err(e) = api::seed::seed_products(&state.catalog, count).await
    {
        tracing::warn!(error = %e, "demo product seeding failed");
    }

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url)
                .await
                .expect("failed to connect to database");
            let catalog = PostgresCatalog::new(pool);
            catalog
                .run_migrations()
                .await
                .expect("failed to run migrations");

            let state = api::create_state(catalog, &config.jwt_secret);
            serve(state, &config).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory catalog");
            let state = api::create_default_state(&config.jwt_secret);
            serve(state, &config).await;
        }
    }
}
