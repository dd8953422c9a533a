//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8000`)
/// - `JWT_SECRET` — HMAC key for signing tokens (default: a development
///   key; set this in any real deployment)
/// - `DATABASE_URL` — PostgreSQL connection string; when unset the server
///   runs on the in-memory catalog
/// - `ADMIN_USERNAME` / `ADMIN_PASSWORD` / `ADMIN_EMAIL` — when the first
///   two are set, an admin account is created at startup
/// - `SEED_DEMO_PRODUCTS` — when set, that many demo products are seeded
///   into the catalog at startup (non-numeric values mean 50)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_email: Option<String>,
    pub seed_demo_products: Option<u32>,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "insecure-dev-secret".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
            admin_username: std::env::var("ADMIN_USERNAME").ok(),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
            admin_email: std::env::var("ADMIN_EMAIL").ok(),
            seed_demo_products: std::env::var("SEED_DEMO_PRODUCTS")
                .ok()
                .map(|v| v.parse().unwrap_or(50)),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            jwt_secret: "insecure-dev-secret".to_string(),
            database_url: None,
            admin_username: None,
            admin_password: None,
            admin_email: None,
            seed_demo_products: None,
            log_level: "info".to_string(),
        }
    }
}
