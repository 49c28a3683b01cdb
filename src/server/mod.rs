//! Companion account API server
//!
//! Serves the account collection over HTTP from a DuckDB store:
//!
//! | Method   | Path                         | Success |
//! |----------|------------------------------|---------|
//! | `GET`    | `/v1/health`                 | 200     |
//! | `GET`    | `/v1/account`                | 200     |
//! | `POST`   | `/v1/account`                | 201     |
//! | `GET`    | `/v1/account/:id`            | 200     |
//! | `DELETE` | `/v1/account/:id?version=N`  | 204     |

mod routes;
mod store;

pub use routes::router;
pub use store::{AccountStore, DeleteOutcome, IN_MEMORY};

use crate::error::{Error, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Environment variable holding the listen port
pub const ENV_PORT: &str = "PORT";

/// Environment variable holding the DuckDB path
pub const ENV_DB_PATH: &str = "ACCOUNT_DB_PATH";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on, on all interfaces
    pub port: u16,
    /// DuckDB file, or [`IN_MEMORY`]
    pub database: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database: IN_MEMORY.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from `PORT` and `ACCOUNT_DB_PATH`, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_PORT) {
            config.port = raw.trim().parse().map_err(|_| Error::InvalidConfigValue {
                field: ENV_PORT.to_string(),
                message: format!("expected a port number, got '{raw}'"),
            })?;
        }
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            config.database = path;
        }
        Ok(config)
    }
}

/// Open the store and serve until the process stops
pub async fn serve(config: ServerConfig) -> Result<()> {
    let store = AccountStore::open(&config.database)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {}: {e}", config.port)))?;

    tracing::info!(
        "Starting account API on http://{} (store: {})",
        addr,
        store.location()
    );
    serve_with_listener(listener, store).await
}

/// Serve on an already bound listener
pub async fn serve_with_listener(listener: TcpListener, store: AccountStore) -> Result<()> {
    axum::serve(listener, router(store))
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;
    Ok(())
}
