//! Account API client
//!
//! Provides:
//! - [`AccountClient`]: list, fetch, create and delete accounts
//! - [`AccountPageLoader`]: the page loader behind [`AccountClient::list`]
//! - [`AccountClientConfig`]: collection URL, proxy and timeout

mod accounts;
mod config;

pub use accounts::{AccountClient, AccountPageLoader};
pub use config::{AccountClientConfig, DEFAULT_TIMEOUT, ENV_PROXY, ENV_TIMEOUT_MS, ENV_URL};
