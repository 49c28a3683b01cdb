//! Account client configuration

use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use std::time::Duration;
use url::Url;

/// Environment variable holding the account API URL
pub const ENV_URL: &str = "ACCOUNT_API_URL";

/// Environment variable holding an optional proxy URL
pub const ENV_PROXY: &str = "ACCOUNT_API_PROXY";

/// Environment variable holding the request timeout in milliseconds
pub const ENV_TIMEOUT_MS: &str = "ACCOUNT_API_TIMEOUT_MS";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration used to create an [`AccountClient`](super::AccountClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountClientConfig {
    /// Account collection URL, e.g. `http://localhost:8080/v1/account`
    pub url: String,
    /// Proxy to use when connecting to the account API
    pub proxy: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl AccountClientConfig {
    /// Create a config for the given collection URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Route requests through a proxy
    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Load configuration from `ACCOUNT_API_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::missing_field(ENV_URL))?;

        let mut config = Self::new(url);

        if let Some(proxy) = lookup(ENV_PROXY).filter(|p| !p.trim().is_empty()) {
            config.proxy = Some(proxy);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let millis = raw.trim().parse::<u64>().map_err(|_| Error::InvalidConfigValue {
                field: ENV_TIMEOUT_MS.to_string(),
                message: format!("expected milliseconds, got '{raw}'"),
            })?;
            config.timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Build the URL for `subpath` under the collection URL with `query`.
    ///
    /// Any query or fragment already on the configured URL is dropped.
    pub fn endpoint(&self, subpath: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| Error::config(format!("Wrong server URL '{}': {e}", self.url)))?;

        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(Error::config(format!(
                "Wrong server URL '{}': missing host",
                self.url
            )));
        }

        if !subpath.is_empty() {
            url.path_segments_mut()
                .map_err(|()| Error::config(format!("Wrong server URL '{}'", self.url)))?
                .pop_if_empty()
                .push(subpath);
        }

        url.set_query(None);
        url.set_fragment(None);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// HTTP transport settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder().timeout(self.timeout);
        if let Some(ref proxy) = self.proxy {
            builder = builder.proxy(proxy.clone());
        }
        builder.build()
    }
}
