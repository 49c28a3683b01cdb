//! Account API operations
//!
//! Maps each operation onto one HTTP request and translates response
//! statuses into the crate error taxonomy.

use super::config::AccountClientConfig;
use crate::error::{Error, Result};
use crate::http::{read_json, HttpClient};
use crate::pagination::{flatten, ItemStream, PageCursor, PageDescriptor, PageLoader};
use crate::types::{AccountAttributes, AccountResource, DataEnvelope, NewAccount};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

/// Client for the account collection
#[derive(Debug, Clone)]
pub struct AccountClient {
    http: HttpClient,
    config: Arc<AccountClientConfig>,
}

impl AccountClient {
    /// Create a client from its configuration
    pub fn new(config: AccountClientConfig) -> Result<Self> {
        let http = HttpClient::with_config(config.http_config())?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Client configuration
    pub fn config(&self) -> &AccountClientConfig {
        &self.config
    }

    /// List accounts page by page, starting at `page`.
    ///
    /// No request is sent until the first [`PageCursor::advance`].
    pub fn list(&self, page: PageDescriptor) -> PageCursor<AccountPageLoader> {
        PageCursor::new(self.page_loader(), page)
    }

    /// Stream every account from `page` onwards, prefetching pages in the
    /// background. See [`flatten`].
    pub fn list_all(&self, page: PageDescriptor) -> ItemStream<AccountPageLoader> {
        flatten(self.list(page))
    }

    /// Loader fetching account pages over HTTP
    pub fn page_loader(&self) -> AccountPageLoader {
        AccountPageLoader {
            http: self.http.clone(),
            config: Arc::clone(&self.config),
        }
    }

    /// Fetch a single account.
    ///
    /// Returns [`Error::AccountNotFound`] when the API answers 404.
    pub async fn fetch(&self, account_id: &str) -> Result<AccountResource> {
        let url = self.config.endpoint(account_id, &[])?;
        let response = self.http.get(url.as_str()).await?;

        match response.status() {
            StatusCode::OK => {
                let envelope: DataEnvelope<AccountResource> = read_json(response).await?;
                debug!(id = account_id, "Fetched account");
                Ok(envelope.data)
            }
            StatusCode::NOT_FOUND => Err(Error::AccountNotFound {
                id: account_id.to_string(),
            }),
            status => Err(unexpected_status("fetch account", status)),
        }
    }

    /// Create an account.
    ///
    /// Returns [`Error::AccountExists`] when the API answers 409. A response
    /// describing a different account than requested is an unexpected
    /// response.
    pub async fn create(
        &self,
        account_id: &str,
        organisation_id: &str,
        attributes: AccountAttributes,
    ) -> Result<AccountResource> {
        let url = self.config.endpoint("", &[])?;
        let country = attributes.country.clone();
        let body = serde_json::to_value(DataEnvelope::new(NewAccount::new(
            account_id,
            organisation_id,
            attributes,
        )))?;

        let response = self.http.post(url.as_str(), body).await?;

        match response.status() {
            StatusCode::CREATED => {
                let envelope: DataEnvelope<AccountResource> = read_json(response).await?;
                let created = envelope.data;
                let same_country = created
                    .attributes
                    .as_ref()
                    .is_some_and(|a| a.country == country);
                if created.id != account_id
                    || created.organisation_id != organisation_id
                    || !same_country
                {
                    warn!(id = account_id, "Create response describes a different account");
                    return Err(Error::unexpected(
                        "create response contains different data than requested",
                    ));
                }
                debug!(id = account_id, "Created account");
                Ok(created)
            }
            StatusCode::CONFLICT => Err(Error::AccountExists {
                id: account_id.to_string(),
            }),
            status => Err(unexpected_status("create account", status)),
        }
    }

    /// Delete an account at a specific version.
    ///
    /// Returns `true` when deleted, `false` when no such account exists, and
    /// [`Error::WrongVersion`] when the account has a different version.
    pub async fn delete(&self, account_id: &str, version: i64) -> Result<bool> {
        let query = [("version".to_string(), version.to_string())];
        let url = self.config.endpoint(account_id, &query)?;
        let response = self.http.delete(url.as_str()).await?;

        match response.status() {
            StatusCode::NO_CONTENT => {
                debug!(id = account_id, version, "Deleted account");
                Ok(true)
            }
            StatusCode::NOT_FOUND => Ok(false),
            StatusCode::CONFLICT => Err(Error::WrongVersion {
                id: account_id.to_string(),
                version,
            }),
            status => Err(unexpected_status("delete account", status)),
        }
    }
}

fn unexpected_status(operation: &str, status: StatusCode) -> Error {
    warn!("Failed to {operation}: response status {}", status.as_u16());
    Error::unexpected(format!(
        "failed to {operation}: response status code {}",
        status.as_u16()
    ))
}

// ============================================================================
// Page Loader
// ============================================================================

/// Loads one page of accounts with `GET {url}?page[number]=..&page[size]=..`
#[derive(Debug, Clone)]
pub struct AccountPageLoader {
    http: HttpClient,
    config: Arc<AccountClientConfig>,
}

#[async_trait]
impl PageLoader for AccountPageLoader {
    type Item = AccountResource;

    async fn load(&self, page: &PageDescriptor) -> Result<Vec<AccountResource>> {
        let url = self.config.endpoint("", &page.to_query())?;
        let response = self.http.get(url.as_str()).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(unexpected_status("list accounts", status));
        }

        let envelope: DataEnvelope<Vec<AccountResource>> = read_json(response).await?;
        if envelope.data.is_empty() {
            return Err(Error::NoMoreData);
        }
        Ok(envelope.data)
    }
}
