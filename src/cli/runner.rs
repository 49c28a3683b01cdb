//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, CreateArgs, OutputFormat};
use crate::client::{AccountClient, AccountClientConfig, ENV_URL};
use crate::error::{Error, Result};
use crate::pagination::PageDescriptor;
use crate::server::{self, ServerConfig};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List {
                page,
                page_size,
                filter,
                all,
            } => {
                let page = PageDescriptor::new(*page, *page_size).with_filter(filter.to_filter());
                if *all {
                    self.list_all(page).await
                } else {
                    self.list_pages(page).await
                }
            }
            Commands::Fetch { id } => self.fetch(id).await,
            Commands::Create(args) => self.create(args).await,
            Commands::Delete { id, version } => self.delete(id, *version).await,
            Commands::Serve { port, database } => {
                let config = ServerConfig {
                    port: *port,
                    database: database.clone(),
                };
                server::serve(config).await
            }
        }
    }

    /// Build the account client from global flags
    fn client(&self) -> Result<AccountClient> {
        let url = self
            .cli
            .url
            .as_ref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::missing_field(format!("--url or {ENV_URL}")))?;

        let mut config = AccountClientConfig::new(url.clone());
        if let Some(ms) = self.cli.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        if let Some(ref proxy) = self.cli.proxy {
            config = config.with_proxy(proxy.clone());
        }
        AccountClient::new(config)
    }

    /// Pull pages one at a time, one line per page
    async fn list_pages(&self, page: PageDescriptor) -> Result<()> {
        let client = self.client()?;
        let mut cursor = client.list(page);
        let mut pages = 0usize;
        let mut accounts = 0usize;

        while cursor.advance().await {
            let batch = cursor.read()?;
            pages += 1;
            accounts += batch.len();
            self.output_message(&json!({
                "type": "PAGE",
                "page": cursor.page().page_number,
                "accounts": batch,
            }));
        }

        info!("Listed {} accounts in {} pages", accounts, pages);
        match cursor.terminal_error() {
            Some(e) if !e.is_no_more_data() => Err(e),
            _ => Ok(()),
        }
    }

    /// Stream every account through the prefetching pipeline
    async fn list_all(&self, page: PageDescriptor) -> Result<()> {
        let client = self.client()?;
        let mut stream = client.list_all(page);
        let mut accounts = 0usize;

        while let Some(account) = stream.next_item().await {
            accounts += 1;
            self.output_message(&json!({
                "type": "ACCOUNT",
                "account": account,
            }));
        }

        let cursor = stream.finish().await?;
        info!(
            "Streamed {} accounts, stopped at page {}",
            accounts,
            cursor.page().page_number
        );
        match cursor.terminal_error() {
            Some(e) if !e.is_no_more_data() => Err(e),
            _ => Ok(()),
        }
    }

    async fn fetch(&self, id: &str) -> Result<()> {
        let account = self.client()?.fetch(id).await?;
        self.output_message(&json!({ "type": "ACCOUNT", "account": account }));
        Ok(())
    }

    async fn create(&self, args: &CreateArgs) -> Result<()> {
        let id = args
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let account = self
            .client()?
            .create(&id, &args.organisation_id, args.to_attributes())
            .await?;
        self.output_message(&json!({ "type": "ACCOUNT", "account": account }));
        Ok(())
    }

    async fn delete(&self, id: &str, version: i64) -> Result<()> {
        let deleted = self.client()?.delete(id, version).await?;
        self.output_message(&json!({
            "type": "DELETE",
            "id": id,
            "version": version,
            "deleted": deleted,
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
