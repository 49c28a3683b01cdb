//! CLI commands and argument parsing

use crate::client::{ENV_PROXY, ENV_TIMEOUT_MS, ENV_URL};
use crate::pagination::{AccountFilter, DEFAULT_PAGE_SIZE};
use crate::server::{DEFAULT_PORT, ENV_DB_PATH, ENV_PORT, IN_MEMORY};
use crate::types::AccountAttributes;
use clap::{Args, Parser, Subcommand};

/// Account API client and companion server
#[derive(Parser, Debug)]
#[command(name = "account-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Account collection URL, e.g. http://localhost:8080/v1/account
    #[arg(short, long, global = true, env = ENV_URL)]
    pub url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true, env = ENV_TIMEOUT_MS)]
    pub timeout_ms: Option<u64>,

    /// Proxy for all requests
    #[arg(long, global = true, env = ENV_PROXY)]
    pub proxy: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List accounts page by page
    List {
        /// First page to fetch (zero-based)
        #[arg(long, default_value = "0")]
        page: u64,

        /// Accounts per page (zero or less uses the server default)
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_negative_numbers = true)]
        page_size: i64,

        #[command(flatten)]
        filter: FilterArgs,

        /// Emit one line per account instead of one per page
        #[arg(long)]
        all: bool,
    },

    /// Fetch a single account
    Fetch {
        /// Account ID
        id: String,
    },

    /// Create an account
    Create(CreateArgs),

    /// Delete an account at a given version
    Delete {
        /// Account ID
        id: String,

        /// Expected account version
        #[arg(long)]
        version: i64,
    },

    /// Start the account API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = ENV_PORT, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// DuckDB database file (":memory:" keeps data in memory)
        #[arg(long, env = ENV_DB_PATH, default_value = IN_MEMORY)]
        database: String,
    },
}

/// Fields of a new account
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Account ID (random UUID when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Organisation ID
    #[arg(long)]
    pub organisation_id: String,

    /// ISO 3166-1 country code
    #[arg(long)]
    pub country: String,

    /// Account holder name line (repeat for up to four lines)
    #[arg(long = "name", required = true)]
    pub names: Vec<String>,

    #[arg(long)]
    pub base_currency: Option<String>,

    #[arg(long)]
    pub account_number: Option<String>,

    #[arg(long)]
    pub bank_id: Option<String>,

    #[arg(long)]
    pub bank_id_code: Option<String>,

    #[arg(long)]
    pub bic: Option<String>,

    #[arg(long)]
    pub iban: Option<String>,

    #[arg(long)]
    pub customer_id: Option<String>,
}

impl CreateArgs {
    /// Attributes of the account to create
    pub fn to_attributes(&self) -> AccountAttributes {
        AccountAttributes {
            base_currency: self.base_currency.clone(),
            account_number: self.account_number.clone(),
            bank_id: self.bank_id.clone(),
            bank_id_code: self.bank_id_code.clone(),
            bic: self.bic.clone(),
            iban: self.iban.clone(),
            customer_id: self.customer_id.clone(),
            ..AccountAttributes::new(self.country.clone(), self.names.clone())
        }
    }
}

/// List filters; each flag takes comma-separated values
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long, value_delimiter = ',')]
    pub account_number: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub bank_id: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub bank_id_code: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub country: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub customer_id: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub iban: Vec<String>,
}

impl FilterArgs {
    /// Convert into an account filter
    pub fn to_filter(&self) -> AccountFilter {
        AccountFilter {
            account_number: self.account_number.clone(),
            bank_id: self.bank_id.clone(),
            bank_id_code: self.bank_id_code.clone(),
            country: self.country.clone(),
            customer_id: self.customer_id.clone(),
            iban: self.iban.clone(),
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
