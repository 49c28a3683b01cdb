// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Account API
//!
//! Client and companion server for a paginated, versioned account records API.
//!
//! ## Features
//!
//! - **Page Cursor**: Pull one page per `advance`, sticky first error
//! - **Item Stream**: Flatten pages into single accounts with bounded prefetch
//! - **Canonical Queries**: Deterministic `page[...]` and `filter[...]` parameters
//! - **Account Client**: list, fetch, create and versioned delete
//! - **Companion Server**: axum routes over a DuckDB store
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use account_api::{AccountClient, AccountClientConfig, PageDescriptor};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> account_api::Result<()> {
//!     let client = AccountClient::new(AccountClientConfig::new(
//!         "http://localhost:8080/v1/account",
//!     ))?;
//!
//!     // One page at a time
//!     let mut cursor = client.list(PageDescriptor::first());
//!     while cursor.advance().await {
//!         for account in cursor.read()? {
//!             println!("{}", account.id);
//!         }
//!     }
//!
//!     // Or every account, prefetched in the background
//!     let mut accounts = client.list_all(PageDescriptor::first());
//!     while let Some(account) = accounts.next().await {
//!         println!("{}", account.id);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  advance   ┌────────────┐  load(page)  ┌──────────────────┐
//! │  ItemStream  │◀── tasks ──│ PageCursor │─────────────▶│ AccountPageLoader│──▶ GET /v1/account
//! └──────────────┘            └────────────┘              └──────────────────┘
//!                                                                   │ to_query
//!                                                          page[number], page[size], filter[...]
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the account API
pub mod error;

/// Account resource types
pub mod types;

/// HTTP transport
pub mod http;

/// Page cursor, item stream and query canonicalization
pub mod pagination;

/// Account API client
pub mod client;

/// Companion server backed by DuckDB
pub mod server;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use client::{AccountClient, AccountClientConfig, AccountPageLoader};
pub use pagination::{
    flatten, to_query, AccountFilter, CursorState, FilterDimension, ItemStream, PageCursor,
    PageDescriptor, PageLoader,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
