//! CLI module
//!
//! Command-line interface for the account API.
//!
//! # Commands
//!
//! - `list` - List accounts, one page or one account per line
//! - `fetch` - Fetch a single account
//! - `create` - Create an account
//! - `delete` - Delete an account at a given version
//! - `serve` - Start the companion HTTP server

mod commands;
mod runner;

pub use commands::{Cli, Commands, CreateArgs, FilterArgs, OutputFormat};
pub use runner::Runner;

#[cfg(test)]
mod tests;
