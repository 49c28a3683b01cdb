//! HTTP client module
//!
//! Provides the HTTP transport used by the account client.
//!
//! # Features
//!
//! - **Timeouts**: One timeout for every request of a client
//! - **Proxy**: Optional proxy for every request
//! - **Status Passthrough**: Every HTTP status comes back as a response

mod client;

pub use client::{read_json, HttpClient, HttpClientConfig, HttpClientConfigBuilder};

#[cfg(test)]
mod tests;
