//! Error types for the account API
//!
//! This module defines the error hierarchy for the client, the page cursor and
//! the companion server. All public APIs return `Result<T, Error>` where Error
//! is defined here.
//!
//! `Error` is `Clone` so a page cursor can report the same terminal error on
//! every read. Foreign errors are converted into message-carrying variants at
//! the boundary instead of being wrapped.

use thiserror::Error;

/// The main error type for the account API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Connectivity Errors
    // ============================================================================
    #[error("Failed to connect to API server: {message}")]
    Connection { message: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    // ============================================================================
    // Pagination
    // ============================================================================
    #[error("No more accounts")]
    NoMoreData,

    #[error("Data not requested yet: advance the cursor first")]
    NotStarted,

    #[error("Item stream stopped before the end of data")]
    Cancelled,

    // ============================================================================
    // Response Errors
    // ============================================================================
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    #[error("Failed to parse JSON: {message}")]
    JsonParse { message: String },

    // ============================================================================
    // Account Errors
    // ============================================================================
    #[error("Account {id} not found")]
    AccountNotFound { id: String },

    #[error("Account {id} already exists")]
    AccountExists { id: String },

    #[error("Wrong version {version} of account {id}")]
    WrongVersion { id: String, version: i64 },

    // ============================================================================
    // Server Errors
    // ============================================================================
    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed endpoint or configuration
    Configuration,
    /// Network or transport failure, including timeouts
    Connectivity,
    /// Clean end of a paginated sequence
    NoMoreData,
    /// Cursor read before the first load
    NotStarted,
    /// Item stream stopped before its cursor finished
    Cancelled,
    /// Malformed payload or unexpected status
    UnexpectedResponse,
    /// Requested account does not exist
    NotFound,
    /// Account exists already or has a different version
    Conflict,
    /// Relational store failure
    Storage,
    /// Request rejected by validation
    InvalidRequest,
    /// Anything else
    Other,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an unexpected response error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::InvalidUrl(_) => ErrorKind::Configuration,
            Error::Connection { .. } | Error::Timeout { .. } => ErrorKind::Connectivity,
            Error::NoMoreData => ErrorKind::NoMoreData,
            Error::NotStarted => ErrorKind::NotStarted,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::HttpStatus { .. } | Error::UnexpectedResponse { .. } | Error::JsonParse { .. } => {
                ErrorKind::UnexpectedResponse
            }
            Error::AccountNotFound { .. } => ErrorKind::NotFound,
            Error::AccountExists { .. } | Error::WrongVersion { .. } => ErrorKind::Conflict,
            Error::Store { .. } => ErrorKind::Storage,
            Error::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Check if this is the clean end-of-data signal
    pub fn is_no_more_data(&self) -> bool {
        matches!(self, Error::NoMoreData)
    }

    /// Check if a caller could reasonably retry the failed operation.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Connection { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout {
                message: e.to_string(),
            }
        } else if e.is_builder() {
            Error::config(e.to_string())
        } else if e.is_decode() || e.is_body() {
            Error::unexpected(e.to_string())
        } else {
            Error::connection(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonParse {
            message: e.to_string(),
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Error::store(e.to_string())
    }
}

/// Result type alias for the account API
pub type Result<T> = std::result::Result<T, Error>;
