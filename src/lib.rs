//! Nyaa-Mirror: an incremental mirror of a numerically addressed torrent catalog
//!
//! This crate walks catalog IDs in increasing order, fetches each listing page,
//! extracts a typed record from its markup and reconciles it into a local
//! SQLite store with soft-delete semantics for posts and their comments.

pub mod config;
pub mod extract;
pub mod model;
pub mod output;
pub mod scanner;
pub mod storage;

use thiserror::Error;

/// Main error type for Nyaa-Mirror operations
///
/// Every variant here is fatal for a scan. Transient conditions are carried by
/// [`scanner::FetchError`] and never escape the retry loop.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] scanner::FetchError),

    #[error("Failed to discover newest post: {0}")]
    Discovery(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid selector for field '{field}': {message}")]
    InvalidSelector { field: String, message: String },
}

/// Errors raised while turning a listing page into a [`model::PageRecord`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Invalid date '{value}' for field {field}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid file size '{0}'")]
    InvalidSize(String),

    #[error("Invalid comment id '{0}'")]
    InvalidCommentId(String),

    #[error("Invalid number '{value}' for field {field}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Result type alias for Nyaa-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Comment, CommentRecord, FetchOutcome, PageRecord, Post};
pub use scanner::{ScanController, ScanOutcome, ScanReport};
