//! Error types for a comparison run
//!
//! Differences between the servers are never errors; they are reported
//! through the [`Reporter`](crate::report::Reporter). These errors abort a
//! run before or while its catalogs are loaded.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for comparison runs
pub type CompareResult<T> = Result<T, CompareError>;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error(transparent)]
    Config(#[from] hapi_config::ConfigError),

    #[error("invalid dataset id pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid server URL '{url}'")]
    InvalidUrl { url: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON from {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}
