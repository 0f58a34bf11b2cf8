//! Error types for MERGE Fetcher
//!
//! This module defines the error types for all components of the application.
//! Errors are designed to be actionable: a failed download carries enough
//! context for an operator to identify which hours need a re-run.

use std::path::PathBuf;
use thiserror::Error;

/// Download and HTTP client errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error (connection refused, DNS failure, etc.)
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Server completed the response with a non-success status
    #[error("Server rejected request: HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Request did not complete within the configured timeout
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// I/O error while persisting a payload
    #[error("File I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A resource locator could not be constructed
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Generic error for other issues
    #[error("{0}")]
    Other(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Configuration could not be serialized")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Invalid date argument
    #[error("Invalid date '{value}'. Expected YYYY-MM-DD")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Invalid base URL for the remote archive
    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// I/O error reading or writing the configuration file
    #[error("I/O error accessing configuration")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The batch completed but some items failed
    #[error("{failed} of {total} files failed to download")]
    PartialFailure { failed: usize, total: usize },

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(_) => "download",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::PartialFailure { .. } => "partial_failure",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = AppError::Download(DownloadError::Timeout { seconds: 30 });
        assert_eq!(err.category(), "download");

        let err = AppError::PartialFailure {
            failed: 3,
            total: 24,
        };
        assert_eq!(err.category(), "partial_failure");
        assert_eq!(err.to_string(), "3 of 24 files failed to download");
    }

    #[test]
    fn test_status_error_names_url() {
        let err = DownloadError::HttpStatus {
            status: 404,
            url: "https://example.com/2020/01/01/file.grib2".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("https://example.com/2020/01/01/file.grib2"));
    }
}
