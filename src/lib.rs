//! MERGE Fetcher Library
//!
//! A Rust library for bulk-downloading hourly gridded precipitation files
//! from the CPTEC/INPE MERGE archive. Provides bounded-concurrency
//! downloading with request pacing and per-file failure reporting.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(DEFAULT_CONCURRENCY, 7);
        assert_eq!(DEFAULT_PACING.as_secs(), 2);
        assert!(USER_AGENT.contains("MERGE-Fetcher"));
        assert!(MERGE_BASE_URL.starts_with("https://"));
    }

    #[test]
    fn test_error_types() {
        let download_error = errors::DownloadError::Timeout { seconds: 30 };
        let app_error = AppError::Download(download_error);
        assert_eq!(app_error.category(), "download");
    }
}
