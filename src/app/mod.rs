//! Core application logic for MERGE Fetcher
//!
//! Contains the hourly timeline enumerator, the archive address resolver,
//! the HTTP fetcher, the concurrency limiter, and the batch orchestrator.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use merge_fetcher::app::{
//!     ArchiveLayout, BatchDownloader, ClientConfig, ConcurrencyLimiter, DownloadConfig,
//!     HttpFetcher, hour_range,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HttpFetcher::new(&ClientConfig::default())?);
//! let downloader = BatchDownloader::new(
//!     DownloadConfig::default(),
//!     ArchiveLayout::cptec(),
//!     fetcher,
//!     ConcurrencyLimiter::new(7),
//! )?;
//!
//! let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
//! let report = downloader.run(hour_range(start, end)).await?;
//! println!("{} ok, {} failed", report.completed(), report.failed());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod downloader;
pub mod fetcher;
pub mod limiter;
pub mod models;
pub mod timeline;

// Re-export main public API
pub use archive::ArchiveLayout;
pub use downloader::{BatchDownloader, DownloadConfig};
pub use fetcher::{ClientConfig, Fetch, HttpFetcher, MockFetcher};
pub use limiter::{ConcurrencyLimiter, Slot};
pub use models::{
    BatchReport, FailureKind, FetchOutcome, FetchResult, HourStamp, ResourceDescriptor,
};
pub use timeline::{hour_count, hour_range, HourRange};
