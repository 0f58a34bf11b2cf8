//! Core data models for MERGE Fetcher
//!
//! Defines the hourly timestamp, the resolved resource descriptor, and the
//! per-item and batch-level outcome types shared by the downloader components.

use std::fmt;

use url::Url;

use crate::errors::DownloadError;

/// A point in time at hourly granularity.
///
/// Carries the calendar fields used to address the remote archive; no
/// timezone conversion is performed anywhere in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourStamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl HourStamp {
    /// Create a new hourly timestamp from raw calendar fields
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
        }
    }

    /// Compact `YYYYMMDDHH` form used in archive file names
    pub fn compact(&self) -> String {
        format!(
            "{}{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour
        )
    }
}

impl fmt::Display for HourStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02}T{:02}",
            self.year, self.month, self.day, self.hour
        )
    }
}

/// Remote locator and local file name for one timestamp.
///
/// Derived deterministically from an [`HourStamp`]; one-to-one and never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Fully qualified address of the remote file
    pub url: Url,
    /// Local file name (identical to the remote file name)
    pub file_name: String,
}

/// Why a retrieval attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Remote completed the response with a non-success status
    Status(u16),
    /// Connection could not be completed (DNS, refused, reset)
    Transport,
    /// Request exceeded the configured timeout
    Timeout,
    /// Payload could not be written to local storage
    Io,
}

impl FailureKind {
    /// Classify a download error into its failure kind
    pub fn classify(error: &DownloadError) -> Self {
        match error {
            DownloadError::HttpStatus { status, .. } => FailureKind::Status(*status),
            DownloadError::Timeout { .. } => FailureKind::Timeout,
            DownloadError::Io { .. } => FailureKind::Io,
            DownloadError::Http(e) if e.is_timeout() => FailureKind::Timeout,
            DownloadError::Http(_) | DownloadError::InvalidUrl { .. } | DownloadError::Other(_) => {
                FailureKind::Transport
            }
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Status(code) => write!(f, "HTTP {}", code),
            FailureKind::Transport => write!(f, "transport error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Io => write!(f, "I/O error"),
        }
    }
}

/// Terminal result of one retrieval attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Payload retrieved and persisted
    Fetched {
        /// Size of the persisted payload in bytes
        bytes: u64,
    },
    /// Retrieval or persistence failed
    Failed {
        kind: FailureKind,
        /// Attempted remote locator, for operator diagnostics
        url: String,
        /// Human-readable description of the underlying error
        message: String,
    },
}

/// The outcome of one scheduled timestamp.
///
/// Every enumerated timestamp terminates in exactly one of these; none are
/// silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub stamp: HourStamp,
    pub file_name: String,
    pub result: FetchResult,
}

impl FetchOutcome {
    /// Whether this item was retrieved and persisted
    pub fn is_success(&self) -> bool {
        matches!(self.result, FetchResult::Fetched { .. })
    }
}

/// Aggregated outcomes of a whole batch run.
///
/// Invariant: `len()` equals the number of timestamps enumerated for the run.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<FetchOutcome>,
}

impl BatchReport {
    /// Create an empty report with room for `capacity` outcomes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    /// Record one outcome
    pub fn push(&mut self, outcome: FetchOutcome) {
        self.outcomes.push(outcome);
    }

    /// Total number of recorded outcomes
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no outcomes were recorded
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of successfully persisted items
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed items
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }

    /// All recorded outcomes, in completion order
    pub fn outcomes(&self) -> &[FetchOutcome] {
        &self.outcomes
    }

    /// Failed outcomes only, for operator re-run lists
    pub fn failures(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Total bytes persisted across all successful items
    pub fn bytes_downloaded(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| match o.result {
                FetchResult::Fetched { bytes } => Some(bytes),
                FetchResult::Failed { .. } => None,
            })
            .sum()
    }
}
