//! Application constants for MERGE Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// MERGE archive layout constants
pub mod merge {
    /// CPTEC/INPE MERGE hourly archive base URL
    pub const BASE_URL: &str = "https://ftp.cptec.inpe.br/modelos/tempo/MERGE/GPM/HOURLY";

    /// Prefix of every archive file name
    pub const FILE_PREFIX: &str = "MERGE_CPTEC_";

    /// Extension of every archive file name
    pub const FILE_EXTENSION: &str = ".grib2";

    /// Default local output directory for downloaded files
    pub const DEFAULT_OUTPUT_DIR: &str = "MERGE/horario";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "MERGE-Fetcher/0.1.0 (Climate Research Tool)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// Worker and concurrency configuration
pub mod workers {
    use super::Duration;

    /// Default number of concurrent fetches
    pub const DEFAULT_CONCURRENCY: usize = 7;

    /// Default pacing delay applied after each fetch while the slot is held
    pub const DEFAULT_PACING: Duration = Duration::from_secs(2);

    /// Buffer size of the channel feeding timestamps to the worker pool
    pub const WORK_CHANNEL_CAPACITY: usize = 64;

    /// Buffer size of the channel collecting per-item outcomes
    pub const OUTCOME_CHANNEL_CAPACITY: usize = 256;
}

/// Logging constants
pub mod logging {
    /// Default log level when no verbosity flag is given. Per-item result
    /// lines are emitted at info, so info is the floor for normal runs.
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

// Re-export commonly used constants for convenience
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use merge::BASE_URL as MERGE_BASE_URL;
pub use workers::{DEFAULT_CONCURRENCY, DEFAULT_PACING};
