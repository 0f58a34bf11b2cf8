//! MERGE archive address resolution
//!
//! Maps an [`HourStamp`] deterministically to the remote locator and local
//! file name of one archive file. The mapping is injective: distinct stamps
//! never collide on either field, which is what makes re-runs idempotent.
//! No network or filesystem access happens here.

use url::Url;

use super::models::{HourStamp, ResourceDescriptor};
use crate::constants::merge;
use crate::errors::{ConfigError, ConfigResult, DownloadError, DownloadResult};

/// Remote archive layout: a validated base URL plus the fixed path scheme
/// `{base}/{year}/{month:02}/{day:02}/MERGE_CPTEC_{YYYYMMDDHH}.grib2`.
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    base: String,
}

impl ArchiveLayout {
    /// Create a layout for the given archive base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the base is not a valid
    /// absolute URL.
    pub fn new(base: &str) -> ConfigResult<Self> {
        Url::parse(base).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base.to_string(),
            source,
        })?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// Layout for the default CPTEC/INPE MERGE hourly archive
    pub fn cptec() -> Self {
        // The constant is a valid URL; parse cannot fail here
        Self {
            base: merge::BASE_URL.trim_end_matches('/').to_string(),
        }
    }

    /// The configured base URL
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Archive file name for one timestamp
    pub fn file_name(&self, stamp: &HourStamp) -> String {
        format!(
            "{}{}{}",
            merge::FILE_PREFIX,
            stamp.compact(),
            merge::FILE_EXTENSION
        )
    }

    /// Resolve one timestamp to its remote locator and local file name
    pub fn resolve(&self, stamp: &HourStamp) -> DownloadResult<ResourceDescriptor> {
        let file_name = self.file_name(stamp);
        let address = format!(
            "{}/{}/{:02}/{:02}/{}",
            self.base, stamp.year, stamp.month, stamp.day, file_name
        );
        let url = Url::parse(&address).map_err(|source| DownloadError::InvalidUrl {
            url: address,
            source,
        })?;
        Ok(ResourceDescriptor { url, file_name })
    }
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self::cptec()
    }
}
