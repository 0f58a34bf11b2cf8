//! Configuration management for MERGE Fetcher
//!
//! Unified configuration with zero-config defaults, optional TOML file
//! loading from the platform config directory, and CLI overrides applied on
//! top by the command handlers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::{ClientConfig, DownloadConfig};
use crate::constants::{http, logging, merge, workers};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientSettings,
    /// Batch download settings
    pub download: DownloadSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// TOML-friendly HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Maximum pooled connections per host
    pub pool_max_per_host: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
        }
    }
}

impl ClientSettings {
    /// Convert into the runtime client configuration
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            pool_max_per_host: self.pool_max_per_host,
        }
    }
}

/// TOML-friendly batch download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Number of concurrent fetches
    pub concurrency: usize,
    /// Pacing delay after each fetch, in seconds
    pub pacing_secs: u64,
    /// Output directory for downloaded files
    pub output_dir: PathBuf,
    /// Remote archive base URL
    pub base_url: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            concurrency: workers::DEFAULT_CONCURRENCY,
            pacing_secs: workers::DEFAULT_PACING.as_secs(),
            output_dir: PathBuf::from(merge::DEFAULT_OUTPUT_DIR),
            base_url: merge::BASE_URL.to_string(),
        }
    }
}

impl DownloadSettings {
    /// Validate settings that would make a run impossible
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "download.concurrency".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Convert into the runtime download configuration
    pub fn to_download_config(&self) -> DownloadConfig {
        DownloadConfig {
            pacing: Duration::from_secs(self.pacing_secs),
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default log level when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicitly given path must exist. Without one, the default config
    /// file is used when present, otherwise built-in defaults apply.
    pub fn load(explicit_path: Option<&Path>) -> ConfigResult<Self> {
        let path = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::load_from(&path)
            }
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.download.validate()?;
        Ok(config)
    }

    /// Platform config file location, e.g.
    /// `~/.config/merge_fetcher/config.toml` on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("merge_fetcher").join("config.toml"))
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write this configuration to `path`, creating parent directories
    pub fn write_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_original_source() {
        let config = AppConfig::default();
        assert_eq!(config.download.concurrency, 7);
        assert_eq!(config.download.pacing_secs, 2);
        assert_eq!(config.client.request_timeout_secs, 30);
        assert!(config.download.base_url.contains("MERGE/GPM/HOURLY"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let settings = DownloadSettings {
            concurrency: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let toml = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.download.concurrency, config.download.concurrency);
        assert_eq!(parsed.client.request_timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let parsed: AppConfig = toml::from_str("[download]\nconcurrency = 3\n").unwrap();
        assert_eq!(parsed.download.concurrency, 3);
        assert_eq!(parsed.download.pacing_secs, 2);
        assert_eq!(parsed.client.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_write_cycle() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.download.concurrency = 4;
        config.write_to(&path).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.download.concurrency, 4);
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(ConfigError::NotFound { .. })
        ));
    }
}
