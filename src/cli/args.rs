//! Command-line argument parsing for MERGE Fetcher
//!
//! Defines the CLI structure using clap derive macros: a `download` command
//! driving the batch retrieval engine and a `config` command for inspecting
//! the effective configuration.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::errors::{ConfigError, ConfigResult};

/// MERGE Fetcher - Download CPTEC/INPE hourly precipitation data
#[derive(Parser, Debug)]
#[command(
    name = "merge_fetcher",
    version,
    about = "Download MERGE hourly precipitation files efficiently",
    long_about = "A tool for bulk-downloading hourly gridded precipitation files from the \
CPTEC/INPE MERGE archive. Features bounded concurrency, request pacing, and per-file \
failure reporting."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download MERGE files for a date range
    Download(DownloadArgs),

    /// Inspect or initialize the configuration file
    Config(ConfigArgs),
}

/// Arguments for the download command
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// First day of the range (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub start: String,

    /// Last day of the range, inclusive (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub end: String,

    /// Output directory for downloaded files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of concurrent downloads
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Pacing delay after each fetch, in seconds
    #[arg(long, value_name = "SECS")]
    pub pacing: Option<u64>,

    /// Remote archive base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Maximum number of files to download (for testing)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Dry run - show what would be downloaded without downloading
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the default configuration file location
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments.
    ///
    /// The default is info so every completed item prints its result line;
    /// quiet mode suppresses everything below errors.
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::TRACE
        } else if self.global.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(value: &str) -> ConfigResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| ConfigError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

impl DownloadArgs {
    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "workers".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        parse_date(&self.start)?;
        parse_date(&self.end)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> DownloadArgs {
        DownloadArgs {
            start: "2020-01-01".to_string(),
            end: "2020-01-02".to_string(),
            output_dir: None,
            workers: None,
            timeout: None,
            pacing: None,
            base_url: None,
            limit: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_download_args_validation() {
        assert!(base_args().validate().is_ok());

        let zero_workers = DownloadArgs {
            workers: Some(0),
            ..base_args()
        };
        assert!(zero_workers.validate().is_err());

        let bad_date = DownloadArgs {
            start: "01/01/2020".to_string(),
            ..base_args()
        };
        assert!(bad_date.validate().is_err());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2019-08-13").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 8, 13).unwrap());
        assert!(parse_date("2019-13-01").is_err());
        assert!(parse_date("not-a-date").is_err());
    }

    fn cli_with_flags(verbose: bool, very_verbose: bool, quiet: bool) -> Cli {
        Cli {
            global: GlobalArgs {
                verbose,
                very_verbose,
                quiet,
                config: None,
            },
            command: Commands::Config(ConfigArgs {
                action: ConfigAction::Show,
            }),
        }
    }

    #[test]
    fn test_log_level() {
        assert_eq!(
            cli_with_flags(false, false, true).log_level(),
            tracing::Level::ERROR
        );
        assert_eq!(
            cli_with_flags(true, false, false).log_level(),
            tracing::Level::DEBUG
        );
        assert_eq!(
            cli_with_flags(false, true, false).log_level(),
            tracing::Level::TRACE
        );
    }

    #[test]
    fn test_default_log_level_shows_per_item_lines() {
        // Per-item result lines are emitted at info; without any verbosity
        // flag they must still reach the console.
        assert_eq!(
            cli_with_flags(false, false, false).log_level(),
            tracing::Level::INFO
        );
    }

    #[test]
    fn test_cli_parses_download_command() {
        let cli = Cli::try_parse_from([
            "merge_fetcher",
            "download",
            "--start",
            "2019-08-13",
            "--end",
            "2023-12-31",
            "-w",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Download(args) => {
                assert_eq!(args.start, "2019-08-13");
                assert_eq!(args.end, "2023-12-31");
                assert_eq!(args.workers, Some(4));
                assert!(!args.dry_run);
            }
            _ => panic!("expected download command"),
        }
    }
}
