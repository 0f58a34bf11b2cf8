//! CLI command handlers for MERGE Fetcher
//!
//! Wires parsed arguments to the application components: loads configuration,
//! applies CLI overrides, builds the downloader stack, and reports results.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::args::{parse_date, ConfigAction, ConfigArgs, DownloadArgs, GlobalArgs};
use crate::app::{
    hour_range, ArchiveLayout, BatchDownloader, ConcurrencyLimiter, HourStamp, HttpFetcher,
};
use crate::config::AppConfig;
use crate::errors::{AppError, ConfigError, Result};

/// Handle the download command
pub async fn handle_download(args: DownloadArgs, global: &GlobalArgs) -> Result<()> {
    args.validate()?;

    let mut config = AppConfig::load(global.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.download.validate()?;

    let start = parse_date(&args.start)?;
    let end = parse_date(&args.end)?;

    let mut stamps: Vec<HourStamp> = hour_range(start, end).collect();
    let range_was_empty = stamps.is_empty();
    if let Some(limit) = args.limit {
        stamps.truncate(limit);
    }

    let layout = ArchiveLayout::new(&config.download.base_url)?;

    if args.dry_run {
        return dry_run(&stamps, &layout, &config);
    }

    if stamps.is_empty() {
        println!(
            "{}",
            empty_batch_message(range_was_empty, &args.start, &args.end)
        );
        return Ok(());
    }

    let total = stamps.len();
    info!(
        "Downloading {} files to {} ({} concurrent, {}s pacing)",
        total,
        config.download.output_dir.display(),
        config.download.concurrency,
        config.download.pacing_secs,
    );

    let fetcher = Arc::new(HttpFetcher::new(&config.client.to_client_config())?);
    let limiter = ConcurrencyLimiter::new(config.download.concurrency);
    let downloader = BatchDownloader::new(
        config.download.to_download_config(),
        layout,
        fetcher,
        limiter,
    )?;

    let bar = progress_bar(total as u64, global.quiet);
    let report = downloader
        .run_with(stamps, |_outcome| {
            bar.inc(1);
        })
        .await?;
    bar.finish_and_clear();

    if !global.quiet {
        println!(
            "Downloaded {} of {} files ({} bytes)",
            report.completed(),
            report.len(),
            report.bytes_downloaded()
        );
        for failure in report.failures() {
            println!("  failed: {}", failure.file_name);
        }
    }

    if report.failed() > 0 {
        return Err(AppError::PartialFailure {
            failed: report.failed(),
            total: report.len(),
        });
    }
    Ok(())
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(config: &mut AppConfig, args: &DownloadArgs) {
    if let Some(workers) = args.workers {
        config.download.concurrency = workers;
    }
    if let Some(pacing) = args.pacing {
        config.download.pacing_secs = pacing;
    }
    if let Some(timeout) = args.timeout {
        config.client.request_timeout_secs = timeout;
    }
    if let Some(output_dir) = &args.output_dir {
        config.download.output_dir = output_dir.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.download.base_url = base_url.clone();
    }
}

/// Explain why an empty batch has nothing to do: either the range itself
/// selects no hours, or a limit cut it down to zero
fn empty_batch_message(range_was_empty: bool, start: &str, end: &str) -> String {
    if range_was_empty {
        format!("Nothing to download: {} is after {}", start, end)
    } else {
        "Nothing to download: --limit 0 selects no files".to_string()
    }
}

/// Show the planned batch without fetching anything
fn dry_run(stamps: &[HourStamp], layout: &ArchiveLayout, config: &AppConfig) -> Result<()> {
    println!(
        "Would download {} files to {}",
        stamps.len(),
        config.download.output_dir.display()
    );
    if let (Some(first), Some(last)) = (stamps.first(), stamps.last()) {
        println!("  first: {}", layout.file_name(first));
        println!("  last:  {}", layout.file_name(last));
    }
    Ok(())
}

fn progress_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} files ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Handle the config command
pub async fn handle_config(args: ConfigArgs, global: &GlobalArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = AppConfig::load(global.config.as_deref())?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => match AppConfig::default_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("No configuration directory available on this platform"),
        },
        ConfigAction::Init { force } => {
            let path = global
                .config
                .clone()
                .or_else(AppConfig::default_path)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "config".to_string(),
                    reason: "no configuration directory available".to_string(),
                })?;
            if path.exists() && !force {
                return Err(ConfigError::InvalidValue {
                    field: "config".to_string(),
                    reason: format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    ),
                }
                .into());
            }
            AppConfig::default().write_to(&path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn download_args() -> DownloadArgs {
        DownloadArgs {
            start: "2020-01-01".to_string(),
            end: "2020-01-01".to_string(),
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
    fn test_overrides_win_over_config() {
        let mut config = AppConfig::default();
        let args = DownloadArgs {
            workers: Some(2),
            pacing: Some(0),
            timeout: Some(5),
            output_dir: Some("custom/out".into()),
            base_url: Some("https://example.com/archive".to_string()),
            ..download_args()
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.download.concurrency, 2);
        assert_eq!(config.download.pacing_secs, 0);
        assert_eq!(config.client.request_timeout_secs, 5);
        assert_eq!(config.download.output_dir, std::path::PathBuf::from("custom/out"));
        assert_eq!(config.download.base_url, "https://example.com/archive");
    }

    #[test]
    fn test_empty_batch_message_distinguishes_limit_from_reversed_range() {
        let reversed = empty_batch_message(true, "2020-02-01", "2020-01-01");
        assert_eq!(reversed, "Nothing to download: 2020-02-01 is after 2020-01-01");

        // A valid range truncated to nothing must not claim the dates are
        // out of order.
        let limited = empty_batch_message(false, "2020-01-01", "2020-01-02");
        assert!(!limited.contains("is after"));
        assert!(limited.contains("--limit"));
    }

    #[test]
    fn test_no_overrides_keep_defaults() {
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &download_args());
        assert_eq!(config.download.concurrency, 7);
        assert_eq!(config.download.pacing_secs, 2);
    }
}
