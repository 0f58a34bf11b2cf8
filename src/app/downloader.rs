//! Batch download orchestration
//!
//! Drives a whole run: a fixed pool of workers pulls timestamps from a
//! channel, resolves each to its archive address, fetches it under the
//! concurrency limiter, applies the pacing delay while the slot is still
//! held, persists successful payloads, and funnels every outcome into a
//! [`BatchReport`]. Per-item failures never abort the batch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::archive::ArchiveLayout;
use super::fetcher::Fetch;
use super::limiter::ConcurrencyLimiter;
use super::models::{BatchReport, FailureKind, FetchOutcome, FetchResult, HourStamp};
use crate::constants::{merge, workers};
use crate::errors::{AppError, ConfigError, ConfigResult, DownloadError, DownloadResult, Result};

/// Configuration for one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Delay applied after each fetch completes, before its slot is
    /// released. Caps slot turnover independently of the concurrency width.
    pub pacing: Duration,
    /// Directory receiving the downloaded files; created (with parents)
    /// before the run starts.
    pub output_dir: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            pacing: workers::DEFAULT_PACING,
            output_dir: PathBuf::from(merge::DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Orchestrates a bounded-concurrency batch download.
///
/// The limiter is passed in explicitly rather than held as ambient state, so
/// the concurrency/pacing interaction is a visible, testable contract.
pub struct BatchDownloader<F: Fetch + ?Sized> {
    config: DownloadConfig,
    layout: ArchiveLayout,
    fetcher: Arc<F>,
    limiter: ConcurrencyLimiter,
}

impl<F: Fetch + ?Sized> Clone for BatchDownloader<F> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            layout: self.layout.clone(),
            fetcher: self.fetcher.clone(),
            limiter: self.limiter.clone(),
        }
    }
}

impl<F: Fetch + ?Sized + 'static> BatchDownloader<F> {
    /// Create a downloader.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the limiter has zero capacity,
    /// which would suspend every acquisition forever.
    pub fn new(
        config: DownloadConfig,
        layout: ArchiveLayout,
        fetcher: Arc<F>,
        limiter: ConcurrencyLimiter,
    ) -> ConfigResult<Self> {
        if limiter.capacity() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(Self {
            config,
            layout,
            fetcher,
            limiter,
        })
    }

    /// The limiter shared by this run's workers
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Run the batch over `stamps` and collect every outcome.
    pub async fn run<I>(&self, stamps: I) -> Result<BatchReport>
    where
        I: IntoIterator<Item = HourStamp>,
    {
        self.run_with(stamps, |_| {}).await
    }

    /// Run the batch, invoking `on_outcome` for each completed item.
    ///
    /// Outcomes arrive in completion order, which is not the enumeration
    /// order. The returned report holds exactly one outcome per scheduled
    /// timestamp.
    pub async fn run_with<I, C>(&self, stamps: I, mut on_outcome: C) -> Result<BatchReport>
    where
        I: IntoIterator<Item = HourStamp>,
        C: FnMut(&FetchOutcome),
    {
        fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: self.config.output_dir.clone(),
                source,
            })?;

        let stamps: Vec<HourStamp> = stamps.into_iter().collect();
        let total = stamps.len();
        if total == 0 {
            return Ok(BatchReport::default());
        }

        let worker_count = self.limiter.capacity().min(total);
        debug!(
            "Starting batch of {} files with {} workers (pacing {:?})",
            total, worker_count, self.config.pacing
        );

        let (work_tx, work_rx) = mpsc::channel::<HourStamp>(workers::WORK_CHANNEL_CAPACITY);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (outcome_tx, mut outcome_rx) =
            mpsc::channel::<FetchOutcome>(workers::OUTCOME_CHANNEL_CAPACITY);

        let feeder = tokio::spawn(async move {
            for stamp in stamps {
                if work_tx.send(stamp).await.is_err() {
                    break;
                }
            }
        });

        let mut worker_handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let downloader = self.clone();
            let work_rx = work_rx.clone();
            let outcome_tx = outcome_tx.clone();
            worker_handles.push(tokio::spawn(async move {
                loop {
                    // Hold the queue lock only while taking the next item
                    let stamp = { work_rx.lock().await.recv().await };
                    let Some(stamp) = stamp else { break };
                    let outcome = downloader.process(stamp).await;
                    if outcome_tx.send(outcome).await.is_err() {
                        break;
                    }
                }
                debug!("Worker {} finished", worker_id);
            }));
        }
        drop(outcome_tx);

        let mut report = BatchReport::with_capacity(total);
        while let Some(outcome) = outcome_rx.recv().await {
            on_outcome(&outcome);
            report.push(outcome);
        }

        feeder
            .await
            .map_err(|e| AppError::generic(format!("feeder task failed: {}", e)))?;
        for handle in futures::future::join_all(worker_handles).await {
            handle.map_err(|e| AppError::generic(format!("worker task failed: {}", e)))?;
        }

        debug_assert_eq!(report.len(), total);
        Ok(report)
    }

    /// Take one timestamp through resolve, fetch, pace, and persist.
    ///
    /// Always terminates in exactly one outcome; every error is converted,
    /// never propagated.
    async fn process(&self, stamp: HourStamp) -> FetchOutcome {
        let file_name = self.layout.file_name(&stamp);
        let descriptor = match self.layout.resolve(&stamp) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!("{} [failed] {}", file_name, e);
                return FetchOutcome {
                    stamp,
                    file_name,
                    result: FetchResult::Failed {
                        kind: FailureKind::classify(&e),
                        url: self.layout.base().to_string(),
                        message: e.to_string(),
                    },
                };
            }
        };

        match self.fetch_and_persist(&descriptor).await {
            Ok(bytes) => {
                info!("{} [ok] ({} bytes)", descriptor.file_name, bytes);
                FetchOutcome {
                    stamp,
                    file_name,
                    result: FetchResult::Fetched { bytes },
                }
            }
            Err(e) => {
                warn!("{} [failed] {} ({})", descriptor.file_name, e, descriptor.url);
                FetchOutcome {
                    stamp,
                    file_name,
                    result: FetchResult::Failed {
                        kind: FailureKind::classify(&e),
                        url: descriptor.url.to_string(),
                        message: e.to_string(),
                    },
                }
            }
        }
    }

    /// The slot-gated body: fetch, pace, persist.
    ///
    /// The pacing sleep runs while the slot is still held, and the slot is
    /// released only after the payload is on disk, so at most
    /// `limiter.capacity()` fetch-and-persist sequences are ever in flight.
    async fn fetch_and_persist(&self, descriptor: &super::models::ResourceDescriptor) -> DownloadResult<u64> {
        let _slot = self.limiter.acquire().await?;

        let fetched = self.fetcher.fetch(descriptor).await;
        tokio::time::sleep(self.config.pacing).await;
        let payload = fetched?;

        let path = self.config.output_dir.join(&descriptor.file_name);
        fs::write(&path, &payload)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(payload.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::fetcher::MockFetcher;
    use tempfile::TempDir;

    fn test_downloader(
        output_dir: PathBuf,
        concurrency: usize,
    ) -> (BatchDownloader<MockFetcher>, MockFetcher) {
        let fetcher = MockFetcher::new();
        let config = DownloadConfig {
            pacing: Duration::ZERO,
            output_dir,
        };
        let downloader = BatchDownloader::new(
            config,
            ArchiveLayout::cptec(),
            Arc::new(fetcher.clone()),
            ConcurrencyLimiter::new(concurrency),
        )
        .unwrap();
        (downloader, fetcher)
    }

    #[tokio::test]
    async fn test_zero_capacity_limiter_rejected() {
        let result = BatchDownloader::new(
            DownloadConfig::default(),
            ArchiveLayout::cptec(),
            Arc::new(MockFetcher::new()),
            ConcurrencyLimiter::new(0),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_range_creates_dir_and_returns_empty_report() {
        let temp = TempDir::new().unwrap();
        let output_dir = temp.path().join("nested").join("out");
        let (downloader, fetcher) = test_downloader(output_dir.clone(), 2);

        let report = downloader.run(Vec::new()).await.unwrap();
        assert!(report.is_empty());
        assert!(output_dir.is_dir());
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_outcome_callback_sees_every_item() {
        let temp = TempDir::new().unwrap();
        let (downloader, fetcher) = test_downloader(temp.path().to_path_buf(), 2);
        fetcher.succeed_with(b"GRIB");

        let stamps: Vec<_> = (0..5).map(|h| HourStamp::new(2020, 1, 1, h)).collect();
        let mut seen = 0;
        let report = downloader
            .run_with(stamps, |_| {
                seen += 1;
            })
            .await
            .unwrap();

        assert_eq!(seen, 5);
        assert_eq!(report.len(), 5);
        assert_eq!(report.completed(), 5);
    }
}
