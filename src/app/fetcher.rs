//! Resource fetching over HTTP
//!
//! Defines the [`Fetch`] seam used by the batch downloader, the production
//! [`HttpFetcher`] built on `reqwest`, and a scriptable [`MockFetcher`] for
//! tests. A fetcher performs exactly one retrieval attempt per call; retry
//! policy, pacing, and persistence all belong to the orchestrator.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::models::ResourceDescriptor;
use crate::constants::http;
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout (covers the whole response)
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Maximum number of pooled connections per host
    pub pool_max_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_max_per_host: http::POOL_MAX_PER_HOST,
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> DownloadResult<Client> {
        Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .pool_max_idle_per_host(self.pool_max_per_host)
            .build()
            .map_err(DownloadError::Http)
    }
}

/// One-shot retrieval of a remote resource.
///
/// Implementations perform a single attempt and classify the outcome into
/// the download error taxonomy. This abstraction keeps the orchestrator
/// testable without real network calls.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Retrieve the payload behind `descriptor`.
    ///
    /// # Errors
    ///
    /// - `DownloadError::HttpStatus` when the server answers with a
    ///   non-success status
    /// - `DownloadError::Timeout` when the request exceeds the configured
    ///   timeout
    /// - `DownloadError::Http` for other transport failures
    async fn fetch(&self, descriptor: &ResourceDescriptor) -> DownloadResult<Vec<u8>>;
}

/// Production fetcher backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Create a fetcher from the given client configuration
    pub fn new(config: &ClientConfig) -> DownloadResult<Self> {
        Ok(Self {
            client: config.build_http_client()?,
            timeout_secs: config.request_timeout.as_secs(),
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, descriptor: &ResourceDescriptor) -> DownloadResult<Vec<u8>> {
        debug!("Fetching {}", descriptor.url);

        let timeout_secs = self.timeout_secs;
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                DownloadError::Timeout {
                    seconds: timeout_secs,
                }
            } else {
                DownloadError::Http(e)
            }
        };

        let response = self
            .client
            .get(descriptor.url.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                status: status.as_u16(),
                url: descriptor.url.to_string(),
            });
        }

        let payload = response.bytes().await.map_err(classify)?;
        debug!("Fetched {} bytes from {}", payload.len(), descriptor.url);
        Ok(payload.to_vec())
    }
}

/// Scriptable fetcher for tests.
///
/// Responses are queued per URL and consumed in FIFO order; un-scripted URLs
/// fall back to a configurable default. The mock records every call and
/// tracks the high-water mark of concurrently executing fetches, which is
/// how tests assert the concurrency bound.
#[derive(Clone, Default)]
pub struct MockFetcher {
    inner: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    responses: Mutex<HashMap<String, VecDeque<DownloadResult<Vec<u8>>>>>,
    fallback: Mutex<Option<Vec<u8>>>,
    calls: Mutex<Vec<String>>,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    /// Create a mock with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a specific URL
    pub fn push_response(&self, url: &str, response: DownloadResult<Vec<u8>>) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Make every un-scripted URL succeed with the given payload
    pub fn succeed_with(&self, payload: &[u8]) {
        *self.inner.fallback.lock().unwrap() = Some(payload.to_vec());
    }

    /// Delay every fetch by `latency`, widening the overlap window so
    /// concurrency assertions are meaningful
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.inner.latency.lock().unwrap() = Some(latency);
        self
    }

    /// URLs of all fetches made so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    /// Number of fetches made so far
    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }

    /// Number of fetches currently executing
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of fetches that ever executed simultaneously
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter on drop, even if the fetch is cancelled
struct InFlightGuard {
    in_flight: Arc<MockState>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetch for MockFetcher {
    async fn fetch(&self, descriptor: &ResourceDescriptor) -> DownloadResult<Vec<u8>> {
        let current = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner
            .max_in_flight
            .fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard {
            in_flight: self.inner.clone(),
        };

        let url = descriptor.url.to_string();
        self.inner.calls.lock().unwrap().push(url.clone());

        let latency = *self.inner.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = self
            .inner
            .responses
            .lock()
            .unwrap()
            .get_mut(&url)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(response) => response,
            None => match self.inner.fallback.lock().unwrap().clone() {
                Some(payload) => Ok(payload),
                None => Err(DownloadError::Other(format!(
                    "no mock response configured for {}",
                    url
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::archive::ArchiveLayout;
    use crate::app::models::HourStamp;

    fn descriptor() -> ResourceDescriptor {
        ArchiveLayout::cptec()
            .resolve(&HourStamp::new(2020, 1, 1, 0))
            .unwrap()
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.pool_max_per_host > 0);
    }

    #[test]
    fn test_http_client_creation() {
        let config = ClientConfig::default();
        assert!(config.build_http_client().is_ok());
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_mock_scripted_responses_fifo() {
        let mock = MockFetcher::new();
        let descriptor = descriptor();
        mock.push_response(descriptor.url.as_str(), Ok(b"first".to_vec()));
        mock.push_response(descriptor.url.as_str(), Ok(b"second".to_vec()));

        assert_eq!(mock.fetch(&descriptor).await.unwrap(), b"first");
        assert_eq!(mock.fetch(&descriptor).await.unwrap(), b"second");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_unscripted_url_fails_without_fallback() {
        let mock = MockFetcher::new();
        let result = mock.fetch(&descriptor()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_fallback_payload() {
        let mock = MockFetcher::new();
        mock.succeed_with(b"GRIB");
        assert_eq!(mock.fetch(&descriptor()).await.unwrap(), b"GRIB");
    }

    #[tokio::test]
    async fn test_mock_in_flight_returns_to_zero() {
        let mock = MockFetcher::new();
        mock.succeed_with(b"GRIB");
        let _ = mock.fetch(&descriptor()).await;
        assert_eq!(mock.in_flight(), 0);
        assert_eq!(mock.max_in_flight(), 1);
    }
}
