//! Concurrency admission gate
//!
//! A counting limiter with fixed capacity bounding how many fetch-and-persist
//! bodies run simultaneously. Acquisition suspends until a slot is free and
//! yields an RAII [`Slot`] guard; the slot is returned exactly once when the
//! guard drops, on every exit path. Double release or release-without-acquire
//! cannot be expressed.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::errors::{DownloadError, DownloadResult};

/// Fixed-capacity admission gate shared by all workers of a run.
///
/// Cloning is cheap and shares the underlying slot pool.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// Create a limiter with `capacity` slots.
    ///
    /// A zero capacity would deadlock every acquisition and is rejected by
    /// configuration validation before a limiter is built.
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot and take it.
    ///
    /// The slot is held until the returned guard is dropped.
    pub async fn acquire(&self) -> DownloadResult<Slot> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DownloadError::Other("concurrency limiter closed".to_string()))?;
        Ok(Slot { _permit: permit })
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently free slots
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of slots currently held
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

/// A held concurrency slot. Dropping it returns the slot to the pool.
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}
