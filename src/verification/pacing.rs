/*!
 * Pacing for rate-limited external calls.
 *
 * A `CallPacer` bounds the number of calls in flight with a semaphore and
 * keeps call starts at least `interval` apart. The first call starts
 * immediately.
 */

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;

/// Bounded, interval-spaced call queue
#[derive(Debug, Clone)]
pub struct CallPacer {
    permits: Arc<Semaphore>,
    interval: Duration,
    last_start: Arc<Mutex<Option<Instant>>>,
}

impl CallPacer {
    /// Pacer allowing `max_in_flight` concurrent calls spaced by `interval`
    pub fn new(max_in_flight: usize, interval: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            interval,
            last_start: Arc::new(Mutex::new(None)),
        }
    }

    /// One call at a time, spaced by `interval`
    pub fn sequential(interval: Duration) -> Self {
        Self::new(1, interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `call` once a slot is free and the interval since the previous start has passed
    pub async fn run<F, T>(&self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is never closed, so acquire only fails if that changes
        let _permit = self.permits.acquire().await.ok();
        self.wait_turn().await;
        call.await
    }

    async fn wait_turn(&self) {
        let mut last = self.last_start.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.interval;
            if Instant::now() < ready_at {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
