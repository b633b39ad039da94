//! Trailing-edge debounce for catalog search requests.
//!
//! Each catalog page instance sends its search requests with a stable client
//! token. A request waits out the debounce window; if a newer request with the
//! same token arrived in the meantime, the older one is superseded and does no
//! work. Only the last request of a burst runs the filter pipeline.
//!
//! Requests from the other catalog controls run immediately but still take a
//! ticket, so a search that was waiting when a filter changed never lands on
//! top of the newer list.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

/// Maximum number of page instances tracked at once.
const MAX_TRACKED_CLIENTS: u64 = 10_000;

/// Idle time after which a page instance's counter is forgotten.
const CLIENT_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Outcome of waiting out the debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// This was the latest request; run it.
    Fire,
    /// A newer request replaced this one.
    Superseded,
}

/// Latest-request-wins debouncer keyed by client token.
#[derive(Clone)]
pub struct Debouncer {
    delay: Duration,
    generations: Cache<Uuid, Arc<AtomicU64>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generations: Cache::builder()
                .max_capacity(MAX_TRACKED_CLIENTS)
                .time_to_idle(CLIENT_IDLE_TIMEOUT)
                .build(),
        }
    }

    /// The quiet window.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    async fn counter(&self, client: Uuid) -> Arc<AtomicU64> {
        self.generations
            .get_with(client, async { Arc::new(AtomicU64::new(0)) })
            .await
    }

    /// Register a request for `client` and wait out the window.
    ///
    /// Every call cancels any call for the same client that is still waiting.
    pub async fn settle(&self, client: Uuid) -> Settled {
        if self.delay.is_zero() {
            return Settled::Fire;
        }

        let counter = self.counter(client).await;
        let ticket = counter.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.delay).await;

        if counter.load(Ordering::SeqCst) == ticket {
            Settled::Fire
        } else {
            tracing::trace!(%client, ticket, "Search request superseded");
            Settled::Superseded
        }
    }

    /// Cancel any request for `client` that is still waiting, without waiting
    /// itself.
    pub async fn supersede(&self, client: Uuid) {
        if self.delay.is_zero() {
            return;
        }

        self.counter(client).await.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_single_request_fires_after_delay() {
        let debouncer = Debouncer::new(Duration::from_millis(250));
        let started = tokio::time::Instant::now();

        assert_eq!(debouncer.settle(Uuid::new_v4()).await, Settled::Fire);
        assert!(started.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_only_last_fires() {
        let debouncer = Debouncer::new(Duration::from_millis(250));
        let client = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let debouncer = debouncer.clone();
            handles.push(tokio::spawn(async move { debouncer.settle(client).await }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }
        assert_eq!(
            outcomes,
            vec![Settled::Superseded, Settled::Superseded, Settled::Fire]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_after_quiet_window_each_fire() {
        let debouncer = Debouncer::new(Duration::from_millis(250));
        let client = Uuid::new_v4();

        assert_eq!(debouncer.settle(client).await, Settled::Fire);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(debouncer.settle(client).await, Settled::Fire);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_do_not_interfere() {
        let debouncer = Debouncer::new(Duration::from_millis(250));

        let first = {
            let debouncer = debouncer.clone();
            tokio::spawn(async move { debouncer.settle(Uuid::new_v4()).await })
        };
        let second = {
            let debouncer = debouncer.clone();
            tokio::spawn(async move { debouncer.settle(Uuid::new_v4()).await })
        };

        assert_eq!(first.await.unwrap(), Settled::Fire);
        assert_eq!(second.await.unwrap(), Settled::Fire);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supersede_cancels_waiting_search() {
        let debouncer = Debouncer::new(Duration::from_millis(250));
        let client = Uuid::new_v4();

        let search = {
            let debouncer = debouncer.clone();
            tokio::spawn(async move { debouncer.settle(client).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let started = tokio::time::Instant::now();
        debouncer.supersede(client).await;

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(search.await.unwrap(), Settled::Superseded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_after_supersede_fires() {
        let debouncer = Debouncer::new(Duration::from_millis(250));
        let client = Uuid::new_v4();

        debouncer.supersede(client).await;
        assert_eq!(debouncer.settle(client).await, Settled::Fire);
    }

    #[tokio::test]
    async fn test_zero_delay_fires_immediately() {
        let debouncer = Debouncer::new(Duration::ZERO);
        assert_eq!(debouncer.settle(Uuid::new_v4()).await, Settled::Fire);
    }
}
