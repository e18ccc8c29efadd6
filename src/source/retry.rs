//! Retry and deadline decorator for neighbor sources
//!
//! The walk engine never retries; wrapping its source in [`Retrying`] adds a
//! per-page retry policy for transient failures and an optional per-attempt
//! deadline without touching the engine's contract.

use super::{Continuation, LinkPage, NeighborSource};
use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based): 200ms, 400ms, 800ms...
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// [`NeighborSource`] that retries transient page failures of `S`.
///
/// `NotFound` and `Ineligible` are never retried.
#[derive(Debug)]
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
    timeout: Option<Duration>,
}

impl<S: NeighborSource> Retrying<S> {
    /// Wrap `inner` with `policy`
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            timeout: None,
        }
    }

    /// Give up on a single page attempt after `timeout` (counts as transient)
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wrapped source
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    async fn attempt(
        &self,
        title: &str,
        continuation: Option<&Continuation>,
    ) -> Result<LinkPage, FetchError> {
        let request = self.inner.fetch_page(title, continuation);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                FetchError::Transient(format!("request for {title} timed out after {limit:?}"))
            })?,
            None => request.await,
        }
    }
}

#[async_trait]
impl<S: NeighborSource> NeighborSource for Retrying<S> {
    async fn fetch_page(
        &self,
        title: &str,
        continuation: Option<&Continuation>,
    ) -> Result<LinkPage, FetchError> {
        let mut retry = 0;
        loop {
            match self.attempt(title, continuation).await {
                Err(err) if err.is_transient() && retry < self.policy.max_retries => {
                    retry += 1;
                    let delay = self.policy.delay_for(retry);
                    warn!(title, retry, ?delay, error = %err, "retrying page fetch");
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PageStatus;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails transiently `failures` times, then serves an empty content page
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        error: FetchError,
    }

    impl Flaky {
        fn new(failures: u32, error: FetchError) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                error,
            }
        }
    }

    #[async_trait]
    impl NeighborSource for Flaky {
        async fn fetch_page(
            &self,
            title: &str,
            _continuation: Option<&Continuation>,
        ) -> Result<LinkPage, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(self.error.clone());
            }
            Ok(LinkPage {
                title: title.to_string(),
                status: PageStatus::Content,
                links: vec![],
                next: None,
            })
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(350));
        assert_eq!(policy.delay_for(30), Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_from_transient() {
        let source = Retrying::new(
            Flaky::new(2, FetchError::Transient("reset".to_string())),
            RetryPolicy::default(),
        );

        let page = source.fetch_page("A", None).await.unwrap();
        assert_eq!(page.title, "A");
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let source = Retrying::new(
            Flaky::new(10, FetchError::Transient("reset".to_string())),
            RetryPolicy {
                max_retries: 2,
                ..RetryPolicy::default()
            },
        );

        assert!(source.fetch_page("A", None).await.unwrap_err().is_transient());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let source = Retrying::new(
            Flaky::new(1, FetchError::NotFound("A".to_string())),
            RetryPolicy::default(),
        );

        let err = source.fetch_page("A", None).await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("A".to_string()));
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_transient() {
        let slow = crate::source::MemoryGraph::from_edge_list(&[("A", "B")])
            .with_latency("A", Duration::from_secs(60));
        let source = Retrying::new(slow, RetryPolicy::none()).with_timeout(Duration::from_secs(1));

        let err = source.fetch_page("A", None).await.unwrap_err();
        assert!(err.is_transient());
    }
}
