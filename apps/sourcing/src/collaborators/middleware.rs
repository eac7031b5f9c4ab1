//! Composable wrappers around collaborators.
//!
//! `Retry<T>` retries failed calls with exponential backoff; `RateLimited<T>`
//! keeps a minimum spacing between upstream calls. Both implement the same
//! collaborator traits as the value they wrap, so they stack:
//! `Retry::new(RateLimited::new(search, interval), policy)`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::collaborators::{CandidateSearch, MessageGenerator, ProfileEnricher};
use crate::errors::SourcingError;
use crate::models::{CandidateProfile, Job, ScoredCandidate};

// ────────────────────────────────────────────────────────────────────────────
// Retry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each further failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `attempt` (1-based retries): base, 2×base, 4×base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Runs `call` until it succeeds, returns a non-retryable error, or runs out of attempts.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut call: F,
) -> Result<T, SourcingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourcingError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} attempt {} failed ({}), retrying after {}ms...",
                    label,
                    attempt,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

pub struct Retry<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retry<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<T: CandidateSearch> CandidateSearch for Retry<T> {
    async fn search(&self, job: &Job) -> Result<Vec<CandidateProfile>, SourcingError> {
        with_retry(self.policy, "search", || self.inner.search(job)).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[async_trait]
impl<T: ProfileEnricher> ProfileEnricher for Retry<T> {
    async fn enrich(
        &self,
        candidates: Vec<CandidateProfile>,
    ) -> Result<Vec<CandidateProfile>, SourcingError> {
        with_retry(self.policy, "enrichment", || {
            self.inner.enrich(candidates.clone())
        })
        .await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[async_trait]
impl<T: MessageGenerator> MessageGenerator for Retry<T> {
    async fn generate(
        &self,
        candidate: &ScoredCandidate,
        job: &Job,
    ) -> Result<String, SourcingError> {
        with_retry(self.policy, "message generation", || {
            self.inner.generate(candidate, job)
        })
        .await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rate limiting
// ────────────────────────────────────────────────────────────────────────────

/// Enforces at least `interval` between the starts of consecutive upstream calls.
/// Waiting callers queue on the mutex, so concurrent calls are serialized.
pub struct RateLimited<T> {
    inner: T,
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl<T> RateLimited<T> {
    pub fn new(inner: T, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last_call: Mutex::new(None),
        }
    }

    async fn wait_turn(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            tokio::time::sleep_until(last + self.interval).await;
        }
        *last_call = Some(Instant::now());
    }
}

#[async_trait]
impl<T: CandidateSearch> CandidateSearch for RateLimited<T> {
    async fn search(&self, job: &Job) -> Result<Vec<CandidateProfile>, SourcingError> {
        self.wait_turn().await;
        self.inner.search(job).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[async_trait]
impl<T: ProfileEnricher> ProfileEnricher for RateLimited<T> {
    async fn enrich(
        &self,
        candidates: Vec<CandidateProfile>,
    ) -> Result<Vec<CandidateProfile>, SourcingError> {
        self.wait_turn().await;
        self.inner.enrich(candidates).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[async_trait]
impl<T: MessageGenerator> MessageGenerator for RateLimited<T> {
    async fn generate(
        &self,
        candidate: &ScoredCandidate,
        job: &Job,
    ) -> Result<String, SourcingError> {
        self.wait_turn().await;
        self.inner.generate(candidate, job).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` calls, then returns one candidate.
    struct FlakySearch {
        calls: AtomicUsize,
        failures: usize,
        error: fn() -> SourcingError,
    }

    impl FlakySearch {
        fn new(failures: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures,
                error: || SourcingError::Search("upstream 503".to_string()),
            }
        }
    }

    #[async_trait]
    impl CandidateSearch for FlakySearch {
        async fn search(&self, _job: &Job) -> Result<Vec<CandidateProfile>, SourcingError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err((self.error)())
            } else {
                Ok(vec![CandidateProfile::new("Ada")])
            }
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = policy();
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_after_backoff() {
        let search = Retry::new(FlakySearch::new(2), policy());
        let start = Instant::now();

        let found = search.search(&Job::new("Engineer", "Acme")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(search.inner.calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_max_attempts() {
        let search = Retry::new(FlakySearch::new(10), policy());
        let err = search.search(&Job::new("Engineer", "Acme")).await.unwrap_err();
        assert!(matches!(err, SourcingError::Search(_)));
        assert_eq!(search.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_errors_are_not_retried() {
        let mut flaky = FlakySearch::new(10);
        flaky.error = || SourcingError::Validation("bad job".to_string());
        let search = Retry::new(flaky, policy());

        assert!(search.search(&Job::new("Engineer", "Acme")).await.is_err());
        assert_eq!(search.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_spaces_calls() {
        let search = RateLimited::new(FlakySearch::new(0), Duration::from_secs(1));
        let job = Job::new("Engineer", "Acme");
        let start = Instant::now();

        for _ in 0..3 {
            search.search(&job).await.unwrap();
        }
        // First call goes straight through, the next two wait a full interval each.
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrappers_stack() {
        let search = Retry::new(
            RateLimited::new(FlakySearch::new(1), Duration::from_millis(500)),
            policy(),
        );
        let found = search.search(&Job::new("Engineer", "Acme")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(search.name(), "flaky");
    }
}
