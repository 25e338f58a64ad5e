//! Bounded retry with exponential backoff for external calls

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{Error, Result};

/// Retry policy applied to graph queries, suggestion requests and scorer runs
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_base_ms)
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base_ms,
        }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self::new(1, 0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is spent
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempts < self.max_attempts => {
                    let backoff = calculate_backoff(self.backoff_base_ms, attempts);
                    warn!(
                        operation = label,
                        attempt = attempts,
                        wait_ms = backoff,
                        error = %e,
                        "External call failed, retrying after backoff"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Bound a future by `secs`, mapping expiry to a retryable [`Error::Timeout`]
pub async fn with_timeout<T, Fut>(service: &'static str, secs: u64, future: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    tokio::time::timeout(Duration::from_secs(secs), future)
        .await
        .map_err(|_| Error::Timeout { service, secs })?
}

/// Exponential backoff with up to 10% jitter
fn calculate_backoff(base_ms: u64, attempt: u32) -> u64 {
    let delay = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let jitter = delay / 10;
    if jitter == 0 {
        return delay;
    }
    delay + rand::thread_rng().gen_range(0..jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_attempt_budget() {
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
        assert_eq!(RetryPolicy::new(0, 0).max_attempts(), 1);
        assert_eq!(RetryPolicy::from(&RetryConfig::default()).max_attempts(), 3);
    }

    #[test]
    fn test_calculate_backoff() {
        assert!(calculate_backoff(100, 1) >= 100);
        assert!(calculate_backoff(100, 2) >= 200);
        assert!(calculate_backoff(100, 3) < 440);
        assert_eq!(calculate_backoff(0, 5), 0);
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(3, 0);

        let result = policy
            .run("test", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(Error::Timeout {
                        service: "graph",
                        secs: 1,
                    })
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(2, 0);

        let result: Result<()> = policy
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::RateLimited("graph".into()))
            })
            .await;

        assert!(matches!(result, Err(Error::RateLimited(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(5, 0);

        let result: Result<()> = policy
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::ScorerProtocol("2 scores for 3 lines".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let result: Result<()> = with_timeout("autocomplete", 1, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(
            result,
            Err(Error::Timeout {
                service: "autocomplete",
                secs: 1
            })
        ));
    }
}
