//! Exponential-backoff retry for LLM Oracle calls, adapted from the
//! teacher's Claude API retry policy (`infrastructure/claude/retry.rs`):
//! same doubling-backoff shape, generalized to the domain's `LlmError`
//! and its own `is_transient()` predicate instead of a Claude-specific
//! status-code check.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::domain::error::LlmError;
use crate::domain::models::RetryConfig;

pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            initial_backoff_ms: cfg.initial_backoff_ms,
            max_backoff_ms: cfg.max_backoff_ms,
        }
    }
}

impl RetryPolicy {
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_transient() || attempt >= self.max_retries {
                        return Err(err);
                    }
                    sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let ms = self.initial_backoff_ms.saturating_mul(2_u64.saturating_pow(attempt)).min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy() -> RetryPolicy {
        RetryPolicy { max_retries: 3, initial_backoff_ms: 1, max_backoff_ms: 4 }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = policy();
        assert_eq!(p.backoff(0), Duration::from_millis(1));
        assert_eq!(p.backoff(1), Duration::from_millis(2));
        assert_eq!(p.backoff(2), Duration::from_millis(4));
        assert_eq!(p.backoff(3), Duration::from_millis(4));
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let count = Arc::new(AtomicU32::new(0));
        let result = policy()
            .execute(|| {
                let count = Arc::clone(&count);
                async move {
                    if count.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(LlmError::Timeout)
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let count = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = policy()
            .execute(|| {
                let count = Arc::clone(&count);
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err(LlmError::InvalidJson("bad".into()))
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
