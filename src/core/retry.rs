//! Generic retry/fallback policy, grounded on `spec.md` §7's "retry with
//! exponential backoff up to 3 attempts, then fall back to a secondary
//! provider" and on the teacher's
//! `core::exchange::reconnecting::ReconnectingDataStream`, which implements
//! the analogous shape for market data streams.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Run `f`, retrying with exponential backoff until `max_attempts` is
    /// exhausted.
    pub async fn run<F, Fut, T>(&self, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match f().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    let backoff = self.base_delay * 2u32.pow(attempt - 1);
                    warn!(attempt, error = %e, "retrying after backoff");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run each provider in order, retrying each with [`RetryPolicy::run`]
    /// before falling through to the next — the "fall back to a secondary
    /// provider" half of `spec.md` §7.
    pub async fn run_with_fallback<F, Fut, T>(&self, providers: Vec<F>) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_err = None;
        for mut provider in providers {
            match self.run(&mut provider).await {
                Ok(value) => return Ok(value),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| Error::Config("no providers configured".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_when_first_attempt_ok() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<i32> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<i32> = policy
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(Error::Config("transient".into()))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<i32> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Config("always fails".into())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn falls_back_to_secondary_provider() {
        let policy = RetryPolicy::new(1, Duration::from_millis(1));

        let result: Result<&str> = policy
            .run_with_fallback(vec![
                || async { Err(Error::Config("primary down".into())) },
                || async { Ok("secondary") },
            ])
            .await;

        assert_eq!(result.unwrap(), "secondary");
    }
}
