use std::future::Future;
use std::time::Duration;

use rand::Rng;
use rossum_core::RetryConfig;
use tokio::time::Instant;
use tracing::warn;

use crate::error::{Error, Result};

/// Re-issues transient failures with exponential backoff and jitter
///
/// Bounded by `max_retries` and by `max_total_wait` measured from the first
/// attempt. When either bound is hit the last error is returned as-is.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

/// Bookkeeping of one policy invocation; never shared between calls
#[derive(Debug)]
struct RetryState {
    attempt: u32,
    started: Instant,
}

impl RetryState {
    fn new() -> Self {
        Self {
            attempt: 0,
            started: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Delay before retry number `retry` (1-based), jitter excluded
    ///
    /// Never longer than `max_total_wait`, whatever the server hint says.
    pub fn backoff_delay(&self, retry: u32, hint: Option<Duration>) -> Duration {
        let cap = self.config.max_total_wait();
        if let Some(hint) = hint {
            return hint.min(cap);
        }
        let exponent = retry.saturating_sub(1).min(16) as i32;
        let scale = self.config.backoff_factor.max(0.0) * 2f64.powi(exponent);
        Duration::try_from_secs_f64(self.config.base_delay().as_secs_f64() * scale)
            .map_or(cap, |delay| delay.min(cap))
    }

    fn jitter(&self) -> Duration {
        let max = self.config.max_jitter_ms;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max))
    }

    /// Run `operation` until it succeeds, fails deterministically, or the budget runs out
    ///
    /// `operation` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut state = RetryState::new();

        loop {
            state.attempt += 1;
            let err: Error = match operation(state.attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || state.attempt > self.config.max_retries {
                return Err(err);
            }

            let delay = self
                .backoff_delay(state.attempt, err.retry_after())
                .saturating_add(self.jitter());
            let resume_at = state.elapsed().checked_add(delay);
            if resume_at.map_or(true, |at| at > self.config.max_total_wait()) {
                warn!(
                    attempt = state.attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retry budget exhausted"
                );
                return Err(err);
            }

            warn!(
                attempt = state.attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, TransportError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_retries,
            base_delay_ms: 1000,
            backoff_factor: 1.0,
            max_jitter_ms: 0,
            max_total_wait_secs: 60,
        })
    }

    fn server_error() -> Error {
        Error::Server {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[test]
    fn test_backoff_delay_doubles() {
        let policy = policy(3);
        assert_eq!(policy.backoff_delay(1, None), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(2, None), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3, None), Duration::from_secs(4));
        assert_eq!(
            policy.backoff_delay(3, Some(Duration::from_secs(9))),
            Duration::from_secs(9)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let started = Instant::now();

        let result = policy(3)
            .run(|_| {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(server_error())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff on the paused clock
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_surfaces_last_error_unchanged() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = policy(2)
            .run(|attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(Error::Server {
                        status: 500 + attempt as u16,
                        message: format!("attempt {}", attempt),
                    })
                }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "server error (503): attempt 3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deterministic_errors_are_not_retried() {
        for err in [
            Error::NotFound {
                message: String::new(),
            },
            Error::Auth {
                status: 401,
                message: String::new(),
            },
            Error::Transport(TransportError::Connect("refused".into())),
        ] {
            let kind = err.kind();
            let mut slot = Some(err);
            let calls = AtomicU32::new(0);

            let result = policy(3)
                .run(|_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let next = slot.take();
                    async move {
                        match next {
                            Some(err) => Err::<(), _>(err),
                            None => Ok(()),
                        }
                    }
                })
                .await;

            assert_eq!(result.unwrap_err().kind(), kind);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_wait_bound() {
        let policy = RetryPolicy::new(RetryConfig {
            max_retries: 10,
            base_delay_ms: 1000,
            backoff_factor: 1.0,
            max_jitter_ms: 0,
            max_total_wait_secs: 5,
        });
        let calls = AtomicU32::new(0);

        let err = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(server_error()) }
            })
            .await
            .unwrap_err();

        // waits 1s and 2s; the next 4s delay would end at 7s > 5s
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_hint_takes_precedence() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = policy(1)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 1 {
                        Err(Error::RateLimited {
                            retry_after: Some(Duration::from_secs(10)),
                            message: String::new(),
                        })
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_delay_is_capped_by_total_wait() {
        let policy = policy(3);
        assert_eq!(
            policy.backoff_delay(1, Some(Duration::MAX)),
            Duration::from_secs(60)
        );
        assert_eq!(policy.backoff_delay(40, None), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_retry_after_surfaces_rate_limit() {
        let policy = RetryPolicy::new(RetryConfig {
            max_jitter_ms: 5000,
            ..RetryConfig::default()
        });
        let calls = AtomicU32::new(0);

        let err = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<(), _>(Error::RateLimited {
                        retry_after: Some(Duration::from_secs(u64::MAX)),
                        message: "slow down".into(),
                    })
                }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(u64::MAX)));
    }
}
