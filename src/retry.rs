//! Opt-in retry with exponential backoff
//!
//! Neither [`TaskPoller`](crate::TaskPoller) nor [`DashboardClient`](crate::DashboardClient)
//! retries on its own: every failure is reported to the caller. Callers that want
//! transient failures absorbed can wrap a single call in [`with_retry`].
//!
//! # Example
//!
//! ```no_run
//! use evdash::retry::with_retry;
//! use evdash::{Config, DashboardClient, TaskId, TaskPoller};
//!
//! # async fn example() -> evdash::Result<()> {
//! let config = Config::default();
//! let retry = config.retry.clone();
//! let poller = TaskPoller::new(DashboardClient::new(config)?);
//! let handle = TaskId::from("3f2c9a7e-6f0e-4a4b-9d55-0b1c2d3e4f5a");
//!
//! let task = with_retry(&retry, || poller.poll(&handle)).await?;
//! println!("{}", task.status);
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, overloaded service) return `true`.
/// Permanent failures (bad input, task failed, cancelled) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            // Only gateway/overload statuses; a failed task has no HTTP status
            Error::Service {
                status: Some(status),
                ..
            } => *status >= 500 || *status == 429,
            Error::Service { status: None, .. } => false,
            Error::Serialization(_) | Error::MalformedResponse(_) => false,
            Error::Config { .. } | Error::InvalidInput { .. } => false,
            Error::Timeout { .. } | Error::Cancelled { .. } => false,
        }
    }
}

/// Execute an async operation, retrying transient failures with exponential backoff
///
/// Makes at most `1 + config.max_attempts` calls. Non-retryable errors are
/// returned immediately; otherwise the last error is returned once retries are
/// used up.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut retries = 0;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::info!(calls = retries + 1, "operation recovered after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !err.is_retryable() {
            tracing::debug!(error = %err, calls = retries + 1, "not retrying permanent failure");
            return Err(err);
        }
        if retries >= config.max_attempts {
            tracing::error!(error = %err, calls = retries + 1, "giving up after retries");
            return Err(err);
        }

        let delay = match config.backoff(retries) {
            delay if config.jitter => add_jitter(delay),
            delay => delay,
        };
        retries += 1;
        tracing::warn!(
            error = %err,
            retry = retries,
            max_attempts = config.max_attempts,
            delay_ms = delay.as_millis(),
            "transient failure, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Add random jitter between 0% and 100% of `delay`
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient error"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn fixed_backoff(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn test_success_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&RetryConfig::default(), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_transient_then_succeed() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fixed_backoff(3), || {
            let counter = counter_clone.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fixed_backoff(2), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Transient)));
        assert_eq!(counter.load(Ordering::SeqCst), 3, "initial + 2 retries");
    }

    #[tokio::test]
    async fn test_permanent_error_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&RetryConfig::default(), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Permanent)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_exponential_and_capped() {
        let config = RetryConfig {
            max_attempts: 4,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            backoff_multiplier: 2.0,
            jitter: false,
        };
        let start = Instant::now();

        let _ = with_retry(&config, || async { Err::<i32, _>(TestError::Transient) }).await;

        // 100 + 200 + 300 (capped) + 300 (capped)
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(900), "waited {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1000), "waited {elapsed:?}");
    }

    #[test]
    fn test_error_retryability() {
        let gateway = Error::Service {
            message: "bad gateway".into(),
            status: Some(502),
        };
        assert!(gateway.is_retryable());

        let throttled = Error::Service {
            message: "slow down".into(),
            status: Some(429),
        };
        assert!(throttled.is_retryable());

        let not_found = Error::Service {
            message: "未找到该车型数据".into(),
            status: Some(404),
        };
        assert!(!not_found.is_retryable());

        let task_failed = Error::Service {
            message: "boom".into(),
            status: None,
        };
        assert!(!task_failed.is_retryable());

        assert!(!Error::InvalidInput { field: "brand".into() }.is_retryable());
        assert!(
            !Error::Timeout {
                task_id: "t".into(),
                elapsed: Duration::from_secs(60),
            }
            .is_retryable()
        );
        assert!(!Error::Cancelled { task_id: "t".into() }.is_retryable());
    }

    #[test]
    fn add_jitter_stays_within_bounds_over_many_iterations() {
        let delay = Duration::from_millis(50);
        for i in 0..200 {
            let jittered = add_jitter(delay);
            assert!(
                jittered >= delay,
                "iteration {i}: jittered {jittered:?} < base delay {delay:?}"
            );
            assert!(
                jittered <= delay * 2,
                "iteration {i}: jittered {jittered:?} > 2x base delay {:?}",
                delay * 2
            );
        }
    }

    #[test]
    fn add_jitter_on_zero_delay_returns_zero() {
        assert_eq!(add_jitter(Duration::ZERO), Duration::ZERO);
    }
}
