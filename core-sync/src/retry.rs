//! Bounded sleep-and-repoll
//!
//! The remote store's duplicate and name-search indexes are eventually
//! consistent after delete/upload, so the engine waits by blocking
//! sleep-and-repoll on its single processing thread. This module is the one
//! place that loop lives: a bounded retry with explicit
//! `(max_attempts, interval)` parameters and `None` as the terminal failure
//! signal.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Polling parameters
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

/// Run `attempt_fn` (which receives the zero-based attempt number) until it
/// yields `Some`, sleeping `interval` between attempts. Returns `None` once
/// the budget is exhausted.
pub async fn poll_until<T, F, Fut>(policy: RetryPolicy, mut attempt_fn: F) -> Option<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 0..policy.max_attempts {
        if let Some(value) = attempt_fn(attempt).await {
            return Some(value);
        }
        if attempt + 1 < policy.max_attempts {
            sleep(policy.interval).await;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            interval: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_succeeds_on_later_attempt() {
        let result = poll_until(fast(5), |attempt| async move {
            (attempt == 2).then_some(attempt)
        })
        .await;

        assert_eq!(result, Some(2));
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_none() {
        let mut attempts = 0u32;
        let result = poll_until(fast(4), |_| {
            attempts += 1;
            async { None::<()> }
        })
        .await;

        assert_eq!(result, None);
        assert_eq!(attempts, 4);
    }

    #[tokio::test]
    async fn test_first_attempt_success_skips_sleep() {
        let result = poll_until(fast(1), |_| async { Some(42) }).await;
        assert_eq!(result, Some(42));
    }
}
