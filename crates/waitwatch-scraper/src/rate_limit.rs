//! Retry and pacing utilities for the collectors.
//!
//! [`retry_with_backoff`] retries transient HTTP failures with exponential
//! backoff. [`politeness_delay`] spaces out successive targets in a batch
//! with a randomized pause so requests neither hammer the source nor arrive
//! on a fixed beat.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use waitwatch_core::DelayWindow;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::Http`]: network-level failure (connection reset, timeout, etc.).
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (404, other 4xx, parse and selector failures) would fail
/// the same way again and is returned immediately.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts after the
/// first try. If all retries are exhausted the last error is returned.
///
/// With `max_retries = 2` the operation is attempted at most 3 times total.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient fetch error; retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

/// Draw a pause length uniformly from `window`.
pub(crate) fn sample_delay(window: DelayWindow) -> Duration {
    let secs = if window.max_secs > window.min_secs {
        rand::rng().random_range(window.min_secs..=window.max_secs)
    } else {
        window.min_secs
    };
    Duration::from_secs_f64(secs.max(0.0))
}

/// Sleep for a random duration within `window` before the next target.
pub async fn politeness_delay(window: DelayWindow) {
    let delay = sample_delay(window);
    tracing::debug!(delay_ms = delay.as_millis(), "pausing before next target");
    tokio::time::sleep(delay).await;
}
