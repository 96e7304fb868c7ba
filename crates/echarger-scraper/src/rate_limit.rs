//! Retry with exponential backoff for transient OpenChargeMap failures.
//!
//! A 429 or a network-level error is worth another attempt; a bad status,
//! a 404, or a body that does not parse is returned straight away.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::RateLimited { .. } | ScraperError::Http(_)
    )
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt` seconds,
/// saturating on overflow.
fn backoff_delay_secs(backoff_base_secs: u64, attempt: u32) -> u64 {
    backoff_base_secs.saturating_mul(1u64 << attempt.min(62))
}

/// Runs `operation`, retrying transient errors up to `max_retries` extra
/// times. With `max_retries = 3` the operation runs at most 4 times.
///
/// When retries run out, the last error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_secs = backoff_delay_secs(backoff_base_secs, attempt);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient OpenChargeMap error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
