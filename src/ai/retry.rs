//! Exponential backoff for transient provider failures.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::debug;

/// 3 total attempts, base 1s, max 30s.
pub const MAX_ATTEMPTS: u32 = 3;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Retry an async operation while `is_transient` accepts its error.
///
/// `attempt` is called up to [`MAX_ATTEMPTS`] times. A non-transient error
/// is returned immediately; after the last attempt the final error is
/// returned unchanged.
pub async fn retry_with_backoff<T, E, Fut, F, P>(mut attempt: F, is_transient: P) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;
    loop {
        attempts += 1;

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if attempts >= MAX_ATTEMPTS || !is_transient(&e) => return Err(e),
            Err(_) => {
                if let Some(wait_duration) = backoff.next_backoff() {
                    debug!(
                        "Transient provider failure (attempt {}/{}), retrying in {:?}",
                        attempts, MAX_ATTEMPTS, wait_duration
                    );
                    tokio::time::sleep(wait_duration).await;
                }
            }
        }
    }
}
