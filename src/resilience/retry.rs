//! Retry driver with exponential backoff.
//!
//! # Responsibilities
//! - Run an attempt function up to `max_retries + 1` times
//! - Sleep the backoff delay between attempts
//! - Report how many retries were used alongside the result
//!
//! # Design Decisions
//! - Cause-agnostic: application errors and timeouts retry identically
//! - The last failure is returned verbatim; classification happens at the
//!   gateway boundary

use std::future::Future;

use tokio::time::sleep;

use crate::resilience::backoff::backoff_delay;

/// Run `attempt` until it succeeds or `max_retries` retries are spent.
///
/// The attempt function receives the zero-based attempt index. Returns the
/// final result together with the number of retries used: the index of the
/// successful attempt, or `max_retries` when every attempt failed.
pub async fn with_retry<T, E, F, Fut>(
    max_retries: u32,
    base_delay_ms: u64,
    mut attempt: F,
) -> (Result<T, E>, u32)
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut index = 0;
    loop {
        match attempt(index).await {
            Ok(value) => return (Ok(value), index),
            Err(e) => {
                if index >= max_retries {
                    return (Err(e), index);
                }
                let delay = backoff_delay(index, base_delay_ms);
                tracing::debug!(
                    attempt = index,
                    delay_ms = delay.as_millis() as u64,
                    "Attempt failed, backing off"
                );
                sleep(delay).await;
                index += 1;
            }
        }
    }
}
