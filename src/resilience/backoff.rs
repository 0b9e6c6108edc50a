//! Exponential backoff calculation.

use std::time::Duration;

/// Delay before the retry that follows failed attempt `attempt`.
///
/// Pure exponential: `base_ms * 2^attempt`, attempt starting at 0. No
/// jitter and no ceiling; the retry count is the only bound. Observable
/// timing is part of the retry contract, so the sequence must stay exact.
pub fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let factor = 2u64.saturating_pow(attempt);
    Duration::from_millis(base_ms.saturating_mul(factor))
}
