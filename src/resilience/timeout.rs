//! Per-attempt deadline enforcement.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped attempt did not settle before its deadline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("attempt exceeded deadline of {limit_ms} ms")]
pub struct DeadlineExceeded {
    /// The deadline that was exceeded, in milliseconds.
    pub limit_ms: u64,
}

/// Run `fut` with an upper bound on its wall-clock duration.
///
/// On expiry the future is dropped; a late result is discarded from the
/// caller's perspective. The deadline covers a single attempt, not the
/// whole retry loop.
pub async fn with_deadline<F>(limit: Duration, fut: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(output) => Ok(output),
        Err(_) => Err(DeadlineExceeded {
            limit_ms: limit.as_millis() as u64,
        }),
    }
}
