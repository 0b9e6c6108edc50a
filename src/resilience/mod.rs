//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway call to backend:
//!     → retry.rs (drive attempts, back off between failures)
//!         → timeout.rs (deadline on each individual attempt)
//!             → network call
//! ```
//!
//! # Design Decisions
//! - Every attempt has a deadline; a hung backend never hangs a call
//! - Backoff is pure exponential with no jitter and no ceiling — the
//!   delay sequence is an observable contract
//! - Retry is failure-cause-agnostic; timeouts and application errors
//!   funnel through identically

pub mod backoff;
pub mod retry;
pub mod timeout;

pub use backoff::backoff_delay;
pub use retry::with_retry;
pub use timeout::{with_deadline, DeadlineExceeded};
