//! Admission control subsystem.
//!
//! # Design Decisions
//! - Sliding window of timestamps per (resource, operation) key, pruned
//!   lazily at check time
//! - Denial is terminal for the call: no retry, no network round-trip
//! - Fast-fail guard, not a queue — denied callers get an error outcome
//!   immediately

pub mod window;

pub use window::RateLimiter;
