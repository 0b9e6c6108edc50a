//! Operation gateway subsystem.
//!
//! # Data Flow
//! ```text
//! Caller
//!     → client.rs (typed operation)
//!         → ratelimit (admission gate, CRUD only)
//!         → cache (lookup for reads)
//!         → resilience (retry loop, per-attempt deadline)
//!             → backend (network call)
//!         → observability (one metric per terminal state)
//!         → cache (populate on read success, invalidate on mutation)
//!     ← types.rs Outcome envelope
//! ```

pub mod client;
pub mod types;

pub use client::Gateway;
pub use types::{OpKind, Outcome, OutcomeStatus};
