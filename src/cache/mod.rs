//! Response caching subsystem.
//!
//! # Data Flow
//! ```text
//! Read call:
//!     → fingerprint.rs (canonical key from resource + op + filter)
//!     → store.rs get (staleness checked at read time)
//!     → on miss: network read, then store.rs put
//!
//! Mutation call:
//!     → store.rs invalidate(resource prefix) once the final outcome
//!       is known, success or not
//! Sign-out:
//!     → store.rs clear
//! ```
//!
//! # Design Decisions
//! - Staleness is enforced lazily at read time; no eviction task
//! - Keys are canonical in filter-field order, so semantically identical
//!   filters share an entry

pub mod fingerprint;
pub mod store;

pub use fingerprint::{fingerprint, resource_prefix};
pub use store::ResponseCache;
