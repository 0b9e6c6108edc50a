//! Backstop — resilient data access for hosted backends.
//!
//! A middleware layer between application code and a remote database/auth
//! service, adding cross-cutting reliability uniformly across CRUD and
//! auth operations.
//!
//! # Architecture Overview
//!
//! ```text
//! Caller ──▶ gateway ──▶ ratelimit ──▶ cache ──▶ resilience ──▶ backend ──▶ remote
//!               │         (admission)   (reads)   (retry+timeout)  (HTTP)
//!               │
//!               └──▶ observability (metrics log + structured logs)
//! ```
//!
//! Every call returns the uniform [`Outcome`] envelope; nothing escapes
//! the gateway boundary as an error.

// Core subsystems
pub mod backend;
pub mod config;
pub mod gateway;

// Cross-cutting concerns
pub mod cache;
pub mod observability;
pub mod ratelimit;
pub mod resilience;

pub use backend::{BackendClient, Credentials, Filter, Session};
pub use config::{BackstopConfig, CallConfig, CallOverrides};
pub use gateway::{Gateway, OpKind, Outcome, OutcomeStatus};
pub use observability::{Metric, MetricsSummary};
