//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every gateway call produces:
//!     → logging.rs (structured log events, gated by log_requests)
//!     → metrics.rs (one Metric record per terminal call state,
//!       unconditional)
//!
//! Consumers:
//!     → Log aggregation (stdout via tracing-subscriber)
//!     → Gateway::metrics() snapshots for diagnostics
//! ```
//!
//! # Design Decisions
//! - The metric record is the source of truth; log lines are a convenience
//! - Call IDs flow through all log events for correlation
//! - The log is bounded so a long-lived process cannot grow it unbounded

pub mod logging;
pub mod metrics;

pub use metrics::{Metric, MetricsLog, MetricsSummary};
