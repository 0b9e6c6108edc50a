//! Bounded append-only log of call outcomes.
//!
//! # Responsibilities
//! - Record one event per terminal call state (success, error, timeout,
//!   retry exhaustion)
//! - Retain the most recent events up to a fixed capacity
//! - Hand out immutable snapshots for diagnostics
//!
//! # Design Decisions
//! - Raw event log only; no aggregation or statistics kept here
//! - Eviction is count-based (oldest dropped past capacity), not time-based
//! - Append is one atomic mutation of the sequence, so concurrent calls
//!   never lose records

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::gateway::types::{OpKind, OutcomeStatus};

/// A single recorded call outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    /// Operation kind.
    pub kind: OpKind,
    /// Resource the call targeted ("auth" for auth operations).
    pub resource: String,
    /// Wall-clock time of the record (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Total call duration in milliseconds, backoff delays included.
    pub duration_ms: u64,
    /// Terminal status of the call.
    pub status: OutcomeStatus,
    /// Last underlying error message, if any.
    pub error: Option<String>,
}

/// Per-status counts derived from the current log contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total: usize,
    pub success: usize,
    pub error: usize,
    pub timeout: usize,
    pub retry_exhausted: usize,
}

/// Thread-safe bounded metrics log.
pub struct MetricsLog {
    inner: Mutex<VecDeque<Metric>>,
    capacity: usize,
}

impl MetricsLog {
    /// Create an empty log retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Append one record, evicting the oldest if the log is full.
    pub fn record(
        &self,
        kind: OpKind,
        resource: &str,
        duration: Duration,
        status: OutcomeStatus,
        error: Option<String>,
    ) {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let metric = Metric {
            kind,
            resource: resource.to_string(),
            timestamp_ms,
            duration_ms: duration.as_millis() as u64,
            status,
            error,
        };

        let mut log = self.inner.lock().expect("metrics log mutex poisoned");
        if log.len() >= self.capacity {
            log.pop_front();
        }
        log.push_back(metric);
    }

    /// Immutable copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Metric> {
        let log = self.inner.lock().expect("metrics log mutex poisoned");
        log.iter().cloned().collect()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("metrics log mutex poisoned").len()
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-status counts over the retained records.
    pub fn summary(&self) -> MetricsSummary {
        let log = self.inner.lock().expect("metrics log mutex poisoned");
        let mut summary = MetricsSummary {
            total: log.len(),
            ..Default::default()
        };
        for metric in log.iter() {
            match metric.status {
                OutcomeStatus::Success => summary.success += 1,
                OutcomeStatus::Error => summary.error += 1,
                OutcomeStatus::Timeout => summary.timeout += 1,
                OutcomeStatus::RetryExhausted => summary.retry_exhausted += 1,
            }
        }
        summary
    }
}
