//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the data
//! access layer. All types derive Serde traits for deserialization from
//! config files, and every field has a default so a minimal config works.

use serde::{Deserialize, Serialize};

/// Root configuration for the data-access layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BackstopConfig {
    /// Remote backend connection settings.
    pub backend: BackendConfig,

    /// Default per-call behavior (overridable per call).
    pub defaults: CallConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Metrics recorder settings.
    pub metrics: MetricsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote backend connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the hosted backend (REST and auth endpoints live under it).
    pub base_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

/// Per-call behavior knobs.
///
/// These are the gateway defaults; any of them can be overridden for a
/// single call via [`CallOverrides`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CallConfig {
    /// Emit a diagnostic log line per call. The metric record is appended
    /// regardless of this flag.
    pub log_requests: bool,

    /// Enable the retry loop. When false a call makes exactly one attempt.
    pub enable_retry: bool,

    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Per-attempt deadline in milliseconds.
    pub timeout_ms: u64,

    /// Serve reads through the response cache.
    pub cache: bool,

    /// Age in milliseconds after which a cache entry is ignored.
    pub cache_duration_ms: u64,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            log_requests: true,
            enable_retry: true,
            max_retries: 3,
            base_delay_ms: 1000,
            timeout_ms: 30_000,
            cache: true,
            cache_duration_ms: 300_000,
        }
    }
}

/// Per-call overrides applied on top of [`CallConfig`].
///
/// `None` fields inherit the gateway default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CallOverrides {
    pub log_requests: Option<bool>,
    pub enable_retry: Option<bool>,
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub cache: Option<bool>,
    pub cache_duration_ms: Option<u64>,
}

impl CallOverrides {
    /// Merge these overrides over a base config, producing the effective
    /// per-call configuration.
    pub fn apply(&self, base: &CallConfig) -> CallConfig {
        CallConfig {
            log_requests: self.log_requests.unwrap_or(base.log_requests),
            enable_retry: self.enable_retry.unwrap_or(base.enable_retry),
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            base_delay_ms: self.base_delay_ms.unwrap_or(base.base_delay_ms),
            timeout_ms: self.timeout_ms.unwrap_or(base.timeout_ms),
            cache: self.cache.unwrap_or(base.cache),
            cache_duration_ms: self.cache_duration_ms.unwrap_or(base.cache_duration_ms),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable admission control.
    pub enabled: bool,

    /// Maximum admissions per key within the trailing window.
    pub max_requests: u32,

    /// Window duration in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 60,
        }
    }
}

/// Metrics recorder settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Maximum retained metric records; oldest are evicted past this.
    pub capacity: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
