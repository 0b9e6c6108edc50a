//! Semantic configuration checks.
//!
//! Serde handles the syntactic layer; this module rejects configs that
//! parse but cannot work (unparseable base URL, zero timeouts, zero-sized
//! windows).

use crate::config::schema::BackstopConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. "backend.base_url").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &BackstopConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.backend.base_url.parse::<url::Url>() {
        errors.push(ValidationError {
            field: "backend.base_url".to_string(),
            message: format!("invalid URL: {}", e),
        });
    }

    if config.defaults.timeout_ms == 0 {
        errors.push(ValidationError {
            field: "defaults.timeout_ms".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError {
                field: "rate_limit.max_requests".to_string(),
                message: "must be greater than zero when rate limiting is enabled".to_string(),
            });
        }
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError {
                field: "rate_limit.window_secs".to_string(),
                message: "must be greater than zero when rate limiting is enabled".to_string(),
            });
        }
    }

    if config.metrics.capacity == 0 {
        errors.push(ValidationError {
            field: "metrics.capacity".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
