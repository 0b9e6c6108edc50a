//! Cache key fingerprinting.

use crate::backend::query::Filter;
use crate::gateway::types::OpKind;

/// Deterministic cache key for `(resource, operation, filter)`.
///
/// Filter fields render in canonical (sorted) order, so two filters built
/// with the same pairs in different insertion order produce the same key.
pub fn fingerprint(resource: &str, kind: OpKind, filter: &Filter) -> String {
    format!("{}:{}:{}", resource, kind.as_str(), filter.canonical())
}

/// Prefix matching every cached operation for `resource`.
pub fn resource_prefix(resource: &str) -> String {
    format!("{}:", resource)
}
