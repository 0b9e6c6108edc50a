//! Read-through response cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

/// A cached read payload and its creation time.
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    created_at: Instant,
}

/// A thread-safe cache of successful read payloads.
///
/// Entries are independent per key: concurrent `put` to the same key is
/// last-write-wins, and a `get` racing a `put` may see either snapshot.
/// Entries are idempotent snapshots of remote state, so neither order is
/// wrong.
#[derive(Clone, Default)]
pub struct ResponseCache {
    inner: Arc<DashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Look up `key`, treating entries aged `max_age` or more as misses.
    ///
    /// A stale entry is ignored, not removed; it stays until the next
    /// successful read overwrites it or a mutation invalidates it.
    pub fn get(&self, key: &str, max_age: Duration) -> Option<Value> {
        let entry = self.inner.get(key)?;
        if entry.created_at.elapsed() >= max_age {
            tracing::debug!(key = %key, "Cache entry stale, ignoring");
            return None;
        }
        Some(entry.payload.clone())
    }

    /// Store `payload` under `key`, overwriting any existing entry.
    pub fn put(&self, key: String, payload: Value) {
        self.inner.insert(
            key,
            CacheEntry {
                payload,
                created_at: Instant::now(),
            },
        );
    }

    /// Remove every entry whose key starts with `prefix`. Returns the
    /// number of entries removed.
    pub fn invalidate(&self, prefix: &str) -> usize {
        let before = self.inner.len();
        self.inner.retain(|key, _| !key.starts_with(prefix));
        let removed = before.saturating_sub(self.inner.len());
        if removed > 0 {
            tracing::debug!(prefix = %prefix, removed, "Invalidated cache entries");
        }
        removed
    }

    /// Drop everything.
    pub fn clear(&self) {
        let dropped = self.inner.len();
        self.inner.clear();
        tracing::debug!(dropped, "Cleared response cache");
    }

    /// Number of entries currently held, stale ones included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FRESH: Duration = Duration::from_secs(300);

    #[test]
    fn test_round_trip_and_overwrite() {
        let cache = ResponseCache::new();
        assert!(cache.get("lands:read:", FRESH).is_none());

        cache.put("lands:read:".to_string(), json!([{"id": 1}]));
        assert_eq!(cache.get("lands:read:", FRESH).unwrap(), json!([{"id": 1}]));

        cache.put("lands:read:".to_string(), json!([{"id": 2}]));
        assert_eq!(cache.get("lands:read:", FRESH).unwrap(), json!([{"id": 2}]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stale_entry_is_ignored_but_kept() {
        let cache = ResponseCache::new();
        cache.put("k".to_string(), json!(1));

        std::thread::sleep(Duration::from_millis(30));

        assert!(cache.get("k", Duration::from_millis(20)).is_none());
        // Still present, just never returned.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k", FRESH).unwrap(), json!(1));
    }

    #[test]
    fn test_invalidate_removes_only_matching_prefix() {
        let cache = ResponseCache::new();
        cache.put("lands:read:a".to_string(), json!(1));
        cache.put("lands:read:b".to_string(), json!(2));
        cache.put("users:read:a".to_string(), json!(3));

        let removed = cache.invalidate("lands:");
        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("users:read:a", FRESH).is_some());
    }

    #[test]
    fn test_clear_drops_everything() {
        let cache = ResponseCache::new();
        cache.put("a".to_string(), json!(1));
        cache.put("b".to_string(), json!(2));

        cache.clear();
        assert!(cache.is_empty());
    }
}
