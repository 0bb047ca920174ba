//! Key/value cache store with per-entry TTL.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

/// Longest lifetime an entry is kept for; longer TTLs are clamped to it.
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A shared cache keyed by string. Implementations must make each call atomic.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value, ttl: Duration);
    fn delete(&self, key: &str);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Process-local cache backed by a concurrent map.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let expired = match self.inner.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.inner.remove_if(key, |_, entry| entry.expires_at <= Instant::now());
        }
        None
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        let Some(expires_at) = now.checked_add(ttl.min(MAX_CACHE_TTL)) else {
            tracing::warn!(key, ttl_secs = ttl.as_secs(), "Cache TTL out of range, entry not stored");
            return;
        };
        self.inner.insert(key.to_string(), CacheEntry { value, expires_at });
    }

    fn delete(&self, key: &str) {
        self.inner.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_operations() {
        let cache = MemoryCache::new();
        assert!(cache.get("k").is_none());

        cache.set("k", json!([1, 2]), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!([1, 2])));

        cache.delete("k");
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let cache = MemoryCache::new();
        cache.set("k", json!("v"), Duration::from_secs(u64::MAX));
        assert_eq!(cache.get("k"), Some(json!("v")));
        cache.set("k", json!("w"), Duration::MAX);
        assert_eq!(cache.get("k"), Some(json!("w")));
    }

    #[test]
    fn test_expiry() {
        let cache = MemoryCache::new();
        cache.set("k", json!("v"), Duration::from_millis(20));
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
    }
}
