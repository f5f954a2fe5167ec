//! In-memory response cache with per-entry time-to-live
//!
//! Entries are visible only while `now < expires_at`. There is no background
//! sweep: an expired entry is removed the first time it is looked up.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

/// Default TTL when the caller does not give one
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached value and the instant it stops being visible
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Keyed store of decoded responses
#[derive(Debug)]
pub struct ResponseCache<V = Value> {
    entries: HashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<V> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V> ResponseCache<V> {
    /// Creates an empty cache using `default_ttl` for [`set_default`](Self::set_default)
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Stores a value, replacing any previous value and expiry for the key
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        self.set_at(key.into(), value, ttl, Instant::now());
    }

    /// Stores a value with the default TTL
    pub fn set_default(&mut self, key: impl Into<String>, value: V) {
        let ttl = self.default_ttl;
        self.set(key, value, ttl);
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet looked up
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry, returning how many were removed
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn set_at(&mut self, key: String, value: V, ttl: Duration, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    fn purge_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before - self.entries.len()
    }
}

impl<V: Clone> ResponseCache<V> {
    /// Returns the value for `key` if it has not expired
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&mut self, key: &str, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_returns_value_strictly_before_expiry() {
        let mut cache = ResponseCache::new(DEFAULT_TTL);
        let start = Instant::now();
        cache.set_at("teams".to_string(), json!([1, 2]), Duration::from_secs(10), start);

        assert_eq!(cache.get_at("teams", start), Some(json!([1, 2])));
        assert_eq!(
            cache.get_at("teams", start + Duration::from_millis(9_999)),
            Some(json!([1, 2]))
        );
    }

    #[test]
    fn test_get_is_absent_at_expiry_and_removes_entry() {
        let mut cache = ResponseCache::new(DEFAULT_TTL);
        let start = Instant::now();
        cache.set_at("teams".to_string(), json!([1]), Duration::from_secs(10), start);

        assert_eq!(cache.get_at("teams", start + Duration::from_secs(10)), None);
        assert_eq!(cache.len(), 0, "Expired entry should be evicted on lookup");
    }

    #[test]
    fn test_get_is_absent_after_expiry() {
        let mut cache = ResponseCache::new(DEFAULT_TTL);
        let start = Instant::now();
        cache.set_at("k".to_string(), json!(1), Duration::from_secs(1), start);

        assert_eq!(cache.get_at("k", start + Duration::from_secs(60)), None);
    }

    #[test]
    fn test_set_replaces_value_and_expiry() {
        let mut cache = ResponseCache::new(DEFAULT_TTL);
        let start = Instant::now();
        cache.set_at("k".to_string(), json!("old"), Duration::from_secs(1), start);
        cache.set_at("k".to_string(), json!("new"), Duration::from_secs(100), start);

        assert_eq!(cache.len(), 1);
        // The first expiry no longer applies
        assert_eq!(
            cache.get_at("k", start + Duration::from_secs(50)),
            Some(json!("new"))
        );
    }

    #[test]
    fn test_set_can_shorten_expiry() {
        let mut cache = ResponseCache::new(DEFAULT_TTL);
        let start = Instant::now();
        cache.set_at("k".to_string(), json!(1), Duration::from_secs(100), start);
        cache.set_at("k".to_string(), json!(2), Duration::from_secs(1), start);

        assert_eq!(cache.get_at("k", start + Duration::from_secs(2)), None);
    }

    #[test]
    fn test_zero_ttl_is_never_visible() {
        let mut cache = ResponseCache::new(DEFAULT_TTL);
        let start = Instant::now();
        cache.set_at("k".to_string(), json!(1), Duration::ZERO, start);
        assert_eq!(cache.get_at("k", start), None);
    }

    #[test]
    fn test_missing_key_is_absent() {
        let mut cache: ResponseCache = ResponseCache::default();
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn test_set_default_uses_configured_ttl() {
        let mut cache = ResponseCache::new(Duration::from_secs(60));
        cache.set_default("k", json!(true));

        assert_eq!(cache.default_ttl(), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!(true)));
    }

    #[test]
    fn test_delete_and_clear() {
        let mut cache = ResponseCache::new(DEFAULT_TTL);
        cache.set("a", json!(1), Duration::from_secs(60));
        cache.set("b", json!(2), Duration::from_secs(60));

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(json!(2)));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired_only_removes_stale_entries() {
        let mut cache = ResponseCache::new(DEFAULT_TTL);
        let start = Instant::now();
        cache.set_at("short".to_string(), json!(1), Duration::from_secs(1), start);
        cache.set_at("long".to_string(), json!(2), Duration::from_secs(100), start);

        let removed = cache.purge_expired_at(start + Duration::from_secs(5));

        assert_eq!(removed, 1);
        assert_eq!(cache.get_at("long", start + Duration::from_secs(5)), Some(json!(2)));
    }
}
