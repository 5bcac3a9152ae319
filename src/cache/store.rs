// In-memory response cache.
// Maps endpoint keys to the last successful JSON payload and judges freshness against a TTL.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Freshness of one cache key, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never fetched successfully.
    Empty,
    /// A request for the key is in flight.
    Fetching,
    /// Younger than the TTL; served without a network call.
    Fresh,
    /// Older than the TTL or invalidated; only served when a fetch fails.
    Stale,
}

/// The last successful payload for one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Value,
    pub fetched_at: DateTime<Utc>,
    /// Set by `invalidate`; the payload stays usable as a fallback.
    #[serde(default)]
    pub invalidated: bool,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, payload: Value, fetched_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            payload,
            fetched_at,
            invalidated: false,
        }
    }

    /// Fresh while `now - fetched_at < ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if self.invalidated {
            return false;
        }

        // An entry stamped in the future (clock skew) counts as just fetched.
        let elapsed = now
            .signed_duration_since(self.fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO);

        elapsed < ttl
    }
}

/// Wrapper for persisted data with a save timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T, cached_at: DateTime<Utc>) -> Self {
        Self { data, cached_at }
    }
}

/// Key to entry map with a fixed TTL.
///
/// Entries are never removed; `set` overwrites and `invalidate` only
/// marks an entry stale. The key space is a handful of endpoints per
/// user, so there is no size bound.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Entry for `key` regardless of age.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Entry for `key` only if it is still fresh at `now`.
    pub fn get_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<&CacheEntry> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
    }

    /// Store `payload` under `key`, replacing any previous entry.
    pub fn set(&mut self, key: &str, payload: Value, now: DateTime<Utc>) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(key, payload, now));
    }

    /// Mark `key` stale. Returns false if there was nothing to invalidate.
    pub fn invalidate(&mut self, key: &str) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }

    /// Empty, Fresh, or Stale; `Fetching` is tracked by the client.
    pub fn state(&self, key: &str, now: DateTime<Utc>) -> CacheState {
        match self.entries.get(key) {
            None => CacheState::Empty,
            Some(entry) if entry.is_fresh(now, self.ttl) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    /// All entries, sorted by key so snapshots are stable on disk.
    pub fn entries(&self) -> Vec<CacheEntry> {
        let mut entries: Vec<CacheEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Load previously persisted entries, keeping their original timestamps.
    /// An existing entry wins over an older restored one.
    pub fn restore(&mut self, entries: Vec<CacheEntry>) {
        for entry in entries {
            let newer = self
                .entries
                .get(&entry.key)
                .is_none_or(|existing| existing.fetched_at < entry.fetched_at);
            if newer {
                self.entries.insert(entry.key.clone(), entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(600);

    fn t0() -> DateTime<Utc> {
        "2024-05-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_fresh_within_ttl() {
        let mut cache = MemoryCache::new(TTL);
        cache.set("/users/octocat", json!({"login": "octocat"}), t0());

        let later = t0() + chrono::Duration::seconds(300);
        assert!(cache.get_fresh("/users/octocat", later).is_some());
        assert_eq!(cache.state("/users/octocat", later), CacheState::Fresh);
    }

    #[test]
    fn test_stale_after_ttl() {
        let mut cache = MemoryCache::new(TTL);
        cache.set("/users/octocat", json!({"login": "octocat"}), t0());

        let later = t0() + chrono::Duration::seconds(700);
        assert!(cache.get_fresh("/users/octocat", later).is_none());
        assert!(cache.get("/users/octocat").is_some());
        assert_eq!(cache.state("/users/octocat", later), CacheState::Stale);
    }

    #[test]
    fn test_exactly_ttl_is_stale() {
        let entry = CacheEntry::new("k", json!(1), t0());
        assert!(!entry.is_fresh(t0() + chrono::Duration::seconds(600), TTL));
        assert!(entry.is_fresh(t0() + chrono::Duration::seconds(599), TTL));
    }

    #[test]
    fn test_set_overwrites() {
        let mut cache = MemoryCache::new(TTL);
        cache.set("k", json!(1), t0());
        cache.set("k", json!(2), t0() + chrono::Duration::seconds(10));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().payload, json!(2));
    }

    #[test]
    fn test_invalidate_keeps_payload() {
        let mut cache = MemoryCache::new(TTL);
        assert!(!cache.invalidate("k"));

        cache.set("k", json!(1), t0());
        assert!(cache.invalidate("k"));
        assert!(cache.get_fresh("k", t0()).is_none());
        assert_eq!(cache.get("k").unwrap().payload, json!(1));
        assert_eq!(cache.state("k", t0()), CacheState::Stale);

        // A later set makes it fresh again.
        cache.set("k", json!(3), t0());
        assert_eq!(cache.state("k", t0()), CacheState::Fresh);
    }

    #[test]
    fn test_empty_state() {
        let cache = MemoryCache::new(TTL);
        assert!(cache.is_empty());
        assert_eq!(cache.state("missing", t0()), CacheState::Empty);
    }

    #[test]
    fn test_restore_prefers_newer() {
        let mut cache = MemoryCache::new(TTL);
        cache.set("a", json!("live"), t0());

        cache.restore(vec![
            CacheEntry::new("a", json!("old"), t0() - chrono::Duration::seconds(60)),
            CacheEntry::new("b", json!("disk"), t0() - chrono::Duration::seconds(60)),
        ]);

        assert_eq!(cache.get("a").unwrap().payload, json!("live"));
        assert_eq!(cache.get("b").unwrap().payload, json!("disk"));
        assert_eq!(
            cache.entries().iter().map(|e| e.key.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }
}
