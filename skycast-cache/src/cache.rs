//! In-memory TTL cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default TTL in seconds (15 minutes).
const DEFAULT_TTL_SECONDS: u64 = 900;

/// Default sweep interval in seconds.
const DEFAULT_CLEANUP_INTERVAL_SECONDS: u64 = 300;

/// Cache entry with TTL.
///
/// Replaced as a whole on every `set`, so readers never see the creation
/// time of one write paired with the TTL of another.
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    /// Strictly past `created_at + ttl`. The one expiry predicate every
    /// operation uses.
    fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }

    fn remaining_at(&self, now: Instant) -> Duration {
        self.ttl
            .saturating_sub(now.saturating_duration_since(self.created_at))
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL applied by [`TtlCache::set`], in seconds
    pub default_ttl_seconds: u64,
    /// Period of the background sweep in seconds (0 disables it)
    pub cleanup_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            cleanup_interval_seconds: DEFAULT_CLEANUP_INTERVAL_SECONDS,
        }
    }
}

impl CacheConfig {
    /// Sweep interval, or `None` when the sweep is disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_seconds > 0)
            .then(|| Duration::from_secs(self.cleanup_interval_seconds))
    }
}

/// Point-in-time view of the cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries physically stored, including expired ones not yet swept
    pub total_entries: usize,
    /// Entries still live at snapshot time
    pub active_entries: usize,
    /// Entries expired but still stored
    pub expired_entries: usize,
    /// Every stored key, sorted, regardless of expiry
    pub cache_keys: Vec<String>,
}

/// In-memory key/value cache with per-entry expiry.
///
/// Thread-safe: one lock guards the whole map. Operations that may remove
/// entries (including [`get`](Self::get)) take it exclusively; pure
/// inspection shares it. No operation calls another while holding the lock.
///
/// Values go in and come out by value (`V: Clone`), so callers can never
/// mutate what is stored.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    config: CacheConfig,
}

impl<V: Clone> TtlCache<V> {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Returns the configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// TTL used by [`set`](Self::set).
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.config.default_ttl_seconds)
    }

    /// Gets a cached value.
    ///
    /// Returns `None` if the key was never set or has expired. An expired
    /// entry is removed on the way out.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.write();
        let now = Instant::now();

        let expired = entries.get(key)?.is_expired_at(now);
        if expired {
            entries.remove(key);
            debug!(key, "Cache entry expired");
            return None;
        }

        debug!(key, "Cache hit");
        entries.get(key).map(|e| e.value.clone())
    }

    /// Caches a value with the default TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl());
    }

    /// Caches a value with a custom TTL, replacing any existing entry.
    ///
    /// A zero TTL stores an entry that is already stale for every later read.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set");
        self.entries.write().insert(key, CacheEntry::new(value, ttl));
    }

    /// Removes an entry. Returns true only if it was still live.
    ///
    /// An expired entry is dropped as well but reported as absent.
    pub fn delete(&self, key: &str) -> bool {
        let now = Instant::now();
        let removed = self.entries.write().remove(key);
        let was_live = removed.map_or(false, |e| !e.is_expired_at(now));
        if was_live {
            debug!(key, "Cache deleted");
        }
        was_live
    }

    /// Clears all cached entries. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        info!(count, "Cache cleared");
        count
    }

    /// Removes all entries expired as of the start of the scan.
    ///
    /// Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write();
        if entries.is_empty() {
            return 0;
        }

        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            info!(removed, "Cache cleanup removed expired entries");
        }
        removed
    }

    /// Returns true if `key` holds a live entry.
    ///
    /// Same semantics as `get(key).is_some()`, including removal of an
    /// expired entry, without cloning the value.
    pub fn has_key(&self, key: &str) -> bool {
        let mut entries = self.entries.write();
        let now = Instant::now();

        match entries.get(key) {
            None => false,
            Some(e) if e.is_expired_at(now) => {
                entries.remove(key);
                debug!(key, "Cache entry expired");
                false
            }
            Some(_) => true,
        }
    }

    /// Whole seconds until `key` expires.
    ///
    /// An expired but unswept entry reports `Some(0)` and is left in place.
    /// Returns `None` only when nothing is stored under `key`.
    pub fn get_remaining_ttl(&self, key: &str) -> Option<u64> {
        let entries = self.entries.read();
        let now = Instant::now();

        entries.get(key).map(|e| {
            if e.is_expired_at(now) {
                0
            } else {
                e.remaining_at(now).as_secs()
            }
        })
    }

    /// Returns cache statistics. Does not evict anything.
    pub fn get_stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let now = Instant::now();

        let expired = entries.values().filter(|e| e.is_expired_at(now)).count();
        let mut cache_keys: Vec<String> = entries.keys().cloned().collect();
        cache_keys.sort_unstable();

        CacheStats {
            total_entries: entries.len(),
            active_entries: entries.len() - expired,
            expired_entries: expired,
            cache_keys,
        }
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.read().len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Clone, Debug, PartialEq)]
    struct Reading {
        city: String,
        temperature: i32,
    }

    fn reading(city: &str, temperature: i32) -> Reading {
        Reading {
            city: city.to_string(),
            temperature,
        }
    }

    #[test]
    fn test_cache_miss() {
        let cache: TtlCache<Reading> = TtlCache::new();
        assert!(cache.get("atlantis_metric").is_none());
        assert!(!cache.has_key("atlantis_metric"));
    }

    #[test]
    fn test_cache_set_get() {
        let cache = TtlCache::new();
        let value = reading("london", 18);

        cache.set_with_ttl("london_metric", value.clone(), Duration::from_secs(60));

        assert_eq!(cache.get("london_metric"), Some(value));
        assert!(cache.has_key("london_metric"));
    }

    #[test]
    fn test_default_ttl_is_fifteen_minutes() {
        let cache: TtlCache<Reading> = TtlCache::new();
        assert_eq!(cache.default_ttl(), Duration::from_secs(900));

        cache.set("paris_metric", reading("paris", 16));
        let remaining = cache.get_remaining_ttl("paris_metric").unwrap();
        assert!((899..=900).contains(&remaining));
    }

    #[test]
    fn test_cache_ttl_expiration() {
        let cache = TtlCache::new();
        cache.set_with_ttl("tokyo_metric", reading("tokyo", 25), Duration::from_millis(50));
        assert!(cache.get("tokyo_metric").is_some());

        thread::sleep(Duration::from_millis(80));

        assert!(cache.get("tokyo_metric").is_none());
        // Passive eviction removed it physically
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_has_key_evicts_expired_entry() {
        let cache = TtlCache::new();
        cache.set_with_ttl("oslo_metric", reading("oslo", 3), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(30));

        assert!(!cache.has_key("oslo_metric"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_is_stale_on_next_read() {
        let cache = TtlCache::new();
        cache.set_with_ttl("rome_metric", reading("rome", 24), Duration::ZERO);
        thread::sleep(Duration::from_millis(2));
        assert!(cache.get("rome_metric").is_none());
    }

    #[test]
    fn test_cache_delete_exactly_once() {
        let cache = TtlCache::new();
        cache.set("berlin_metric", reading("berlin", 14));

        assert!(cache.delete("berlin_metric"));
        assert!(!cache.delete("berlin_metric"));
        assert!(!cache.delete("never_set"));
        assert!(cache.get("berlin_metric").is_none());
    }

    #[test]
    fn test_delete_expired_entry_returns_false() {
        let cache = TtlCache::new();
        cache.set_with_ttl("oslo_metric", reading("oslo", 3), Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.get_stats().active_entries, 0);
        assert!(!cache.delete("oslo_metric"));
        // Still removed physically
        assert_eq!(cache.get_stats().total_entries, 0);
    }

    #[test]
    fn test_cache_clear() {
        let cache = TtlCache::new();
        cache.set("alpha", reading("a", 1));
        cache.set("beta", reading("b", 2));

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.get_stats().total_entries, 0);
    }

    #[test]
    fn test_cache_stats() {
        let cache = TtlCache::new();
        let empty = cache.get_stats();
        assert_eq!(empty.total_entries, 0);
        assert_eq!(empty.active_entries, 0);

        cache.set("test1", reading("x", 1));
        cache.set("test2", reading("y", 2));

        let stats = cache.get_stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.active_entries, 2);
        assert_eq!(stats.expired_entries, 0);
        assert_eq!(stats.cache_keys, vec!["test1".to_string(), "test2".to_string()]);
    }

    #[test]
    fn test_stats_counts_expired_without_evicting() {
        let cache = TtlCache::new();
        cache.set_with_ttl("stale", reading("s", 0), Duration::from_millis(10));
        cache.set("fresh", reading("f", 0));
        thread::sleep(Duration::from_millis(30));

        let stats = cache.get_stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.active_entries, 1);
        assert!(stats.cache_keys.contains(&"stale".to_string()));

        // Still physically present after the snapshot
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_cleanup_expired() {
        let cache = TtlCache::new();
        cache.set_with_ttl("gone1", reading("g", 1), Duration::from_millis(10));
        cache.set_with_ttl("gone2", reading("g", 2), Duration::from_millis(10));
        cache.set("kept", reading("k", 3));
        thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("kept"), Some(reading("k", 3)));

        // Nothing left to sweep
        assert_eq!(cache.cleanup_expired(), 0);
    }

    #[test]
    fn test_cleanup_on_empty_cache() {
        let cache: TtlCache<Reading> = TtlCache::new();
        assert_eq!(cache.cleanup_expired(), 0);
    }

    #[test]
    fn test_remaining_ttl() {
        let cache = TtlCache::new();
        cache.set_with_ttl("sydney_metric", reading("sydney", 28), Duration::from_secs(60));

        let remaining = cache.get_remaining_ttl("sydney_metric").unwrap();
        assert!((59..=60).contains(&remaining), "got {}", remaining);
        assert_eq!(cache.get_remaining_ttl("never_set"), None);
    }

    #[test]
    fn test_remaining_ttl_reports_zero_for_unswept_entry() {
        let cache = TtlCache::new();
        cache.set_with_ttl("mumbai_metric", reading("mumbai", 32), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.get_remaining_ttl("mumbai_metric"), Some(0));
        // Reporting does not evict
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reset_replaces_ttl() {
        let cache = TtlCache::new();
        cache.set_with_ttl("moscow_metric", reading("moscow", -5), Duration::from_millis(20));
        cache.set_with_ttl("moscow_metric", reading("moscow", -4), Duration::from_secs(900));
        thread::sleep(Duration::from_millis(50));

        assert_eq!(cache.get("moscow_metric"), Some(reading("moscow", -4)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reset_can_shorten_ttl() {
        let cache = TtlCache::new();
        cache.set_with_ttl("lima_metric", reading("lima", 19), Duration::from_secs(900));
        cache.set_with_ttl("lima_metric", reading("lima", 20), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(30));

        assert!(cache.get("lima_metric").is_none());
    }

    #[test]
    fn test_returned_value_is_detached() {
        let cache = TtlCache::new();
        cache.set("cairo_metric", reading("cairo", 35));

        let mut copy = cache.get("cairo_metric").unwrap();
        copy.temperature = -100;

        assert_eq!(cache.get("cairo_metric").unwrap().temperature, 35);
    }

    #[test]
    fn test_concurrent_same_key_sets_never_tear() {
        let cache = Arc::new(TtlCache::new());
        cache.set("unrelated", reading("unrelated", 0));

        for _ in 0..50 {
            thread::scope(|s| {
                let c1 = Arc::clone(&cache);
                let c2 = Arc::clone(&cache);
                s.spawn(move || c1.set("shared", reading("first", 1)));
                s.spawn(move || c2.set("shared", reading("second", 2)));
            });

            let value = cache.get("shared").unwrap();
            assert!(
                value == reading("first", 1) || value == reading("second", 2),
                "torn value: {:?}",
                value
            );
        }

        assert_eq!(cache.get("unrelated"), Some(reading("unrelated", 0)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_writers_lose_no_keys() {
        let cache = Arc::new(TtlCache::new());

        thread::scope(|s| {
            for t in 0..8 {
                let cache = Arc::clone(&cache);
                s.spawn(move || {
                    for i in 0..100 {
                        let key = format!("city{}_{}", t, i);
                        cache.set(key.clone(), reading(&key, i));
                        assert!(cache.has_key(&key));
                        cache.cleanup_expired();
                        cache.get_stats();
                    }
                });
            }
        });

        assert_eq!(cache.len(), 800);
        assert_eq!(cache.get_stats().active_entries, 800);
    }

    #[test]
    fn test_stats_serialize() {
        let cache = TtlCache::new();
        cache.set("k", reading("k", 1));
        let json = serde_json::to_value(cache.get_stats()).unwrap();
        assert_eq!(json["total_entries"], 1);
        assert_eq!(json["cache_keys"][0], "k");
    }

    #[test]
    fn test_cleanup_interval_config() {
        assert_eq!(
            CacheConfig::default().cleanup_interval(),
            Some(Duration::from_secs(300))
        );
        let disabled = CacheConfig {
            cleanup_interval_seconds: 0,
            ..Default::default()
        };
        assert_eq!(disabled.cleanup_interval(), None);
    }
}
