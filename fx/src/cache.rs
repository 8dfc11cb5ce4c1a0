//! Time-boxed key/value cache.
//!
//! Values of any type live side by side under string keys. Expiry is checked
//! on read; there is no background sweep.

use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use ratewarden_common::{constants, limits};

/// Cached value entry.
#[derive(Clone)]
struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new<T: Send + Sync + 'static>(value: T, ttl: Duration) -> Self {
        Self {
            value: Arc::new(value),
            inserted_at: Instant::now(),
            ttl,
        }
    }

    fn is_valid(&self) -> bool {
        self.inserted_at.elapsed() < self.ttl
    }
}

/// Configuration for the cache store.
#[derive(Debug, Clone)]
pub struct CacheStoreConfig {
    /// TTL used by [`CacheStore::insert`].
    pub default_ttl: Duration,
    /// Entry count at which expired entries are swept on insert.
    pub max_entries: usize,
}

impl Default for CacheStoreConfig {
    fn default() -> Self {
        Self {
            default_ttl: constants::cache_ttl(),
            max_entries: limits::CACHE_MAX_ENTRIES,
        }
    }
}

/// Thread-safe cache with per-entry TTL.
///
/// Each write publishes a whole entry, so a concurrent reader sees either
/// the old value or the new one.
pub struct CacheStore {
    entries: DashMap<String, CacheEntry>,
    config: CacheStoreConfig,
}

impl CacheStore {
    /// Create a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheStoreConfig::default())
    }

    /// Create a new cache with custom configuration.
    pub fn with_config(config: CacheStoreConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    /// Get a live value of type `T`.
    ///
    /// Returns `None` when the key was never set, has expired, or holds a
    /// value of another type.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_valid() {
                return match entry.value.downcast_ref::<T>() {
                    Some(value) => {
                        debug!(key, "Cache hit");
                        Some(value.clone())
                    }
                    None => {
                        warn!(key, "Cached value has a different type");
                        None
                    }
                };
            }

            debug!(key, "Cache entry expired");
            drop(entry);
            // A fresh value written since the check above must survive.
            self.entries.remove_if(key, |_, entry| !entry.is_valid());
            return None;
        }

        debug!(key, "Cache miss");
        None
    }

    /// Store a value with an explicit TTL, replacing any previous entry.
    pub fn set<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T, ttl: Duration) {
        if self.entries.len() >= self.config.max_entries {
            self.evict_expired();
        }

        self.entries.insert(key.into(), CacheEntry::new(value, ttl));
    }

    /// Store a value with the default TTL.
    pub fn insert<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) {
        self.set(key, value, self.config.default_ttl);
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Clear all cached values.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get the number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict expired entries.
    pub fn evict_expired(&self) {
        self.entries.retain(|_, entry| entry.is_valid());
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.entries.len();
        let valid = self.entries.iter().filter(|e| e.is_valid()).count();

        CacheStats {
            total_entries: total,
            valid_entries: valid,
            expired_entries: total.saturating_sub(valid),
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

/// Process-wide cache handle.
pub type SharedCacheStore = Arc<CacheStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use ratewarden_common::{CurrencyCode, SupportedCurrencyCatalog};

    #[test]
    fn test_cache_insert_and_get() {
        let cache = CacheStore::new();
        let mut catalog = SupportedCurrencyCatalog::new();
        catalog.insert("EUR", "Euro");

        cache.insert("supported-currencies", catalog.clone());

        assert_eq!(cache.get::<SupportedCurrencyCatalog>("supported-currencies"), Some(catalog));
    }

    #[test]
    fn test_cache_miss() {
        let cache = CacheStore::new();
        assert!(cache.get::<String>("rates:EUR").is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let cache = CacheStore::new();
        cache.insert("rates:EUR", 1u32);
        cache.insert("rates:EUR", 2u32);

        assert_eq!(cache.get::<u32>("rates:EUR"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_wrong_type_reads_as_absent() {
        let cache = CacheStore::new();
        cache.insert("rates:EUR", CurrencyCode::eur());

        assert!(cache.get::<String>("rates:EUR").is_none());
        assert!(cache.get::<CurrencyCode>("rates:EUR").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expiry() {
        let cache = CacheStore::new();
        cache.insert("rates:EUR", 7u32);

        tokio::time::advance(Duration::from_secs(5 * 60 - 1)).await;
        assert_eq!(cache.get::<u32>("rates:EUR"), Some(7));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get::<u32>("rates:EUR").is_none());
        // Expired entry removed on read.
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ttl_and_stats() {
        let cache = CacheStore::new();
        cache.set("short", 1u8, Duration::from_secs(10));
        cache.insert("long", 2u8);

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 2,
                valid_entries: 1,
                expired_entries: 1,
            }
        );

        cache.evict_expired();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_sweeps_expired() {
        let cache = CacheStore::with_config(CacheStoreConfig {
            default_ttl: Duration::from_secs(1),
            max_entries: 2,
        });
        cache.insert("a", 1u8);
        cache.insert("b", 2u8);

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.insert("c", 3u8);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<u8>("c"), Some(3));
    }

    #[test]
    fn test_cache_clear() {
        let cache = CacheStore::new();
        cache.insert("rates:EUR", 1u8);
        cache.insert("rates:USD", 2u8);
        assert_eq!(cache.len(), 2);

        cache.remove("rates:EUR");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_readers_see_whole_values() {
        use std::thread;

        let cache = Arc::new(CacheStore::new());
        cache.insert("series", vec![0u64; 64]);

        let writers: Vec<_> = (1..=4u64)
            .map(|n| {
                let c = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..200 {
                        c.insert("series", vec![n; 64]);
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let values = c.get::<Vec<u64>>("series").unwrap();
                        assert_eq!(values.len(), 64);
                        assert!(values.iter().all(|v| *v == values[0]));
                    }
                })
            })
            .collect();

        for h in writers.into_iter().chain(readers) {
            h.join().unwrap();
        }
    }
}
