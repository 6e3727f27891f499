use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// A stored value and the instant after which it is stale.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-memory TTL map, one entry per key.
///
/// Backed by a sharded concurrent map: readers and writers of different keys do
/// not contend, and an insert replaces the previous entry for its key atomically.
pub struct MemoryCache<K, V>
where
    K: Eq + Hash,
{
    inner: DashMap<K, CacheEntry<V>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Returns the value if an entry exists and has not expired at `now`.
    pub fn get_fresh(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        match self.inner.get(key) {
            Some(entry) if entry.is_fresh(now) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry expired for key: {:?}", key);
                None
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    /// Returns the entry regardless of freshness.
    pub fn get_entry(&self, key: &K) -> Option<CacheEntry<V>> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    pub fn put(&self, key: K, value: V, expires_at: DateTime<Utc>) {
        debug!("Cache PUT for key: {:?}", key);
        self.inner.insert(key, CacheEntry { value, expires_at });
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cache_get_put() {
        let cache = MemoryCache::<String, i32>::new();
        let now = Utc::now();

        // Initially, cache is empty
        assert!(cache.get_fresh(&"key1".to_string(), now).is_none());

        cache.put("key1".to_string(), 123, now + Duration::seconds(60));
        assert_eq!(cache.get_fresh(&"key1".to_string(), now), Some(123));

        // Get a non-existent key
        assert!(cache.get_fresh(&"key2".to_string(), now).is_none());
        assert!(cache.get_entry(&"key2".to_string()).is_none());
    }

    #[test]
    fn test_cache_ttl_expiration() {
        let cache = MemoryCache::<String, i32>::new();
        let now = Utc::now();
        let expires_at = now + Duration::seconds(10);

        cache.put("key1".to_string(), 123, expires_at);
        assert_eq!(
            cache.get_fresh(&"key1".to_string(), now + Duration::seconds(9)),
            Some(123)
        );

        // expiry instant itself counts as stale
        assert!(cache.get_fresh(&"key1".to_string(), expires_at).is_none());

        // stale entries are still reachable through get_entry
        let entry = cache.get_entry(&"key1".to_string()).unwrap();
        assert_eq!(entry.value, 123);
        assert!(!entry.is_fresh(expires_at));
    }

    #[test]
    fn test_cache_put_overwrites() {
        let cache = MemoryCache::<String, i32>::new();
        let now = Utc::now();

        cache.put("key1".to_string(), 1, now);
        cache.put("key1".to_string(), 2, now + Duration::seconds(5));

        assert_eq!(cache.get_fresh(&"key1".to_string(), now), Some(2));
        let entry = cache.get_entry(&"key1".to_string()).unwrap();
        assert_eq!(entry.expires_at, now + Duration::seconds(5));
    }
}
