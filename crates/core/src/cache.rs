//! Process-wide time-bounded cache.
//!
//! Each entry carries its own expiry instant, checked on every read. There is
//! no background eviction: an expired entry reads as absent and is replaced
//! by the next `insert`. Nothing invalidates entries early, so the staleness
//! window is exactly the TTL.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default validity window for cached distinct-value lists (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Key → (value, expiry) map guarded by a mutex.
///
/// Values are cloned out on read, so store them behind `Arc` when they are
/// large; callers can then compare reads with `Arc::ptr_eq`.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value if present and not yet expired.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    /// Insert or replace a value with a fresh expiry.
    pub fn insert(&self, key: K, value: V) {
        self.insert_many(std::iter::once((key, value)));
    }

    /// Insert several values sharing one expiry instant.
    pub fn insert_many(&self, items: impl IntoIterator<Item = (K, V)>) {
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in items {
            entries.insert(key, Entry { value, expires_at });
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
