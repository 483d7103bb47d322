//! In-process cache backend.
//!
//! A bounded LRU map of rendered keys to JSON strings. Each entry carries its
//! own deadline; an expired entry reads as absent and is dropped on access.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;

use crate::util::lock::mutex_lock;

use super::backend::{CacheBackend, CacheError};
use super::config::CacheConfig;

const SOURCE: &str = "cache::store";
pub(crate) const METRIC_CACHE_EVICT_TOTAL: &str = "arbor_cache_evict_total";

struct Entry {
    value: String,
    /// `None` when the lifetime overflows the clock.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

pub struct MemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_capacity(config.capacity_non_zero())
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Entries currently held, expired ones included until they are touched.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        let lookup = entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));

        match lookup {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "set");
        if ttl.is_zero() {
            entries.pop(key);
            return Ok(());
        }

        let entry = Entry {
            value,
            expires_at: Instant::now().checked_add(ttl),
        };
        if let Some((evicted, _)) = entries.push(key.to_string(), entry) {
            if evicted != key {
                counter!(METRIC_CACHE_EVICT_TOTAL).increment(1);
            }
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "delete");
        for key in keys {
            entries.pop(key.as_str());
        }
        Ok(())
    }
}
