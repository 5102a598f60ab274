//! In-process LRU backend.

use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tokio::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::cache::backend::CacheBackend;
use crate::cache::config::non_zero_size;
use crate::cache::error::CacheError;
use crate::cache::lock::{rw_read, rw_write};
use crate::cache::registry::TagRegistry;

const SOURCE: &str = "infra::cache";
pub const METRIC_MEMORY_EVICT_TOTAL: &str = "querycache_memory_evict_total";

#[derive(Clone)]
struct MemoryEntry {
    value: Bytes,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Bounded in-memory store with per-entry TTL and tag invalidation.
///
/// Lock order is entries first, then the tag registry.
pub struct MemoryBackend {
    entries: RwLock<LruCache<String, MemoryEntry>>,
    tags: TagRegistry,
}

impl MemoryBackend {
    /// Create a store holding at most `size` entries (at least one).
    pub fn new(size: usize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(non_zero_size(size))),
            tags: TagRegistry::new(),
        }
    }

    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        rw_read(&self.entries, SOURCE, "contains")
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Drop every entry and tag mapping.
    pub fn clear(&self) {
        let mut entries = rw_write(&self.entries, SOURCE, "clear");
        entries.clear();
        self.tags.clear();
        debug!("Cleared in-memory cache");
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");

        match entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }

        entries.pop(key);
        self.tags.unregister(key);
        trace!(key, "Reclaimed expired entry");
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: Bytes,
        ttl_seconds: u64,
        tags: &[String],
    ) -> Result<(), CacheError> {
        let expires_at =
            (ttl_seconds > 0).then(|| Instant::now() + Duration::from_secs(ttl_seconds));
        let mut entries = rw_write(&self.entries, SOURCE, "set");

        let displaced = entries.push(key.to_string(), MemoryEntry { value, expires_at });
        if let Some((evicted, _)) = displaced.filter(|(evicted, _)| evicted != key) {
            self.tags.unregister(&evicted);
            counter!(METRIC_MEMORY_EVICT_TOTAL).increment(1);
            trace!(key = evicted.as_str(), "Evicted least recently used entry");
        }
        self.tags.register(key, tags);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "delete");
        entries.pop(key);
        self.tags.unregister(key);
        Ok(())
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<u64, CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "invalidate_tag");
        let keys = self.tags.unregister_tag(tag);

        let removed = keys
            .iter()
            .filter(|key| entries.pop(key.as_str()).is_some())
            .count();
        Ok(removed as u64)
    }
}
