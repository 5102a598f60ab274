//! Cache lifecycle events: logs, metrics, counters and user hooks.
//!
//! Hooks are synchronous side channels; they observe outcomes and never
//! change what the interceptor returns.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::{counter, histogram};
use tracing::{debug, warn};

use super::error::CacheError;

pub const METRIC_HIT_TOTAL: &str = "querycache_hit_total";
pub const METRIC_MISS_TOTAL: &str = "querycache_miss_total";
pub const METRIC_DEDUPE_TOTAL: &str = "querycache_dedupe_total";
pub const METRIC_ERROR_TOTAL: &str = "querycache_error_total";
pub const METRIC_INVALIDATE_TOTAL: &str = "querycache_invalidate_total";
pub const METRIC_FETCH_MS: &str = "querycache_fetch_ms";

type KeyHook = Arc<dyn Fn(&str) + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&CacheError) + Send + Sync>;

/// Optional observability callbacks.
#[derive(Clone, Default)]
pub struct Hooks {
    on_hit: Option<KeyHook>,
    on_miss: Option<KeyHook>,
    on_dedupe: Option<KeyHook>,
    on_error: Option<ErrorHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the cache key when a read is served from cache.
    pub fn on_hit(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_hit = Some(Arc::new(hook));
        self
    }

    /// Called with the cache key when a read had to execute the real call.
    pub fn on_miss(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_miss = Some(Arc::new(hook));
        self
    }

    /// Called with the cache key when a read joined an in-flight fetch.
    pub fn on_dedupe(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_dedupe = Some(Arc::new(hook));
        self
    }

    /// Called for every cache-layer failure that was recovered from.
    pub fn on_error(mut self, hook: impl Fn(&CacheError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_hit", &self.on_hit.is_some())
            .field("on_miss", &self.on_miss.is_some())
            .field("on_dedupe", &self.on_dedupe.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Where in the call a cache-layer failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Key,
    Get,
    Set,
    Delete,
    Invalidate,
}

impl ErrorStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorStage::Key => "key",
            ErrorStage::Get => "get",
            ErrorStage::Set => "set",
            ErrorStage::Delete => "delete",
            ErrorStage::Invalidate => "invalidate",
        }
    }
}

#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    dedupes: AtomicU64,
    errors: AtomicU64,
    invalidations: AtomicU64,
}

/// Point-in-time copy of the interceptor's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub dedupes: u64,
    pub errors: u64,
    pub invalidations: u64,
}

/// Fans each lifecycle event out to tracing, metrics, counters and hooks.
#[derive(Debug, Default)]
pub(crate) struct Observer {
    hooks: Hooks,
    stats: CacheStats,
}

impl Observer {
    pub(crate) fn new(hooks: Hooks) -> Self {
        Self {
            hooks,
            stats: CacheStats::default(),
        }
    }

    pub(crate) fn hit(&self, key: &str) {
        debug!(outcome = "hit", key, "Served from cache");
        counter!(METRIC_HIT_TOTAL).increment(1);
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        if let Some(hook) = &self.hooks.on_hit {
            hook(key);
        }
    }

    pub(crate) fn miss(&self, key: &str) {
        debug!(outcome = "miss", key, "Cache miss");
        counter!(METRIC_MISS_TOTAL).increment(1);
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        if let Some(hook) = &self.hooks.on_miss {
            hook(key);
        }
    }

    pub(crate) fn dedupe(&self, key: &str) {
        debug!(outcome = "dedupe", key, "Joined in-flight fetch");
        counter!(METRIC_DEDUPE_TOTAL).increment(1);
        self.stats.dedupes.fetch_add(1, Ordering::Relaxed);
        if let Some(hook) = &self.hooks.on_dedupe {
            hook(key);
        }
    }

    pub(crate) fn error(&self, stage: ErrorStage, subject: &str, error: &CacheError) {
        warn!(
            stage = stage.as_str(),
            subject,
            kind = error.kind(),
            error = %error,
            "Cache layer failure, continuing without cache"
        );
        counter!(METRIC_ERROR_TOTAL, "stage" => stage.as_str()).increment(1);
        self.stats.errors.fetch_add(1, Ordering::Relaxed);
        if let Some(hook) = &self.hooks.on_error {
            hook(error);
        }
    }

    pub(crate) fn invalidated(&self, partition: &str, removed: u64) {
        debug!(partition, removed, "Invalidated partition");
        counter!(METRIC_INVALIDATE_TOTAL).increment(1);
        self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fetched(&self, elapsed: Duration) {
        histogram!(METRIC_FETCH_MS).record(elapsed.as_secs_f64() * 1000.0);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            dedupes: self.stats.dedupes.load(Ordering::Relaxed),
            errors: self.stats.errors.load(Ordering::Relaxed),
            invalidations: self.stats.invalidations.load(Ordering::Relaxed),
        }
    }
}
