//! Cache configuration.
//!
//! Controls which entities and operations are cached, their TTLs, related
//! entity invalidation and the storage backend via `querycache.toml`:
//!
//! ```toml
//! [cache]
//! default_ttl_seconds = 60
//! excluded_entities = ["AuditLog"]
//!
//! [[cache.models]]
//! entity = "User"
//! ttl_seconds = 300
//! related_entities = ["Post"]
//!
//! [cache.backend]
//! type = "redis"
//! url = "redis://127.0.0.1:6379"
//! ```

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use super::operation::OperationKind;

// Default values for cache configuration
const DEFAULT_TTL_SECONDS: u64 = 0;
const DEFAULT_MEMORY_SIZE: usize = 1024;
const DEFAULT_REDIS_POOL_SIZE: usize = 16;
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Interceptor configuration, as loaded from settings or built in code.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Per-entity policies.
    pub models: Vec<ModelConfig>,
    /// TTL applied when a model sets none. Zero caches until invalidated.
    pub default_ttl_seconds: u64,
    /// Entities that are never cached.
    pub excluded_entities: Vec<String>,
    /// Read operations that are never cached, whatever the entity.
    pub excluded_operations: Vec<OperationKind>,
    /// Only cache entities listed in `models`.
    pub cache_only_configured_models: bool,
    /// Replace the descriptor segment of keys with its SHA-256 digest.
    pub hash_arguments: bool,
    /// Storage backend selection.
    pub backend: BackendConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            excluded_entities: Vec::new(),
            excluded_operations: Vec::new(),
            cache_only_configured_models: false,
            hash_arguments: false,
            backend: BackendConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.models.push(model);
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl_seconds = ttl.as_secs();
        self
    }

    pub fn exclude_entity(mut self, entity: impl Into<String>) -> Self {
        self.excluded_entities.push(entity.into());
        self
    }

    pub fn exclude_operation(mut self, operation: impl Into<OperationKind>) -> Self {
        self.excluded_operations.push(operation.into());
        self
    }

    pub fn only_configured_models(mut self, enabled: bool) -> Self {
        self.cache_only_configured_models = enabled;
        self
    }

    pub fn with_hashed_arguments(mut self, enabled: bool) -> Self {
        self.hash_arguments = enabled;
        self
    }

    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }
}

/// Policy for a single entity.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ModelConfig {
    pub entity: String,
    pub ttl_seconds: Option<u64>,
    pub cache_key_alias: Option<String>,
    pub excluded_operations: Vec<OperationKind>,
    pub related_entities: Vec<String>,
}

impl ModelConfig {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Default::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_seconds = Some(ttl.as_secs());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.cache_key_alias = Some(alias.into());
        self
    }

    pub fn exclude_operation(mut self, operation: impl Into<OperationKind>) -> Self {
        self.excluded_operations.push(operation.into());
        self
    }

    pub fn invalidate_related(mut self, entity: impl Into<String>) -> Self {
        self.related_entities.push(entity.into());
        self
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// In-process LRU store.
    Memory {
        #[serde(default = "default_memory_size")]
        size: usize,
    },
    /// Redis over a pooled multiplexed connection.
    Redis {
        #[serde(default = "default_redis_url")]
        url: String,
        #[serde(default = "default_redis_pool_size")]
        pool_size: usize,
        #[serde(default)]
        key_prefix: String,
        /// Expiry of the per-partition reference sets; unset keeps them
        /// until the partition is invalidated.
        #[serde(default)]
        references_ttl_seconds: Option<u64>,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Memory {
            size: DEFAULT_MEMORY_SIZE,
        }
    }
}

impl BackendConfig {
    pub fn memory(size: usize) -> Self {
        BackendConfig::Memory { size }
    }

    pub fn redis(url: impl Into<String>) -> Self {
        BackendConfig::Redis {
            url: url.into(),
            pool_size: DEFAULT_REDIS_POOL_SIZE,
            key_prefix: String::new(),
            references_ttl_seconds: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Memory { .. } => "memory",
            BackendConfig::Redis { .. } => "redis",
        }
    }
}

/// Returns a memory size as NonZeroUsize, clamping to 1 if zero.
pub fn non_zero_size(size: usize) -> NonZeroUsize {
    NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN)
}

fn default_memory_size() -> usize {
    DEFAULT_MEMORY_SIZE
}

fn default_redis_pool_size() -> usize {
    DEFAULT_REDIS_POOL_SIZE
}

fn default_redis_url() -> String {
    DEFAULT_REDIS_URL.to_string()
}
