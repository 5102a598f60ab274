//! Infrastructure adapters and runtime bootstrap.

pub mod cache;
pub mod error;
pub mod redis;
pub mod telemetry;

use std::sync::Arc;

use crate::cache::backend::CacheBackend;
use crate::cache::config::BackendConfig;
use crate::cache::error::ConfigurationError;

use self::cache::MemoryBackend;
use self::redis::{RedisBackend, RedisOptions};

/// Build the storage backend selected by `config`.
pub fn connect_backend(config: &BackendConfig) -> Result<Arc<dyn CacheBackend>, ConfigurationError> {
    match config {
        BackendConfig::Memory { size } => {
            if *size == 0 {
                return Err(ConfigurationError::invalid_backend(
                    "memory size must be at least 1",
                ));
            }
            Ok(Arc::new(MemoryBackend::new(*size)))
        }
        BackendConfig::Redis {
            url,
            pool_size,
            key_prefix,
            references_ttl_seconds,
        } => {
            let backend = RedisBackend::connect(&RedisOptions {
                url: url.clone(),
                pool_size: *pool_size,
                key_prefix: key_prefix.clone(),
                references_ttl_seconds: *references_ttl_seconds,
            })?;
            Ok(Arc::new(backend))
        }
    }
}
