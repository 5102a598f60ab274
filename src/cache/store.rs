//! Typed cache store on top of a byte-level [`CacheBackend`].
//!
//! Values are encoded as JSON, optionally rewritten by a [`Transformer`].
//! Every entry is tagged with the partition of its key so a partition can be
//! invalidated as a whole.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::backend::CacheBackend;
use super::error::CacheError;
use super::keys::CacheEntryKey;

type ValueHook = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Rewrites values as JSON trees on their way into and out of the backend.
///
/// `deserialize` must undo `serialize`.
#[derive(Clone)]
pub struct Transformer {
    serialize: ValueHook,
    deserialize: ValueHook,
}

impl Transformer {
    pub fn new(
        serialize: impl Fn(Value) -> Value + Send + Sync + 'static,
        deserialize: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            serialize: Arc::new(serialize),
            deserialize: Arc::new(deserialize),
        }
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer").finish_non_exhaustive()
    }
}

/// Uniform get/set/delete/invalidate interface over any backend.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    default_ttl: Duration,
    transformer: Option<Transformer>,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: Duration) -> Self {
        Self {
            backend,
            default_ttl,
            transformer: None,
        }
    }

    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Fetch and decode the value stored under `key`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &CacheEntryKey,
    ) -> Result<Option<T>, CacheError> {
        let Some(bytes) = self.backend.get(key.as_str()).await? else {
            return Ok(None);
        };
        let value = match &self.transformer {
            Some(transformer) => {
                let stored: Value = serde_json::from_slice(&bytes)?;
                serde_json::from_value((transformer.deserialize)(stored))?
            }
            None => serde_json::from_slice(&bytes)?,
        };
        Ok(Some(value))
    }

    /// Encode and store `value` under `key`.
    ///
    /// A missing or zero `ttl` falls back to the store default; a zero default
    /// stores without expiry.
    pub async fn set<T: Serialize>(
        &self,
        key: &CacheEntryKey,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let encoded = match &self.transformer {
            Some(transformer) => {
                let tree = (transformer.serialize)(serde_json::to_value(value)?);
                Bytes::from(serde_json::to_vec(&tree)?)
            }
            None => Bytes::from(serde_json::to_vec(value)?),
        };
        let ttl_seconds = ttl_seconds(self.resolve_ttl(ttl));
        let tags = [key.partition().to_string()];

        debug!(
            cache = self.backend.name(),
            key = key.as_str(),
            ttl_seconds,
            bytes = encoded.len(),
            "Storing cache entry"
        );

        self.backend
            .set(key.as_str(), encoded, ttl_seconds, &tags)
            .await
    }

    pub async fn delete(&self, key: &CacheEntryKey) -> Result<(), CacheError> {
        self.backend.delete(key.as_str()).await
    }

    /// Drop every entry in `partition`. Invalidating an empty partition is a
    /// no-op.
    pub async fn invalidate(&self, partition: &str) -> Result<u64, CacheError> {
        self.backend.invalidate_tag(partition).await
    }

    fn resolve_ttl(&self, ttl: Option<Duration>) -> Duration {
        match ttl {
            Some(ttl) if !ttl.is_zero() => ttl,
            _ => self.default_ttl,
        }
    }
}

/// Whole seconds for the backend, rounding sub-second remainders up so a
/// short non-zero TTL never turns into "no expiry".
fn ttl_seconds(ttl: Duration) -> u64 {
    let seconds = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        seconds.saturating_add(1)
    } else {
        seconds
    }
}
