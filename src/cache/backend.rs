//! Storage backend seam.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::CacheError;

/// Byte-level storage used by [`CacheStore`](super::store::CacheStore).
///
/// Implementations report transport failures as
/// [`CacheError::BackendUnavailable`]; a missing key is `Ok(None)`, never an
/// error.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Store `value` under `key`, tagged with `tags`. A `ttl_seconds` of zero
    /// stores without expiry.
    async fn set(
        &self,
        key: &str,
        value: Bytes,
        ttl_seconds: u64,
        tags: &[String],
    ) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Delete every entry tagged with `tag`, returning how many were removed.
    async fn invalidate_tag(&self, tag: &str) -> Result<u64, CacheError>;
}
