//! Redis backend over a `deadpool-redis` connection pool.
//!
//! Entries live under `<prefix><key>`. Each partition tag keeps a reference
//! set at `<prefix>r:<tag>` listing the keys stored under it; invalidation
//! deletes the members and then the set, atomically in one script.

use async_trait::async_trait;
use bytes::Bytes;
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use redis::{AsyncCommands, Script};
use tracing::warn;

use crate::cache::backend::CacheBackend;
use crate::cache::error::{CacheError, ConfigurationError};

const REFERENCE_SEGMENT: &str = "r:";

/// KEYS[1] entry, KEYS[2..] reference sets; ARGV value, ttl, reference ttl.
const SET_SCRIPT: &str = r#"
local ttl = tonumber(ARGV[2])
local references_ttl = tonumber(ARGV[3])
if ttl > 0 then
    redis.call('SET', KEYS[1], ARGV[1], 'EX', ttl)
else
    redis.call('SET', KEYS[1], ARGV[1])
end
for i = 2, #KEYS do
    redis.call('SADD', KEYS[i], KEYS[1])
    if references_ttl > 0 then
        redis.call('EXPIRE', KEYS[i], references_ttl)
    end
end
"#;

/// KEYS[1] reference set. Returns the number of entries deleted.
const INVALIDATE_SCRIPT: &str = r#"
local members = redis.call('SMEMBERS', KEYS[1])
local removed = 0
for _, key in ipairs(members) do
    removed = removed + redis.call('DEL', key)
end
redis.call('DEL', KEYS[1])
return removed
"#;

/// Connection settings for [`RedisBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisOptions {
    pub url: String,
    pub pool_size: usize,
    pub key_prefix: String,
    pub references_ttl_seconds: Option<u64>,
}

pub struct RedisBackend {
    pool: Pool,
    key_prefix: String,
    references_ttl_seconds: u64,
    set_script: Script,
    invalidate_script: Script,
}

impl RedisBackend {
    /// Build the pool. Connections are opened lazily, so an unreachable
    /// server only shows up as `BackendUnavailable` on first use.
    pub fn connect(options: &RedisOptions) -> Result<Self, ConfigurationError> {
        if !is_redis_url(&options.url) {
            return Err(ConfigurationError::invalid_backend(format!(
                "`{}` is not a redis:// or rediss:// URL",
                options.url
            )));
        }
        if options.pool_size == 0 {
            return Err(ConfigurationError::invalid_backend(
                "redis pool_size must be at least 1",
            ));
        }

        let mut config = Config::from_url(options.url.clone());
        config.pool = Some(PoolConfig::new(options.pool_size));
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|err| ConfigurationError::invalid_backend(err.to_string()))?;

        Ok(Self {
            pool,
            key_prefix: options.key_prefix.clone(),
            references_ttl_seconds: options.references_ttl_seconds.unwrap_or(0),
            set_script: Script::new(SET_SCRIPT),
            invalidate_script: Script::new(INVALIDATE_SCRIPT),
        })
    }

    fn entry_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }

    fn reference_key(&self, tag: &str) -> String {
        format!("{}{REFERENCE_SEGMENT}{tag}", self.key_prefix)
    }

    async fn connection(&self) -> Result<Connection, CacheError> {
        self.pool.get().await.map_err(|err| {
            warn!(error = %err, "Redis pool checkout failed");
            CacheError::backend_unavailable(format!("redis pool: {err}"))
        })
    }
}

fn is_redis_url(url: &str) -> bool {
    ["redis://", "rediss://", "redis+unix://", "unix://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

fn unavailable(op: &'static str, err: redis::RedisError) -> CacheError {
    CacheError::backend_unavailable(format!("redis {op}: {err}"))
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut connection = self.connection().await?;
        let value: Option<Vec<u8>> = connection
            .get(self.entry_key(key))
            .await
            .map_err(|err| unavailable("GET", err))?;
        Ok(value.map(Bytes::from))
    }

    async fn set(
        &self,
        key: &str,
        value: Bytes,
        ttl_seconds: u64,
        tags: &[String],
    ) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        let mut invocation = self.set_script.prepare_invoke();
        invocation.key(self.entry_key(key));
        for tag in tags {
            invocation.key(self.reference_key(tag));
        }
        invocation
            .arg(value.as_ref())
            .arg(ttl_seconds)
            .arg(self.references_ttl_seconds);

        invocation
            .invoke_async::<()>(&mut *connection)
            .await
            .map_err(|err| unavailable("SET", err))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        connection
            .del::<_, ()>(self.entry_key(key))
            .await
            .map_err(|err| unavailable("DEL", err))
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<u64, CacheError> {
        let mut connection = self.connection().await?;
        self.invalidate_script
            .key(self.reference_key(tag))
            .invoke_async::<u64>(&mut *connection)
            .await
            .map_err(|err| unavailable("invalidate", err))
    }
}
