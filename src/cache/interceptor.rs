//! The interceptor: the public entry point wrapping every data-access call.
//!
//! Reads that classify as cacheable go through the cache-aside path, joined
//! per key by the [`DedupCoordinator`]. Writes execute first and invalidate
//! their partitions once they succeed. Everything else passes straight
//! through. Cache-layer failures are recovered locally; callers only ever see
//! the real result or the real error.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::field::display;
use tracing::{Span, debug, instrument};

use crate::infra::connect_backend;

use super::backend::CacheBackend;
use super::classifier::{Classification, classify};
use super::config::CacheConfig;
use super::dedup::{DedupCoordinator, Role};
use super::descriptor::CallDescriptor;
use super::error::{CacheError, ConfigurationError};
use super::events::{ErrorStage, Hooks, Observer, StatsSnapshot};
use super::invalidation::{InvalidationPropagator, InvalidationReport, PartitionEpochs};
use super::keys::{CacheEntryKey, KeyBuilder};
use super::policy::PolicySet;
use super::store::{CacheStore, Transformer};

/// What a shared read produced.
#[derive(Clone)]
enum Lookup<T, E> {
    Hit(T),
    Fetched(Result<T, E>),
}

/// Builds an [`Interceptor`] from configuration, with an optional backend
/// override and observability hooks.
pub struct InterceptorBuilder {
    config: CacheConfig,
    backend: Option<Arc<dyn CacheBackend>>,
    hooks: Hooks,
    transformer: Option<Transformer>,
}

impl InterceptorBuilder {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            backend: None,
            hooks: Hooks::default(),
            transformer: None,
        }
    }

    /// Use `backend` instead of the one named in the configuration.
    pub fn with_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Rewrite cached values on the way into and out of the backend.
    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Resolve policies and connect the backend.
    pub fn build(self) -> Result<Interceptor, ConfigurationError> {
        let policies = Arc::new(PolicySet::resolve(&self.config)?);
        let backend = match self.backend {
            Some(backend) => backend,
            None => connect_backend(&self.config.backend)?,
        };

        let mut store = CacheStore::new(backend, self.config.default_ttl());
        if let Some(transformer) = self.transformer {
            store = store.with_transformer(transformer);
        }
        let epochs = Arc::new(PartitionEpochs::new());
        let observer = Arc::new(Observer::new(self.hooks));
        let propagator = InvalidationPropagator::new(
            store.clone(),
            Arc::clone(&policies),
            Arc::clone(&epochs),
            Arc::clone(&observer),
        );

        debug!(
            cache = store.backend_name(),
            models = policies.models().len(),
            "Interceptor ready"
        );

        Ok(Interceptor {
            inner: Arc::new(Inner {
                keys: KeyBuilder::new(policies.hash_arguments()),
                policies,
                store,
                dedup: DedupCoordinator::new(),
                epochs,
                propagator,
                observer,
            }),
        })
    }
}

struct Inner {
    policies: Arc<PolicySet>,
    keys: KeyBuilder,
    store: CacheStore,
    dedup: DedupCoordinator,
    epochs: Arc<PartitionEpochs>,
    propagator: InvalidationPropagator,
    observer: Arc<Observer>,
}

/// Query-result caching interceptor. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Interceptor {
    inner: Arc<Inner>,
}

impl Interceptor {
    /// Build an interceptor using the backend named in `config`.
    pub fn new(config: CacheConfig) -> Result<Self, ConfigurationError> {
        InterceptorBuilder::new(config).build()
    }

    pub fn builder(config: CacheConfig) -> InterceptorBuilder {
        InterceptorBuilder::new(config)
    }

    pub fn policies(&self) -> &PolicySet {
        &self.inner.policies
    }

    pub fn store(&self) -> &CacheStore {
        &self.inner.store
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.observer.snapshot()
    }

    pub fn classify(&self, descriptor: &CallDescriptor) -> Classification {
        let policies = &self.inner.policies;
        classify(
            descriptor,
            policies.global(),
            policies.model(descriptor.entity()),
        )
    }

    /// Derive the cache key a read of `descriptor` is stored under.
    pub fn key_for(&self, descriptor: &CallDescriptor) -> Result<CacheEntryKey, CacheError> {
        let partition = self.inner.policies.partition_for(descriptor.entity());
        self.inner.keys.build(descriptor, partition)
    }

    /// Invalidate `entity` and its related entities as if it had been written.
    pub async fn invalidate(&self, entity: &str) -> InvalidationReport {
        self.inner
            .propagator
            .on_write_success(entity, self.inner.policies.model(entity))
            .await
    }

    /// Run `execute` for `descriptor` through the cache.
    ///
    /// The result or error of `execute` is returned unchanged. Waiters that
    /// joined another caller's fetch receive a clone of its result.
    #[instrument(
        skip_all,
        fields(
            entity = descriptor.entity(),
            operation = %descriptor.operation(),
            classification
        )
    )]
    pub async fn intercept<T, E, F, Fut>(
        &self,
        descriptor: CallDescriptor,
        execute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let classification = self.classify(&descriptor);
        Span::current().record("classification", display(classification));

        match classification {
            Classification::Cacheable => self.read_through(&descriptor, execute).await,
            Classification::Invalidates => self.write_through(&descriptor, execute).await,
            Classification::NotCacheable => execute().await,
        }
    }

    async fn read_through<T, E, F, Fut>(
        &self,
        descriptor: &CallDescriptor,
        execute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let inner = &self.inner;
        let key = match self.key_for(descriptor) {
            Ok(key) => key,
            Err(err) => {
                inner
                    .observer
                    .error(ErrorStage::Key, descriptor.entity(), &err);
                return execute().await;
            }
        };

        // Reads issued after an invalidation never join a fetch that started
        // before it.
        let epoch = inner.epochs.current(key.partition());
        let producer = {
            let store = inner.store.clone();
            let epochs = Arc::clone(&inner.epochs);
            let observer = Arc::clone(&inner.observer);
            let ttl = inner.policies.ttl_for(descriptor.entity());
            let key = key.clone();
            move || cache_aside(store, epochs, observer, key, epoch, ttl, execute)
        };

        let flight = format!("{key}@{epoch}");
        let fetch = inner.dedup.join(&flight, producer);
        if fetch.role() == Role::Waiter {
            inner.observer.dedupe(key.as_str());
        }

        match fetch.wait().await {
            Lookup::Hit(value) => Ok(value),
            Lookup::Fetched(result) => result,
        }
    }

    async fn write_through<T, E, F, Fut>(
        &self,
        descriptor: &CallDescriptor,
        execute: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let result = execute().await;
        if result.is_ok() {
            let entity = descriptor.entity();
            self.inner
                .propagator
                .on_write_success(entity, self.inner.policies.model(entity))
                .await;
        } else {
            debug!("Write failed, skipping invalidation");
        }
        result
    }
}

/// The shared body of a cacheable read: look up, and on a miss execute and
/// store, unless the partition was invalidated after `epoch` was taken.
async fn cache_aside<T, E, F, Fut>(
    store: CacheStore,
    epochs: Arc<PartitionEpochs>,
    observer: Arc<Observer>,
    key: CacheEntryKey,
    epoch: u64,
    ttl: Duration,
    execute: F,
) -> Lookup<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match store.get::<T>(&key).await {
        Ok(Some(value)) => {
            observer.hit(key.as_str());
            return Lookup::Hit(value);
        }
        Ok(None) => {}
        Err(err) => observer.error(ErrorStage::Get, key.as_str(), &err),
    }
    observer.miss(key.as_str());

    let started_at = Instant::now();
    let result = execute().await;
    observer.fetched(started_at.elapsed());

    if let Ok(value) = &result {
        if epochs.current(key.partition()) != epoch {
            debug!(
                key = key.as_str(),
                "Partition invalidated during fetch, not storing result"
            );
        } else if let Err(err) = store.set(&key, value, Some(ttl)).await {
            observer.error(ErrorStage::Set, key.as_str(), &err);
        } else if epochs.current(key.partition()) != epoch {
            // The invalidation may have run before the entry landed.
            debug!(
                key = key.as_str(),
                "Partition invalidated during store, removing entry"
            );
            if let Err(err) = store.delete(&key).await {
                observer.error(ErrorStage::Delete, key.as_str(), &err);
            }
        }
    }

    Lookup::Fetched(result)
}
