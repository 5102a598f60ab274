use std::collections::HashMap;
use std::future::{Ready, ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use querycache::cache::{
    CacheBackend, CacheConfig, CacheError, CallDescriptor, Hooks, Interceptor, ModelConfig,
    ReadOperation, WriteOperation,
};
use querycache::infra::cache::MemoryBackend;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

fn users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "alice".into(),
        },
        User {
            id: 2,
            name: "bob".into(),
        },
    ]
}

fn memory_interceptor(config: CacheConfig) -> Interceptor {
    Interceptor::builder(config)
        .with_backend(Arc::new(MemoryBackend::new(128)))
        .build()
        .expect("valid config")
}

/// A continuation that counts its invocations and returns `value`.
fn counted<T: Send + 'static>(
    calls: &Arc<AtomicUsize>,
    value: Result<T, String>,
) -> impl FnOnce() -> Ready<Result<T, String>> + Send + 'static {
    let calls = Arc::clone(calls);
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        ready(value)
    }
}

fn read(entity: &str) -> CallDescriptor {
    CallDescriptor::new(entity, ReadOperation::FindMany, json!({}))
}

fn write(entity: &str) -> CallDescriptor {
    CallDescriptor::new(entity, WriteOperation::Update, json!({"where": {"id": 1}}))
}

#[tokio::test]
async fn user_find_many_is_cached_until_update() {
    let interceptor = memory_interceptor(CacheConfig::default());
    let reads = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let result = interceptor
            .intercept(read("User"), counted(&reads, Ok(users())))
            .await;
        assert_eq!(result, Ok(users()));
    }
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    let writes = Arc::new(AtomicUsize::new(0));
    let updated = interceptor
        .intercept(write("User"), counted(&writes, Ok(1u64)))
        .await;
    assert_eq!(updated, Ok(1));

    let result = interceptor
        .intercept(read("User"), counted(&reads, Ok(users())))
        .await;
    assert_eq!(result, Ok(users()));
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    assert_eq!(writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn argument_order_does_not_split_the_cache() {
    let interceptor = memory_interceptor(CacheConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let first = CallDescriptor::new(
        "User",
        ReadOperation::FindFirst,
        json!({"where": {"id": 1, "name": "alice"}, "select": {"id": true}}),
    );
    let second = CallDescriptor::new(
        "User",
        ReadOperation::FindFirst,
        json!({"select": {"id": true}, "where": {"name": "alice", "id": 1}}),
    );

    let _ = interceptor.intercept(first, counted(&calls, Ok(1u32))).await;
    let _ = interceptor.intercept(second, counted(&calls, Ok(1u32))).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_reads_execute_once() {
    let interceptor = memory_interceptor(CacheConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let interceptor = interceptor.clone();
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                interceptor
                    .intercept(read("User"), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, String>(users())
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.expect("task completes"), Ok(users()));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let stats = interceptor.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.dedupes + stats.hits, 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_failure_is_shared_then_retried() {
    let interceptor = memory_interceptor(CacheConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let interceptor = interceptor.clone();
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                interceptor
                    .intercept(read("User"), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err::<Vec<User>, _>("database offline".to_string())
                    })
                    .await
            })
        })
        .collect();

    let mut failures = 0;
    for task in tasks {
        if task.await.expect("task completes") == Err("database offline".to_string()) {
            failures += 1;
        }
    }
    assert_eq!(failures, 8);
    let after_first_wave = calls.load(Ordering::SeqCst);
    assert!(after_first_wave >= 1);

    let retried = interceptor
        .intercept(read("User"), counted(&calls, Ok(users())))
        .await;
    assert_eq!(retried, Ok(users()));
    assert_eq!(calls.load(Ordering::SeqCst), after_first_wave + 1);
}

#[tokio::test]
async fn failed_write_propagates_and_keeps_cache() {
    let interceptor = memory_interceptor(CacheConfig::default());
    let reads = Arc::new(AtomicUsize::new(0));

    let _ = interceptor
        .intercept(read("User"), counted(&reads, Ok(users())))
        .await;

    let writes = Arc::new(AtomicUsize::new(0));
    let failed = interceptor
        .intercept(
            write("User"),
            counted::<u64>(&writes, Err("unique constraint".to_string())),
        )
        .await;
    assert_eq!(failed, Err("unique constraint".to_string()));

    let _ = interceptor
        .intercept(read("User"), counted(&reads, Ok(users())))
        .await;
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(interceptor.stats().invalidations, 0);
}

#[tokio::test]
async fn write_invalidates_only_its_partition() {
    let interceptor = memory_interceptor(CacheConfig::default());
    let users_calls = Arc::new(AtomicUsize::new(0));
    let posts_calls = Arc::new(AtomicUsize::new(0));

    let _ = interceptor
        .intercept(read("User"), counted(&users_calls, Ok(1u32)))
        .await;
    let _ = interceptor
        .intercept(read("Post"), counted(&posts_calls, Ok(2u32)))
        .await;

    let _ = interceptor
        .intercept(write("User"), counted(&Arc::default(), Ok(())))
        .await;

    let _ = interceptor
        .intercept(read("User"), counted(&users_calls, Ok(1u32)))
        .await;
    let _ = interceptor
        .intercept(read("Post"), counted(&posts_calls, Ok(2u32)))
        .await;

    assert_eq!(users_calls.load(Ordering::SeqCst), 2);
    assert_eq!(posts_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn related_entities_are_invalidated_on_write() {
    let config = CacheConfig::default()
        .with_model(ModelConfig::new("User").invalidate_related("Post"))
        .with_model(ModelConfig::new("Post"));
    let interceptor = memory_interceptor(config);
    let posts = Arc::new(AtomicUsize::new(0));
    let comments = Arc::new(AtomicUsize::new(0));

    let _ = interceptor
        .intercept(read("Post"), counted(&posts, Ok(1u32)))
        .await;
    let _ = interceptor
        .intercept(read("Comment"), counted(&comments, Ok(1u32)))
        .await;
    let _ = interceptor
        .intercept(write("User"), counted(&Arc::default(), Ok(())))
        .await;
    let _ = interceptor
        .intercept(read("Post"), counted(&posts, Ok(1u32)))
        .await;
    let _ = interceptor
        .intercept(read("Comment"), counted(&comments, Ok(1u32)))
        .await;

    assert_eq!(posts.load(Ordering::SeqCst), 2);
    assert_eq!(comments.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn related_entities_of_other_models_are_not_used() {
    // Post lists User as related; a write to Comment must not pick that up.
    let config = CacheConfig::default()
        .with_model(ModelConfig::new("Post").invalidate_related("User"))
        .with_model(ModelConfig::new("Comment"));
    let interceptor = memory_interceptor(config);
    let users_calls = Arc::new(AtomicUsize::new(0));

    let _ = interceptor
        .intercept(read("User"), counted(&users_calls, Ok(1u32)))
        .await;
    let _ = interceptor
        .intercept(write("Comment"), counted(&Arc::default(), Ok(())))
        .await;
    let _ = interceptor
        .intercept(read("User"), counted(&users_calls, Ok(1u32)))
        .await;

    assert_eq!(users_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn shared_alias_invalidates_together() {
    let config = CacheConfig::default()
        .with_model(ModelConfig::new("Admin").with_alias("Account"))
        .with_model(ModelConfig::new("Customer").with_alias("Account"));
    let interceptor = memory_interceptor(config);
    let admins = Arc::new(AtomicUsize::new(0));
    let customers = Arc::new(AtomicUsize::new(0));

    let _ = interceptor
        .intercept(read("Admin"), counted(&admins, Ok(1u32)))
        .await;
    let _ = interceptor
        .intercept(read("Customer"), counted(&customers, Ok(2u32)))
        .await;

    // Same arguments, different entity: the descriptor keeps them apart.
    let admin = interceptor
        .intercept(read("Admin"), counted(&admins, Ok(99u32)))
        .await;
    assert_eq!(admin, Ok(1));

    let _ = interceptor
        .intercept(write("Admin"), counted(&Arc::default(), Ok(())))
        .await;
    let _ = interceptor
        .intercept(read("Customer"), counted(&customers, Ok(2u32)))
        .await;

    assert_eq!(admins.load(Ordering::SeqCst), 1);
    assert_eq!(customers.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn hashed_keys_still_invalidate() {
    let interceptor = memory_interceptor(CacheConfig::default().with_hashed_arguments(true));
    let calls = Arc::new(AtomicUsize::new(0));

    let key = interceptor.key_for(&read("User")).expect("key");
    assert!(key.as_str().starts_with("User~"));
    assert_eq!(key.as_str().len(), "User~".len() + 64);

    let _ = interceptor
        .intercept(read("User"), counted(&calls, Ok(1u32)))
        .await;
    let _ = interceptor
        .intercept(read("User"), counted(&calls, Ok(1u32)))
        .await;
    let _ = interceptor
        .intercept(write("User"), counted(&Arc::default(), Ok(())))
        .await;
    let _ = interceptor
        .intercept(read("User"), counted(&calls, Ok(1u32)))
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn exclusions_bypass_the_cache() {
    let config = CacheConfig::default()
        .exclude_entity("AuditLog")
        .exclude_operation(ReadOperation::Count)
        .with_model(ModelConfig::new("User").exclude_operation(ReadOperation::FindMany));
    let interceptor = memory_interceptor(config);

    let cases = [
        CallDescriptor::new("AuditLog", ReadOperation::FindMany, json!({})),
        CallDescriptor::new("Post", ReadOperation::Count, json!({})),
        CallDescriptor::new("User", ReadOperation::FindMany, json!({})),
    ];

    for descriptor in cases {
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let _ = interceptor
                .intercept(descriptor.clone(), counted(&calls, Ok(1u32)))
                .await;
        }
        assert_eq!(
            calls.load(Ordering::SeqCst),
            2,
            "{} {} should not be cached",
            descriptor.entity(),
            descriptor.operation()
        );
    }

    assert_eq!(interceptor.stats().hits + interceptor.stats().misses, 0);
}

#[tokio::test]
async fn only_configured_models_are_cached_when_enabled() {
    let config = CacheConfig::default()
        .with_model(ModelConfig::new("User"))
        .only_configured_models(true);
    let interceptor = memory_interceptor(config);
    let users_calls = Arc::new(AtomicUsize::new(0));
    let tags_calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let _ = interceptor
            .intercept(read("User"), counted(&users_calls, Ok(1u32)))
            .await;
        let _ = interceptor
            .intercept(read("Tag"), counted(&tags_calls, Ok(1u32)))
            .await;
    }

    assert_eq!(users_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tags_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn hooks_observe_hits_misses_and_dedupes() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let hooks = {
        let hit = Arc::clone(&events);
        let miss = Arc::clone(&events);
        let dedupe = Arc::clone(&events);
        Hooks::new()
            .on_hit(move |key| hit.lock().unwrap().push(("hit", key.to_string())))
            .on_miss(move |key| miss.lock().unwrap().push(("miss", key.to_string())))
            .on_dedupe(move |key| dedupe.lock().unwrap().push(("dedupe", key.to_string())))
    };
    let interceptor = Interceptor::builder(CacheConfig::default())
        .with_backend(Arc::new(MemoryBackend::new(16)))
        .with_hooks(hooks)
        .build()
        .expect("valid config");
    let key = interceptor.key_for(&read("User")).expect("key").to_string();

    let (release, released) = oneshot::channel::<()>();
    let leader = {
        let interceptor = interceptor.clone();
        tokio::spawn(async move {
            interceptor
                .intercept(read("User"), move || async move {
                    let _ = released.await;
                    Ok::<_, String>(1u32)
                })
                .await
        })
    };
    while interceptor.stats().misses == 0 {
        tokio::task::yield_now().await;
    }

    let waiter = {
        let interceptor = interceptor.clone();
        tokio::spawn(async move {
            interceptor
                .intercept(read("User"), || async { Ok::<_, String>(2u32) })
                .await
        })
    };
    while interceptor.stats().dedupes == 0 {
        tokio::task::yield_now().await;
    }
    release.send(()).expect("leader waiting");

    assert_eq!(leader.await.unwrap(), Ok(1));
    assert_eq!(waiter.await.unwrap(), Ok(1));

    let hit = interceptor
        .intercept(read("User"), || async { Ok::<_, String>(3u32) })
        .await;
    assert_eq!(hit, Ok(1));

    let events = events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            ("miss", key.clone()),
            ("dedupe", key.clone()),
            ("hit", key.clone()),
        ]
    );
}

#[tokio::test]
async fn result_fetched_across_invalidation_is_not_stored() {
    let interceptor = memory_interceptor(CacheConfig::default());
    let (started, started_rx) = oneshot::channel::<()>();
    let (release, released) = oneshot::channel::<()>();

    let slow_read = {
        let interceptor = interceptor.clone();
        tokio::spawn(async move {
            interceptor
                .intercept(read("User"), move || async move {
                    let _ = started.send(());
                    let _ = released.await;
                    Ok::<_, String>("stale".to_string())
                })
                .await
        })
    };

    started_rx.await.expect("read started");
    let _ = interceptor
        .intercept(write("User"), || async { Ok::<_, String>(()) })
        .await;
    release.send(()).expect("read waiting");
    assert_eq!(slow_read.await.unwrap(), Ok("stale".to_string()));

    let fresh = interceptor
        .intercept(read("User"), || async { Ok::<_, String>("fresh".to_string()) })
        .await;
    assert_eq!(fresh, Ok("fresh".to_string()));
}

/// Memory backend whose first `set` waits for a release signal.
struct GatedBackend {
    inner: MemoryBackend,
    gate: Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
}

impl GatedBackend {
    fn new() -> (Arc<Self>, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (entered, entered_rx) = oneshot::channel();
        let (release, released) = oneshot::channel();
        let backend = Arc::new(Self {
            inner: MemoryBackend::new(16),
            gate: Mutex::new(Some((entered, released))),
        });
        (backend, entered_rx, release)
    }
}

#[async_trait]
impl CacheBackend for GatedBackend {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(
        &self,
        key: &str,
        value: Bytes,
        ttl_seconds: u64,
        tags: &[String],
    ) -> Result<(), CacheError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some((entered, released)) = gate {
            let _ = entered.send(());
            let _ = released.await;
        }
        self.inner.set(key, value, ttl_seconds, tags).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.delete(key).await
    }

    async fn invalidate_tag(&self, tag: &str) -> Result<u64, CacheError> {
        self.inner.invalidate_tag(tag).await
    }
}

#[tokio::test]
async fn entry_stored_across_invalidation_is_removed() {
    let (backend, entered, release) = GatedBackend::new();
    let interceptor = Interceptor::builder(CacheConfig::default())
        .with_backend(backend.clone())
        .build()
        .expect("valid config");

    let slow_read = {
        let interceptor = interceptor.clone();
        tokio::spawn(async move {
            interceptor
                .intercept(read("User"), || async { Ok::<_, String>("old".to_string()) })
                .await
        })
    };

    entered.await.expect("read is storing");
    let updated = interceptor
        .intercept(write("User"), || async { Ok::<_, String>(()) })
        .await;
    assert_eq!(updated, Ok(()));

    // Issued after the write: must not join the fetch still storing "old".
    let during = interceptor
        .intercept(read("User"), || async { Ok::<_, String>("new".to_string()) })
        .await;
    assert_eq!(during, Ok("new".to_string()));

    release.send(()).expect("read waiting");
    assert_eq!(slow_read.await.unwrap(), Ok("old".to_string()));

    let after = interceptor
        .intercept(read("User"), || async { Ok::<_, String>("new".to_string()) })
        .await;
    assert_eq!(after, Ok("new".to_string()));
    assert_eq!(interceptor.stats().errors, 0);
}

#[tokio::test]
async fn undecodable_entry_is_refetched_and_replaced() {
    let backend = Arc::new(MemoryBackend::new(16));
    let interceptor = Interceptor::builder(CacheConfig::default())
        .with_backend(backend.clone())
        .build()
        .expect("valid config");
    let key = interceptor.key_for(&read("User")).expect("key");
    backend
        .set(
            key.as_str(),
            Bytes::from_static(b"{not json"),
            0,
            &[key.partition().to_string()],
        )
        .await
        .unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let result = interceptor
        .intercept(read("User"), counted(&calls, Ok(users())))
        .await;
    assert_eq!(result, Ok(users()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(interceptor.stats().errors, 1);

    let stored: Option<Vec<User>> = interceptor.store().get(&key).await.unwrap();
    assert_eq!(stored, Some(users()));

    let again = interceptor
        .intercept(read("User"), counted(&calls, Ok(users())))
        .await;
    assert_eq!(again, Ok(users()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unencodable_result_is_returned_but_not_stored() {
    let backend = Arc::new(MemoryBackend::new(16));
    let interceptor = Interceptor::builder(CacheConfig::default())
        .with_backend(backend.clone())
        .build()
        .expect("valid config");
    // JSON object keys must be strings, so tuple keys fail to encode.
    let grid: HashMap<(u32, u32), u32> = HashMap::from([((0, 0), 1), ((1, 2), 3)]);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let result = interceptor
            .intercept(read("Cell"), counted(&calls, Ok(grid.clone())))
            .await;
        assert_eq!(result, Ok(grid.clone()));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(backend.is_empty());
    assert_eq!(interceptor.stats().errors, 2);
}

#[tokio::test(start_paused = true)]
async fn entries_expire_after_model_ttl() {
    let config = CacheConfig::default()
        .with_model(ModelConfig::new("User").with_ttl(Duration::from_secs(5)));
    let interceptor = memory_interceptor(config);
    let calls = Arc::new(AtomicUsize::new(0));

    let _ = interceptor
        .intercept(read("User"), counted(&calls, Ok(1u32)))
        .await;
    tokio::time::advance(Duration::from_secs(3)).await;
    let _ = interceptor
        .intercept(read("User"), counted(&calls, Ok(1u32)))
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(3)).await;
    let _ = interceptor
        .intercept(read("User"), counted(&calls, Ok(1u32)))
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// Every operation fails as if the server were unreachable.
struct UnreachableBackend;

#[async_trait]
impl CacheBackend for UnreachableBackend {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(CacheError::backend_unavailable("connection refused"))
    }

    async fn set(
        &self,
        _key: &str,
        _value: Bytes,
        _ttl_seconds: u64,
        _tags: &[String],
    ) -> Result<(), CacheError> {
        Err(CacheError::backend_unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::backend_unavailable("connection refused"))
    }

    async fn invalidate_tag(&self, _tag: &str) -> Result<u64, CacheError> {
        Err(CacheError::backend_unavailable("connection refused"))
    }
}

#[tokio::test]
async fn unavailable_backend_fails_open() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let interceptor = Interceptor::builder(CacheConfig::default())
        .with_backend(Arc::new(UnreachableBackend))
        .with_hooks(Hooks::new().on_error(move |err| sink.lock().unwrap().push(err.kind())))
        .build()
        .expect("valid config");
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let result = interceptor
            .intercept(read("User"), counted(&calls, Ok(users())))
            .await;
        assert_eq!(result, Ok(users()));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let written = interceptor
        .intercept(write("User"), || async { Ok::<_, String>(1u64) })
        .await;
    assert_eq!(written, Ok(1));

    // get + set per read, then the invalidation.
    let errors = errors.lock().unwrap().clone();
    assert_eq!(errors.len(), 5);
    assert!(errors.iter().all(|kind| *kind == "backend_unavailable"));
    assert_eq!(interceptor.stats().errors, 5);
}

#[tokio::test]
async fn unscoped_calls_never_touch_the_cache() {
    let interceptor = Interceptor::builder(CacheConfig::default())
        .with_backend(Arc::new(UnreachableBackend))
        .build()
        .expect("valid config");

    let raw = CallDescriptor::unscoped(ReadOperation::QueryRaw, json!(["SELECT 1"]));
    let result = interceptor
        .intercept(raw, || async { Ok::<_, String>(1u32) })
        .await;
    assert_eq!(result, Ok(1));

    let raw_write = CallDescriptor::unscoped(WriteOperation::ExecuteRaw, json!(["DELETE"]));
    let result = interceptor
        .intercept(raw_write, || async { Ok::<_, String>(3u64) })
        .await;
    assert_eq!(result, Ok(3));

    assert_eq!(interceptor.stats().errors, 0);
}
