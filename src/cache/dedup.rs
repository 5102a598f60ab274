//! Single-flight coordination of cache fetches.
//!
//! The first caller for a key becomes the leader and registers a shared,
//! lazily started fetch; later callers for the same key attach to it as
//! waiters. The registry only holds a weak handle, so the fetch is dropped as
//! soon as every attached caller has gone away, and a guard living inside the
//! fetch removes the registration when it completes or is dropped.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use tracing::trace;

type SharedFetch<V> = Shared<BoxFuture<'static, V>>;
type WeakFetch<V> = WeakShared<BoxFuture<'static, V>>;

/// How a caller is attached to an in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Registered the fetch; its producer runs on behalf of everyone.
    Leader,
    /// Joined a fetch registered by another caller.
    Waiter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Leader => "leader",
            Role::Waiter => "waiter",
        })
    }
}

struct InFlightRequest {
    id: u64,
    pending: Box<dyn Any + Send + Sync>,
}

/// A caller's handle on a (possibly shared) fetch.
#[must_use = "a fetch does nothing unless waited on"]
pub struct Fetch<V> {
    role: Role,
    pending: SharedFetch<V>,
}

impl<V: Clone> Fetch<V> {
    pub fn role(&self) -> Role {
        self.role
    }

    /// Wait for the shared result. Dropping this future detaches the caller
    /// without cancelling the fetch for the others.
    pub async fn wait(self) -> V {
        self.pending.await
    }
}

/// At most one in-flight fetch per key within the process.
#[derive(Default)]
pub struct DedupCoordinator {
    in_flight: Arc<DashMap<String, InFlightRequest>>,
    next_id: AtomicU64,
}

impl DedupCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the fetch for `key`, registering one built from `producer`
    /// when none is in flight.
    ///
    /// `producer` is only invoked when the returned fetch is first polled, and
    /// never when the caller joins as a waiter.
    pub fn join<V, F, Fut>(&self, key: &str, producer: F) -> Fetch<V>
    where
        V: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = V> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = RegistrationGuard {
            in_flight: Arc::clone(&self.in_flight),
            key: key.to_string(),
            id,
        };
        let candidate: SharedFetch<V> = async move {
            let _guard = guard;
            producer().await
        }
        .boxed()
        .shared();

        let (fetch, unused) = self.attach(key, id, candidate);
        // Dropped outside the shard lock: dropping it runs its guard, which
        // needs the map.
        drop(unused);
        fetch
    }

    /// Run `producer` for `key` unless a fetch is already in flight, and return
    /// the shared result either way.
    pub async fn fetch_once<V, F, Fut>(&self, key: &str, producer: F) -> V
    where
        V: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = V> + Send + 'static,
    {
        self.join(key, producer).wait().await
    }

    /// Number of keys with a registered fetch.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    fn attach<V>(
        &self,
        key: &str,
        id: u64,
        candidate: SharedFetch<V>,
    ) -> (Fetch<V>, Option<SharedFetch<V>>)
    where
        V: Clone + Send + Sync + 'static,
    {
        let Some(weak) = candidate.downgrade() else {
            return (leader(candidate), None);
        };
        let registration = InFlightRequest {
            id,
            pending: Box::new(weak),
        };

        match self.in_flight.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(registration);
                (leader(candidate), None)
            }
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get().pending.downcast_ref::<WeakFetch<V>>();
                match existing.map(WeakShared::upgrade) {
                    Some(Some(pending)) => {
                        trace!(key, "Joining in-flight fetch");
                        (
                            Fetch {
                                role: Role::Waiter,
                                pending,
                            },
                            Some(candidate),
                        )
                    }
                    // Every caller of the registered fetch is gone; take over.
                    Some(None) => {
                        occupied.insert(registration);
                        (leader(candidate), None)
                    }
                    // Same key, different result type: run on our own without
                    // displacing the registered fetch.
                    None => (leader(candidate), None),
                }
            }
        }
    }
}

fn leader<V>(pending: SharedFetch<V>) -> Fetch<V> {
    Fetch {
        role: Role::Leader,
        pending,
    }
}

struct RegistrationGuard {
    in_flight: Arc<DashMap<String, InFlightRequest>>,
    key: String,
    id: u64,
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.in_flight
            .remove_if(&self.key, |_, request| request.id == self.id);
    }
}
