//! Partition invalidation after successful writes.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use tracing::{info, instrument};

use super::events::{ErrorStage, Observer};
use super::policy::{ModelPolicy, PolicySet};
use super::store::CacheStore;

/// Monotonic per-partition counters.
///
/// A read records the epoch of its partition before executing and only stores
/// its result if the epoch is unchanged afterwards, so a result fetched
/// across an invalidation is never written back.
#[derive(Debug, Default)]
pub struct PartitionEpochs {
    epochs: DashMap<String, u64>,
}

impl PartitionEpochs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self, partition: &str) -> u64 {
        self.epochs.get(partition).map(|epoch| *epoch).unwrap_or(0)
    }

    /// Advance `partition` and return its new epoch.
    pub fn bump(&self, partition: &str) -> u64 {
        let mut epoch = self.epochs.entry(partition.to_string()).or_insert(0);
        *epoch += 1;
        *epoch
    }
}

/// Outcome of one write's invalidation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Partitions targeted, in name order.
    pub partitions: Vec<String>,
    /// Entries removed across all partitions that succeeded.
    pub removed: u64,
    /// Partitions whose invalidation failed.
    pub failed: Vec<String>,
}

impl InvalidationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Clears the written entity's partition and those of its related entities.
pub(crate) struct InvalidationPropagator {
    store: CacheStore,
    policies: Arc<PolicySet>,
    epochs: Arc<PartitionEpochs>,
    observer: Arc<Observer>,
}

impl InvalidationPropagator {
    pub(crate) fn new(
        store: CacheStore,
        policies: Arc<PolicySet>,
        epochs: Arc<PartitionEpochs>,
        observer: Arc<Observer>,
    ) -> Self {
        Self {
            store,
            policies,
            epochs,
            observer,
        }
    }

    /// Partitions touched by a write to `entity`.
    pub(crate) fn targets(&self, entity: &str, model: Option<&ModelPolicy>) -> BTreeSet<String> {
        let mut targets = BTreeSet::new();
        targets.insert(self.policies.partition_for(entity).to_string());
        for related in model.into_iter().flat_map(ModelPolicy::related_entities) {
            targets.insert(self.policies.partition_for(related).to_string());
        }
        targets
    }

    /// Invalidate every target concurrently. Failures are reported and
    /// skipped; they never stop the remaining targets.
    #[instrument(skip(self, model), fields(cache = self.store.backend_name()))]
    pub(crate) async fn on_write_success(
        &self,
        entity: &str,
        model: Option<&ModelPolicy>,
    ) -> InvalidationReport {
        let targets = self.targets(entity, model);
        for partition in &targets {
            self.epochs.bump(partition);
        }

        let results = join_all(targets.iter().map(|partition| async move {
            (partition, self.store.invalidate(partition).await)
        }))
        .await;

        let mut report = InvalidationReport {
            partitions: targets.iter().cloned().collect(),
            ..InvalidationReport::default()
        };
        for (partition, result) in results {
            match result {
                Ok(removed) => {
                    self.observer.invalidated(partition, removed);
                    report.removed += removed;
                }
                Err(err) => {
                    self.observer.error(ErrorStage::Invalidate, partition, &err);
                    report.failed.push(partition.clone());
                }
            }
        }

        info!(
            partitions = report.partitions.len(),
            removed = report.removed,
            failed = report.failed.len(),
            "Write invalidation complete"
        );
        report
    }
}
