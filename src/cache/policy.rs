//! Resolved, immutable cache policies.
//!
//! Built once from a [`CacheConfig`] when the interceptor is set up and looked
//! up by entity name on every call.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

use super::config::CacheConfig;
use super::error::ConfigurationError;
use super::keys::KEY_SEPARATOR;
use super::operation::OperationKind;

/// Per-entity policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPolicy {
    entity: String,
    ttl: Option<Duration>,
    cache_key_alias: Option<String>,
    excluded_operations: HashSet<OperationKind>,
    related_entities: BTreeSet<String>,
}

impl ModelPolicy {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Non-zero TTL configured for this entity, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn cache_key_alias(&self) -> Option<&str> {
        self.cache_key_alias.as_deref()
    }

    /// The partition this entity's entries are stored and invalidated under.
    pub fn partition(&self) -> &str {
        self.cache_key_alias.as_deref().unwrap_or(&self.entity)
    }

    pub fn excludes(&self, operation: OperationKind) -> bool {
        self.excluded_operations.contains(&operation)
    }

    pub fn excluded_operations(&self) -> impl Iterator<Item = OperationKind> + '_ {
        self.excluded_operations.iter().copied()
    }

    pub fn related_entities(&self) -> impl Iterator<Item = &str> {
        self.related_entities.iter().map(String::as_str)
    }
}

/// Policy applied to every entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobalPolicy {
    default_ttl: Duration,
    excluded_entities: HashSet<String>,
    excluded_operations: HashSet<OperationKind>,
    cache_only_configured_models: bool,
}

impl GlobalPolicy {
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn excludes_entity(&self, entity: &str) -> bool {
        self.excluded_entities.contains(entity)
    }

    pub fn excludes_operation(&self, operation: OperationKind) -> bool {
        self.excluded_operations.contains(&operation)
    }

    pub fn cache_only_configured_models(&self) -> bool {
        self.cache_only_configured_models
    }
}

/// All policies, keyed by entity name.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    global: GlobalPolicy,
    models: HashMap<String, ModelPolicy>,
    hash_arguments: bool,
}

impl PolicySet {
    /// Validate `config` and resolve it into an immutable policy set.
    pub fn resolve(config: &CacheConfig) -> Result<Self, ConfigurationError> {
        for entity in &config.excluded_entities {
            validate_name(entity)?;
        }
        reject_write_exclusions(&config.excluded_operations, "global")?;

        let mut models = HashMap::with_capacity(config.models.len());
        for model in &config.models {
            validate_name(&model.entity)?;
            if let Some(alias) = model.cache_key_alias.as_deref() {
                validate_name(alias)?;
            }
            for related in &model.related_entities {
                validate_name(related)?;
            }
            reject_write_exclusions(
                &model.excluded_operations,
                &format!("model `{}`", model.entity),
            )?;

            let policy = ModelPolicy {
                entity: model.entity.clone(),
                ttl: model
                    .ttl_seconds
                    .filter(|seconds| *seconds > 0)
                    .map(Duration::from_secs),
                cache_key_alias: model.cache_key_alias.clone(),
                excluded_operations: model.excluded_operations.iter().copied().collect(),
                related_entities: model
                    .related_entities
                    .iter()
                    .filter(|related| **related != model.entity)
                    .cloned()
                    .collect(),
            };

            if models.insert(model.entity.clone(), policy).is_some() {
                return Err(ConfigurationError::DuplicateModel {
                    entity: model.entity.clone(),
                });
            }
        }

        // An alias may be shared by several models, but it must not take over
        // the partition of another configured entity.
        for policy in models.values() {
            let Some(alias) = policy.cache_key_alias() else {
                continue;
            };
            if alias != policy.entity && models.contains_key(alias) {
                return Err(ConfigurationError::AliasCollision {
                    alias: alias.to_string(),
                    entity: policy.entity.clone(),
                    other: alias.to_string(),
                });
            }
        }

        Ok(Self {
            global: GlobalPolicy {
                default_ttl: config.default_ttl(),
                excluded_entities: config.excluded_entities.iter().cloned().collect(),
                excluded_operations: config.excluded_operations.iter().copied().collect(),
                cache_only_configured_models: config.cache_only_configured_models,
            },
            models,
            hash_arguments: config.hash_arguments,
        })
    }

    pub fn global(&self) -> &GlobalPolicy {
        &self.global
    }

    pub fn model(&self, entity: &str) -> Option<&ModelPolicy> {
        self.models.get(entity)
    }

    /// Models in entity-name order.
    pub fn models(&self) -> Vec<&ModelPolicy> {
        let mut models: Vec<&ModelPolicy> = self.models.values().collect();
        models.sort_by(|left, right| left.entity.cmp(&right.entity));
        models
    }

    /// Partition for `entity`: its alias when configured, else its name.
    pub fn partition_for<'a>(&'a self, entity: &'a str) -> &'a str {
        self.model(entity)
            .map(ModelPolicy::partition)
            .unwrap_or(entity)
    }

    /// Model TTL when set, otherwise the global default.
    pub fn ttl_for(&self, entity: &str) -> Duration {
        self.model(entity)
            .and_then(ModelPolicy::ttl)
            .unwrap_or(self.global.default_ttl)
    }

    pub fn hash_arguments(&self) -> bool {
        self.hash_arguments
    }
}

fn validate_name(name: &str) -> Result<(), ConfigurationError> {
    if name.trim().is_empty() {
        return Err(ConfigurationError::InvalidName {
            name: name.to_string(),
            reason: "must not be empty",
        });
    }
    if name.contains(KEY_SEPARATOR) {
        return Err(ConfigurationError::InvalidName {
            name: name.to_string(),
            reason: "must not contain the key separator `~`",
        });
    }
    Ok(())
}

fn reject_write_exclusions(
    operations: &[OperationKind],
    scope: &str,
) -> Result<(), ConfigurationError> {
    match operations.iter().find(|operation| operation.is_write()) {
        Some(operation) => Err(ConfigurationError::WriteOperationExcluded {
            operation: *operation,
            scope: scope.to_string(),
        }),
        None => Ok(()),
    }
}
