//! Cache key derivation.
//!
//! Keys have the shape `<partition>~<descriptor>`, where the partition is the
//! entity name (or its configured alias) and the descriptor is the canonical
//! JSON encoding of the real entity, the operation and its arguments. The
//! partition prefix doubles as the invalidation tag.

use std::fmt;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::descriptor::CallDescriptor;
use super::error::CacheError;
use super::operation::OperationKind;

/// Separates the partition segment from the descriptor segment.
pub const KEY_SEPARATOR: char = '~';

/// A fully derived cache key together with the partition it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheEntryKey {
    partition: String,
    key: String,
}

impl CacheEntryKey {
    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CacheEntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Derives cache keys for descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyBuilder {
    hash_arguments: bool,
}

impl KeyBuilder {
    pub fn new(hash_arguments: bool) -> Self {
        Self { hash_arguments }
    }

    /// Build the key for `descriptor`, stored under `partition`.
    pub fn build(
        &self,
        descriptor: &CallDescriptor,
        partition: &str,
    ) -> Result<CacheEntryKey, CacheError> {
        let encoded = encode_descriptor(
            descriptor.entity(),
            descriptor.operation(),
            descriptor.arguments(),
        )?;

        let segment = if self.hash_arguments {
            let mut hasher = Sha256::new();
            hasher.update(encoded.as_bytes());
            hex::encode(hasher.finalize())
        } else {
            encoded
        };

        Ok(CacheEntryKey {
            partition: partition.to_string(),
            key: format!("{partition}{KEY_SEPARATOR}{segment}"),
        })
    }
}

/// Build an unaliased, unhashed key.
pub fn build_key(
    entity: &str,
    operation: OperationKind,
    arguments: &Value,
) -> Result<CacheEntryKey, CacheError> {
    let descriptor = CallDescriptor::new(entity, operation, arguments.clone());
    KeyBuilder::default().build(&descriptor, entity)
}

fn encode_descriptor(
    entity: &str,
    operation: OperationKind,
    arguments: &Value,
) -> Result<String, CacheError> {
    let mut descriptor = Map::new();
    descriptor.insert("args".to_string(), canonicalize(arguments));
    descriptor.insert("model".to_string(), Value::String(entity.to_string()));
    descriptor.insert(
        "operation".to_string(),
        Value::String(operation.as_str().to_string()),
    );
    Ok(serde_json::to_string(&Value::Object(descriptor))?)
}

/// Rebuild `value` with every object's keys in sorted order.
///
/// Sorting happens explicitly so the encoding stays stable even when
/// `serde_json` is compiled with insertion-ordered maps.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.cmp(right));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
