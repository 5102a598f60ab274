//! Cacheability classification.

use std::fmt;

use super::descriptor::CallDescriptor;
use super::policy::{GlobalPolicy, ModelPolicy};

/// What the interceptor should do with a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A read that may be served from and stored in the cache.
    Cacheable,
    /// Execute directly without touching the cache.
    NotCacheable,
    /// A write; invalidate after it succeeds.
    Invalidates,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Classification::Cacheable => "cacheable",
            Classification::NotCacheable => "not_cacheable",
            Classification::Invalidates => "invalidates",
        })
    }
}

/// Classify `descriptor` against the global and (optional) model policy.
///
/// Exclusions always win: entity exclusion is checked first, then global
/// operation exclusion, then the model's own exclusions.
pub fn classify(
    descriptor: &CallDescriptor,
    global: &GlobalPolicy,
    model: Option<&ModelPolicy>,
) -> Classification {
    if descriptor.is_unscoped() {
        return Classification::NotCacheable;
    }

    let operation = descriptor.operation();
    if operation.is_write() {
        return Classification::Invalidates;
    }

    if global.excludes_entity(descriptor.entity()) {
        return Classification::NotCacheable;
    }

    if global.excludes_operation(operation) {
        return Classification::NotCacheable;
    }

    match model {
        Some(policy) if policy.excludes(operation) => Classification::NotCacheable,
        Some(_) => Classification::Cacheable,
        None if global.cache_only_configured_models() => Classification::NotCacheable,
        None => Classification::Cacheable,
    }
}
