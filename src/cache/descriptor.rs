//! Call descriptors supplied by the data-access hook.

use serde::Serialize;
use serde_json::Value;

use super::error::CacheError;
use super::operation::OperationKind;

/// Identifies one attempted data-access call.
///
/// An empty entity marks a model-less call (e.g. a raw query issued on the
/// client itself); such calls are never cached and never invalidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    entity: String,
    operation: OperationKind,
    arguments: Value,
}

impl CallDescriptor {
    pub fn new(
        entity: impl Into<String>,
        operation: impl Into<OperationKind>,
        arguments: Value,
    ) -> Self {
        Self {
            entity: entity.into(),
            operation: operation.into(),
            arguments,
        }
    }

    /// Build a descriptor from any serializable argument type.
    pub fn with_arguments<A: Serialize>(
        entity: impl Into<String>,
        operation: impl Into<OperationKind>,
        arguments: &A,
    ) -> Result<Self, CacheError> {
        Ok(Self::new(entity, operation, serde_json::to_value(arguments)?))
    }

    /// A call that is not bound to any entity.
    pub fn unscoped(operation: impl Into<OperationKind>, arguments: Value) -> Self {
        Self::new(String::new(), operation, arguments)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn arguments(&self) -> &Value {
        &self.arguments
    }

    pub fn is_unscoped(&self) -> bool {
        self.entity.is_empty()
    }
}
