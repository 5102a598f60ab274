use thiserror::Error;

use super::operation::OperationKind;

/// Cache-layer failures. These never reach callers of the interceptor; they are
/// logged, reported to the error hook and degraded to "not cached".
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {message}")]
    BackendUnavailable { message: String },
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
        }
    }

    /// Short label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheError::BackendUnavailable { .. } => "backend_unavailable",
            CacheError::Serialization(_) => "serialization",
        }
    }
}

/// Contradictory or invalid setup. Raised before an interceptor is usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("model `{entity}` is configured more than once")]
    DuplicateModel { entity: String },
    #[error("cache key alias `{alias}` of model `{entity}` collides with configured model `{other}`")]
    AliasCollision {
        alias: String,
        entity: String,
        other: String,
    },
    #[error("invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("write operation `{operation}` cannot be excluded from caching ({scope})")]
    WriteOperationExcluded {
        operation: OperationKind,
        scope: String,
    },
    #[error("invalid cache backend configuration: {reason}")]
    InvalidBackend { reason: String },
}

impl ConfigurationError {
    pub fn invalid_backend(reason: impl Into<String>) -> Self {
        Self::InvalidBackend {
            reason: reason.into(),
        }
    }
}
