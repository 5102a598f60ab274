use thiserror::Error;

use crate::cache::{CacheError, ConfigurationError};
use crate::config::LoadError;
use crate::infra::error::InfraError;

/// Failures surfaced by the `querycache` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("cache probe failed: {0}")]
    Probe(#[source] CacheError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn probe(error: CacheError) -> Self {
        Self::Probe(error)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
