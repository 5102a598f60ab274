//! Query-result cache.
//!
//! Every data-access call is described by a [`CallDescriptor`] and classified
//! against the resolved [`PolicySet`]:
//!
//! - **Reads** are served cache-aside. Keys are `<partition>~<descriptor>`,
//!   concurrent identical reads share one fetch.
//! - **Writes** execute first and, on success, invalidate their partition and
//!   the partitions of configured related entities.
//! - **Everything else** passes through untouched.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! default_ttl_seconds = 60
//! cache_only_configured_models = false
//!
//! [[cache.models]]
//! entity = "User"
//! related_entities = ["Post"]
//! # ... see config.rs for all options
//! ```

pub mod backend;
pub mod classifier;
pub mod config;
pub mod dedup;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod interceptor;
pub mod invalidation;
pub mod keys;
pub(crate) mod lock;
pub mod operation;
pub mod policy;
pub(crate) mod registry;
pub mod store;

pub use backend::CacheBackend;
pub use classifier::Classification;
pub use config::{BackendConfig, CacheConfig, ModelConfig};
pub use dedup::DedupCoordinator;
pub use descriptor::CallDescriptor;
pub use error::{CacheError, ConfigurationError};
pub use events::{Hooks, StatsSnapshot};
pub use interceptor::{Interceptor, InterceptorBuilder};
pub use invalidation::InvalidationReport;
pub use keys::{CacheEntryKey, KEY_SEPARATOR, build_key};
pub use operation::{OperationKind, ReadOperation, WriteOperation};
pub use policy::{GlobalPolicy, ModelPolicy, PolicySet};
pub use store::{CacheStore, Transformer};
