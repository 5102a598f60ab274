//! Query-result caching for data-access layers.
//!
//! An [`Interceptor`](cache::Interceptor) sits between callers and a data
//! store. Cacheable reads are served cache-aside with per-key request
//! coalescing; successful writes invalidate the partitions they touch; cache
//! failures degrade to direct execution.

pub mod cache;
pub mod config;
pub mod error;
pub mod infra;
