//! Tracing subscriber installation and metric descriptions.

use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::events::{
    METRIC_DEDUPE_TOTAL, METRIC_ERROR_TOTAL, METRIC_FETCH_MS, METRIC_HIT_TOTAL,
    METRIC_INVALIDATE_TOTAL, METRIC_MISS_TOTAL,
};
use crate::config::{LogFormat, LoggingSettings};

use super::cache::METRIC_MEMORY_EVICT_TOTAL;
use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

/// Register descriptions for every metric this crate emits. Safe to call more than once.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_HIT_TOTAL,
            Unit::Count,
            "Total number of reads served from the cache."
        );
        describe_counter!(
            METRIC_MISS_TOTAL,
            Unit::Count,
            "Total number of reads that executed the underlying call."
        );
        describe_counter!(
            METRIC_DEDUPE_TOTAL,
            Unit::Count,
            "Total number of reads that joined an in-flight fetch."
        );
        describe_counter!(
            METRIC_ERROR_TOTAL,
            Unit::Count,
            "Total number of recovered cache-layer failures, by stage."
        );
        describe_counter!(
            METRIC_INVALIDATE_TOTAL,
            Unit::Count,
            "Total number of partition invalidations."
        );
        describe_counter!(
            METRIC_MEMORY_EVICT_TOTAL,
            Unit::Count,
            "Total number of in-memory entries evicted due to capacity."
        );
        describe_histogram!(
            METRIC_FETCH_MS,
            Unit::Milliseconds,
            "Latency of the underlying call on a cache miss, in milliseconds."
        );
    });
}
