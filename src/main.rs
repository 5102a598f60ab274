use std::{
    process,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use querycache::{
    cache::{CallDescriptor, Interceptor, PolicySet, ReadOperation},
    config::{self, Command, ProbeArgs, Settings},
    error::AppError,
    infra::telemetry,
};
use serde_json::{Value, json};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

const PROBE_TTL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    let command = cli_args.command.unwrap_or_default();

    telemetry::init(&settings.logging)?;

    match command {
        Command::Check(_) => run_check(settings),
        Command::Probe(args) => run_probe(settings, args).await,
    }
}

fn run_check(settings: Settings) -> Result<(), AppError> {
    let policies = PolicySet::resolve(&settings.cache)?;
    let global = policies.global();

    info!(
        backend = settings.cache.backend.kind(),
        default_ttl_seconds = global.default_ttl().as_secs(),
        cache_only_configured_models = global.cache_only_configured_models(),
        excluded_entities = ?settings.cache.excluded_entities,
        excluded_operations = ?settings.cache.excluded_operations,
        hash_arguments = policies.hash_arguments(),
        "Global cache policy"
    );

    for model in policies.models() {
        let excluded: Vec<_> = model
            .excluded_operations()
            .map(|operation| operation.as_str())
            .collect();
        let related: Vec<_> = model.related_entities().collect();
        info!(
            entity = model.entity(),
            partition = model.partition(),
            ttl_seconds = policies.ttl_for(model.entity()).as_secs(),
            excluded_operations = ?excluded,
            related_entities = ?related,
            "Model cache policy"
        );
    }

    // Builds the backend too, so malformed backend parameters fail here.
    Interceptor::new(settings.cache)?;
    info!("Configuration is valid");
    Ok(())
}

async fn run_probe(settings: Settings, args: ProbeArgs) -> Result<(), AppError> {
    let interceptor = Interceptor::new(settings.cache)?;
    let store = interceptor.store();
    let started_at = Instant::now();

    let descriptor = CallDescriptor::new(
        args.entity.as_str(),
        ReadOperation::FindUnique,
        json!({ "probe": probe_nonce() }),
    );
    let key = interceptor.key_for(&descriptor).map_err(AppError::probe)?;
    let payload = json!({ "ok": true });

    store
        .set(&key, &payload, Some(PROBE_TTL))
        .await
        .map_err(AppError::probe)?;

    let fetched: Option<Value> = store.get(&key).await.map_err(AppError::probe)?;
    if fetched.as_ref() != Some(&payload) {
        return Err(AppError::unexpected(format!(
            "probe entry `{key}` was not readable after being written"
        )));
    }

    let removed = store
        .invalidate(key.partition())
        .await
        .map_err(AppError::probe)?;
    let leftover: Option<Value> = store.get(&key).await.map_err(AppError::probe)?;
    if leftover.is_some() {
        warn!(key = key.as_str(), "Probe entry survived invalidation");
    }

    info!(
        backend = store.backend_name(),
        partition = key.partition(),
        removed,
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "Cache backend probe succeeded"
    );
    Ok(())
}

fn probe_nonce() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("{}-{nanos}", process::id())
}
