//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::cache::config::{BackendConfig, CacheConfig};
use crate::cache::policy::PolicySet;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "querycache";
const ENV_PREFIX: &str = "QUERYCACHE";
const DEFAULT_PROBE_ENTITY: &str = "QuerycacheProbe";

/// Command-line arguments for the querycache binary.
#[derive(Debug, Parser)]
#[command(
    name = "querycache",
    version,
    about = "Query-result cache configuration tooling"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "QUERYCACHE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Validate settings and print the resolved cache policies.
    Check(CheckArgs),
    /// Run a set/get/invalidate round trip against the configured backend.
    Probe(ProbeArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Check(CheckArgs::default())
    }
}

impl Command {
    fn overrides(&self) -> &Overrides {
        match self {
            Command::Check(args) => &args.overrides,
            Command::Probe(args) => &args.overrides,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Debug, Args, Clone)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub overrides: Overrides,

    /// Partition the probe entry is written to and invalidated from.
    #[arg(long = "entity", value_name = "NAME", default_value = DEFAULT_PROBE_ENTITY)]
    pub entity: String,
}

impl Default for ProbeArgs {
    fn default() -> Self {
        Self {
            overrides: Overrides::default(),
            entity: DEFAULT_PROBE_ENTITY.to_string(),
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Use the Redis backend at this URL.
    #[arg(long = "redis-url", value_name = "URL")]
    pub redis_url: Option<String>,

    /// Override the TTL applied to models without their own.
    #[arg(long = "default-ttl-seconds", value_name = "SECONDS")]
    pub default_ttl_seconds: Option<u64>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(command) => raw.apply_overrides(command.overrides()),
        None => raw.apply_overrides(&Overrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    cache: CacheConfig,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.redis_url.as_ref() {
            match &mut self.cache.backend {
                BackendConfig::Redis { url: current, .. } => *current = url.clone(),
                backend => *backend = BackendConfig::redis(url.clone()),
            }
        }
        if let Some(ttl) = overrides.default_ttl_seconds {
            self.cache.default_ttl_seconds = ttl;
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { logging, cache } = raw;

        let logging = build_logging_settings(logging)?;
        let cache = validate_cache_config(cache)?;

        Ok(Self { logging, cache })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn validate_cache_config(cache: CacheConfig) -> Result<CacheConfig, LoadError> {
    match &cache.backend {
        BackendConfig::Memory { size: 0 } => {
            return Err(LoadError::invalid(
                "cache.backend.size",
                "must be greater than zero",
            ));
        }
        BackendConfig::Redis { pool_size: 0, .. } => {
            return Err(LoadError::invalid(
                "cache.backend.pool_size",
                "must be greater than zero",
            ));
        }
        BackendConfig::Redis { url, .. } if url.trim().is_empty() => {
            return Err(LoadError::invalid("cache.backend.url", "must not be empty"));
        }
        _ => {}
    }

    PolicySet::resolve(&cache).map_err(|err| LoadError::invalid("cache", err.to_string()))?;
    Ok(cache)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
