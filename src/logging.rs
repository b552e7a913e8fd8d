// src/logging.rs

//! Log subscriber setup.
//!
//! `--log-level` wins over `DIRMON_LOG`, which takes full `EnvFilter`
//! directives (`debug`, `dirmon::watch=trace,info`, ...). Without either,
//! `info` is used. Output goes to stderr; stdout is reserved for the paths of
//! changed entries.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

const LOG_ENV: &str = "DIRMON_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(directive(level));
    }

    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(spec) => EnvFilter::try_new(spec).unwrap_or_else(|err| {
            eprintln!("ignoring invalid {LOG_ENV}='{spec}': {err}");
            EnvFilter::new("info")
        }),
        None => EnvFilter::new("info"),
    }
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
