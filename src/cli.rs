// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `dirmon`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dirmon",
    version,
    about = "Block until a group of watched files changes, then report which groups changed.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Stop after the first completed cycle.
    #[arg(long)]
    pub once: bool,

    /// Give up on a cycle after this many milliseconds and start a new one.
    ///
    /// Overrides `[monitor].timeout_ms`.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DIRMON_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print entries and derived directories, but don't watch.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
