// src/errors.rs

//! Crate-wide error types.
//!
//! `MonitorError` is what public operations return. Per-directory failures
//! (`SubscribeError`, `AddError`) are separate types because they never abort
//! a cycle; the registry logs them and moves on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The multi-directory wait itself failed. The registry has been torn
    /// down by the time the caller sees this.
    #[error("waiting on watched directories failed: {0}")]
    WaitFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A directory could not be subscribed to for change notifications.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot watch '{dir}': {reason} (os error code: {code:?})")]
pub struct SubscribeError {
    pub dir: String,
    /// Raw OS error code, when the backend reported one.
    pub code: Option<i32>,
    pub reason: String,
}

/// Why `HandleRegistry::add` did not register a directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddError {
    #[error("registry full ({capacity} directories), not watching '{dir}'")]
    CapacityExceeded { dir: String, capacity: usize },

    #[error(transparent)]
    Subscribe(#[from] SubscribeError),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MonitorError>;
