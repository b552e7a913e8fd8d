// src/config/validate.rs

use std::collections::HashSet;

use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{MonitorError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = MonitorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.monitor, raw.entries))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_entries(cfg)?;
    validate_monitor_section(cfg)?;
    validate_entries(cfg)?;
    Ok(())
}

fn ensure_has_entries(cfg: &RawConfigFile) -> Result<()> {
    if cfg.entries.is_empty() {
        return Err(MonitorError::ConfigError(
            "config must contain at least one [[entry]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_monitor_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.monitor.capacity == 0 {
        return Err(MonitorError::ConfigError(
            "[monitor].capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.monitor.max_dir_len == 0 {
        return Err(MonitorError::ConfigError(
            "[monitor].max_dir_len must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_entries(cfg: &RawConfigFile) -> Result<()> {
    let mut names = HashSet::new();

    for (i, entry) in cfg.entries.iter().enumerate() {
        if entry.files.is_empty() {
            return Err(MonitorError::ConfigError(format!(
                "entry #{} ('{}') has an empty `files` list",
                i + 1,
                entry.label()
            )));
        }

        if let Some(name) = &entry.name {
            if !names.insert(name.as_str()) {
                return Err(MonitorError::ConfigError(format!(
                    "duplicate entry name '{}'",
                    name
                )));
            }
        }

        if !entry.has_paths() {
            warn!(
                entry = i + 1,
                "entry has only empty paths and will never report a change"
            );
        }
    }
    Ok(())
}
