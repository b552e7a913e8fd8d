// src/config/model.rs

use serde::Deserialize;

use crate::types::{DEFAULT_CAPACITY, DEFAULT_MAX_DIR_LEN, MonitorOptions};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [monitor]
/// capacity = 32
/// max_dir_len = 128
/// timeout_ms = 5000
///
/// [[entry]]
/// name = "dark"
/// files = ["hss/dark.hss", "hss/subs/_vars.hss"]
/// cmd = "hss hss/dark.hss"
/// ```
///
/// Entry order in the file is the order results are reported in.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub monitor: MonitorSection,

    #[serde(default, rename = "entry")]
    pub entries: Vec<EntryConfig>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub monitor: MonitorSection,
    pub entries: Vec<EntryConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(monitor: MonitorSection, entries: Vec<EntryConfig>) -> Self {
        Self { monitor, entries }
    }

    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            capacity: self.monitor.capacity,
            max_dir_len: self.monitor.max_dir_len,
        }
    }

    /// File lists of every entry, in file order, as the monitor consumes them.
    pub fn entry_files(&self) -> Vec<Vec<String>> {
        self.entries.iter().map(|e| e.files.clone()).collect()
    }
}

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    /// Maximum number of directories watched at once.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Derived directory strings longer than this (in bytes) are truncated.
    #[serde(default = "default_max_dir_len")]
    pub max_dir_len: usize,

    /// Optional per-cycle timeout in milliseconds. Unset waits forever.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_max_dir_len() -> usize {
    DEFAULT_MAX_DIR_LEN
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_dir_len: default_max_dir_len(),
            timeout_ms: None,
        }
    }
}

/// One `[[entry]]`: a primary file plus the files it depends on.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryConfig {
    /// Optional label used in logs and passed to `cmd`.
    #[serde(default)]
    pub name: Option<String>,

    /// Primary file first, then dependencies. Empty strings are placeholders.
    pub files: Vec<String>,

    /// Shell command to run when the entry changes.
    #[serde(default)]
    pub cmd: Option<String>,
}

impl EntryConfig {
    pub fn primary(&self) -> &str {
        self.files.first().map(String::as_str).unwrap_or("")
    }

    /// `name` if set, otherwise the primary file.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.primary())
    }

    pub fn has_paths(&self) -> bool {
        self.files.iter().any(|f| !f.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_sections() {
        let raw: RawConfigFile = toml::from_str(
            r#"
[[entry]]
files = ["a.txt"]
"#,
        )
        .unwrap();

        assert_eq!(raw.monitor.capacity, 32);
        assert_eq!(raw.monitor.max_dir_len, 128);
        assert_eq!(raw.monitor.timeout_ms, None);
        assert_eq!(raw.entries.len(), 1);
        assert_eq!(raw.entries[0].label(), "a.txt");
    }

    #[test]
    fn entries_keep_file_order() {
        let raw: RawConfigFile = toml::from_str(
            r#"
[[entry]]
name = "style"
files = ["hss/style.hss"]

[[entry]]
name = "dark"
files = ["hss/dark.hss", "hss/subs/_vars.hss"]
cmd = "make dark"
"#,
        )
        .unwrap();

        let names: Vec<_> = raw.entries.iter().map(|e| e.label()).collect();
        assert_eq!(names, vec!["style", "dark"]);
        assert_eq!(raw.entries[1].primary(), "hss/dark.hss");
        assert_eq!(raw.entries[1].cmd.as_deref(), Some("make dark"));
    }

    #[test]
    fn entry_without_paths() {
        let entry = EntryConfig {
            name: None,
            files: vec![String::new()],
            cmd: None,
        };
        assert!(!entry.has_paths());
        assert_eq!(entry.label(), "");
    }
}
