#![allow(dead_code)]

use dirmon::config::{ConfigFile, EntryConfig, MonitorSection, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                monitor: MonitorSection::default(),
                entries: Vec::new(),
            },
        }
    }

    pub fn with_entry(mut self, entry: EntryConfig) -> Self {
        self.config.entries.push(entry);
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.monitor.capacity = capacity;
        self
    }

    pub fn with_max_dir_len(mut self, max_dir_len: usize) -> Self {
        self.config.monitor.max_dir_len = max_dir_len;
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.config.monitor.timeout_ms = Some(ms);
        self
    }

    /// The unvalidated config, for tests that expect validation to fail.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `EntryConfig`.
pub struct EntryConfigBuilder {
    entry: EntryConfig,
}

impl EntryConfigBuilder {
    /// Start an entry with its primary file.
    pub fn new(primary: &str) -> Self {
        Self {
            entry: EntryConfig {
                name: None,
                files: vec![primary.to_string()],
                cmd: None,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.entry.name = Some(name.to_string());
        self
    }

    pub fn depends_on(mut self, file: &str) -> Self {
        self.entry.files.push(file.to_string());
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.entry.cmd = Some(cmd.to_string());
        self
    }

    pub fn build(self) -> EntryConfig {
        self.entry
    }
}
