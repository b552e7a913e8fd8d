// src/watch/cycle.rs

//! One blocking watch cycle over a caller-supplied entry list.
//!
//! An entry is a list of file paths: the first is the primary file, the rest
//! are files it depends on. Empty strings are placeholders and are skipped.

use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, error, info};

use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{CycleOutcome, MonitorOptions, WaitOutcome};
use crate::watch::notifier::Notifier;
use crate::watch::path_utils::derive_directory;
use crate::watch::registry::HandleRegistry;

/// Owns the directory registry and runs watch cycles against it.
///
/// Directories are only added or removed at the start of a cycle; they stay
/// fixed while the cycle waits, including across false-positive wake-ups.
#[derive(Debug)]
pub struct Monitor<N: Notifier, F: FileSystem = RealFileSystem> {
    registry: HandleRegistry<N>,
    fs: F,
    max_dir_len: usize,
}

impl<N: Notifier> Monitor<N, RealFileSystem> {
    pub fn new(notifier: N, options: MonitorOptions) -> Self {
        Self::with_fs(notifier, RealFileSystem, options)
    }
}

impl<N: Notifier, F: FileSystem> Monitor<N, F> {
    pub fn with_fs(notifier: N, fs: F, options: MonitorOptions) -> Self {
        Self {
            registry: HandleRegistry::new(notifier, options.capacity),
            fs,
            max_dir_len: options.max_dir_len,
        }
    }

    pub fn registry(&self) -> &HandleRegistry<N> {
        &self.registry
    }

    /// Watched directories in registration order.
    pub fn directories(&self) -> Vec<String> {
        self.registry.directories().map(str::to_string).collect()
    }

    /// Run one cycle with no timeout.
    ///
    /// Blocks until a file of some entry is written after the cycle started,
    /// then returns one flag per entry.
    pub fn run<S: AsRef<str>>(&mut self, entries: &[Vec<S>]) -> Result<CycleOutcome> {
        self.run_with_timeout(entries, None)
    }

    /// Run one cycle; `timeout` bounds the whole wait, retries included.
    ///
    /// On a fatal wait error the registry is torn down before the error is
    /// returned.
    pub fn run_with_timeout<S: AsRef<str>>(
        &mut self,
        entries: &[Vec<S>],
        timeout: Option<Duration>,
    ) -> Result<CycleOutcome> {
        let cycle_start = SystemTime::now();

        let live = self.sync(entries);
        if live == 0 {
            debug!(entries = entries.len(), "no directories to watch");
            return Ok(CycleOutcome::NothingToWatch);
        }

        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));

            match self.registry.wait_any(remaining) {
                Ok(WaitOutcome::Signaled(_)) => {}
                Ok(WaitOutcome::TimedOut) => return Ok(CycleOutcome::TimedOut),
                Ok(WaitOutcome::Interrupted) => return Ok(CycleOutcome::Interrupted),
                Err(err) => {
                    error!(error = %err, "wait on watched directories failed; releasing all");
                    self.registry.teardown();
                    return Err(err);
                }
            }

            if let Some(flags) = self.classify(entries, cycle_start) {
                return Ok(CycleOutcome::Changed(flags));
            }

            debug!("wake-up matched no tracked file; waiting again");
        }
    }

    /// Bring the registry in line with the directories of `entries`.
    ///
    /// Returns the number of live directories afterwards.
    pub fn sync<S: AsRef<str>>(&mut self, entries: &[Vec<S>]) -> usize {
        self.registry.begin_cycle();

        for path in entries
            .iter()
            .flat_map(|entry| entry.iter())
            .map(|p| p.as_ref())
            .filter(|p| !p.is_empty())
        {
            let dir = derive_directory(path, self.max_dir_len);
            // Failures are logged by the registry and only affect this directory.
            let _ = self.registry.add(&dir);
        }

        let released = self.registry.sweep();
        if released > 0 {
            debug!(released, live = self.registry.len(), "registry swept");
        }
        self.registry.len()
    }

    /// Flag every entry with a file written strictly after `since`.
    ///
    /// Returns `None` if no entry qualifies. Unreadable paths are skipped.
    pub fn classify<S: AsRef<str>>(
        &self,
        entries: &[Vec<S>],
        since: SystemTime,
    ) -> Option<Vec<bool>> {
        let mut found = false;

        let flags = entries
            .iter()
            .map(|entry| {
                let changed = self.first_changed(entry, since);
                if let Some(pos) = changed {
                    found = true;
                    let file = entry[pos].as_ref();
                    if pos == 0 {
                        info!(file, "changed");
                    } else {
                        info!(file, updates = entry[0].as_ref(), "changed");
                    }
                }
                changed.is_some()
            })
            .collect();

        found.then_some(flags)
    }

    /// Position of the first path in `entry` newer than `since`.
    fn first_changed<S: AsRef<str>>(&self, entry: &[S], since: SystemTime) -> Option<usize> {
        entry.iter().position(|path| {
            let path = path.as_ref();
            if path.is_empty() {
                return false;
            }
            match self.fs.modified(Path::new(path)) {
                Ok(modified) => modified > since,
                Err(err) => {
                    debug!(path, error = %err, "skipping unreadable file");
                    false
                }
            }
        })
    }

    /// Release every watched directory.
    pub fn teardown(&mut self) {
        self.registry.teardown();
    }
}
