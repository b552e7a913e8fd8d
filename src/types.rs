// src/types.rs

/// Default number of directories the registry may watch at once.
pub const DEFAULT_CAPACITY: usize = 32;

/// Default maximum length, in bytes, of a derived directory string.
pub const DEFAULT_MAX_DIR_LEN: usize = 128;

/// Runtime limits for a [`crate::watch::Monitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Maximum number of live directory subscriptions.
    pub capacity: usize,
    /// Derived directory strings are clamped to this many bytes.
    pub max_dir_len: usize,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_dir_len: DEFAULT_MAX_DIR_LEN,
        }
    }
}

/// Result of `HandleRegistry::wait_any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The directory at this registry index signalled (and has been re-armed).
    Signaled(usize),
    TimedOut,
    Interrupted,
}

/// Result of one watch cycle.
///
/// The fatal wait error is not a variant here; it is the `Err` side of the
/// `Result` that `Monitor::run` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// One flag per entry, in input order. At least one flag is `true`.
    Changed(Vec<bool>),
    /// The entry list produced no watchable directory.
    NothingToWatch,
    /// The cycle's deadline passed without a tracked file changing.
    TimedOut,
    /// An `Interrupter` woke the wait.
    Interrupted,
}

impl CycleOutcome {
    /// Indices of the entries flagged as changed. Empty for every other outcome.
    pub fn changed_indices(&self) -> Vec<usize> {
        match self {
            CycleOutcome::Changed(flags) => flags
                .iter()
                .enumerate()
                .filter(|(_, changed)| **changed)
                .map(|(i, _)| i)
                .collect(),
            _ => Vec::new(),
        }
    }
}
