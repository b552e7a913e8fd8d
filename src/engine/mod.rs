// src/engine/mod.rs

//! Orchestration engine for dirmon.
//!
//! The monitor itself is blocking and single-threaded, so it runs on a
//! dedicated blocking thread ([`runtime::spawn_monitor_loop`]) and reports
//! [`MonitorEvent`]s over a channel. The async side ([`runtime::Runtime`])
//! prints changed entries and runs their commands.

use std::time::Duration;

/// Events flowing from the monitor loop into the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Indices (into the config's entry list) of entries that changed.
    Changed(Vec<usize>),
    /// A cycle hit its timeout without a change.
    TimedOut,
    /// The entry list yields no watchable directory; the loop has stopped.
    NothingToWatch,
}

/// Options for the blocking monitor loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopOptions {
    /// Stop after the first completed cycle (changed or timed out).
    pub once: bool,
    /// Per-cycle timeout; `None` waits forever.
    pub timeout: Option<Duration>,
}

pub mod runtime;

pub use runtime::{monitor_loop, spawn_monitor_loop, Runtime};
