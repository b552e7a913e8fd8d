// src/exec/mod.rs

//! Process execution layer.
//!
//! Entries may carry a `cmd`; when such an entry changes, the runtime hands an
//! [`EntryJob`] to an [`ExecutorBackend`].
//!
//! - [`command`] runs one job through the platform shell with
//!   `tokio::process::Command`.
//! - [`backend`] provides the `ExecutorBackend` trait and the
//!   `RealExecutorBackend` used in production, which tests replace with a
//!   fake implementation.

pub mod backend;
pub mod command;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use command::{run_job, EntryJob};
