// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` rather than spawning processes
//! itself, so tests can swap in a fake that only records jobs.

use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use crate::errors::Result;

use super::command::{run_job, EntryJob};

/// Trait abstracting how entry commands are executed.
pub trait ExecutorBackend: Send {
    /// Run the job to completion.
    ///
    /// A command that runs but fails is not an error; only failing to run it
    /// at all is.
    fn run(&mut self, job: EntryJob) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production: one shell process per job,
/// awaited before the next event is handled.
#[derive(Debug, Default)]
pub struct RealExecutorBackend;

impl RealExecutorBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn run(&mut self, job: EntryJob) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let code = run_job(&job).await?;
            if code != 0 {
                warn!(entry = %job.label, exit_code = code, "entry command failed");
            }
            Ok(())
        })
    }
}
