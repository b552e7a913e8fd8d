use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use dirmon::errors::Result;
use dirmon::exec::{EntryJob, ExecutorBackend};

/// A fake executor that records every job instead of spawning a process.
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<EntryJob>>>,
}

impl FakeExecutor {
    pub fn new(executed: Arc<Mutex<Vec<EntryJob>>>) -> Self {
        Self { executed }
    }
}

impl ExecutorBackend for FakeExecutor {
    fn run(&mut self, job: EntryJob) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let executed = Arc::clone(&self.executed);

        Box::pin(async move {
            executed.lock().unwrap().push(job);
            Ok(())
        })
    }
}
