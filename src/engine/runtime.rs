// src/engine/runtime.rs

use std::fmt;
use std::io::Write;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::EntryConfig;
use crate::errors::Result;
use crate::exec::{EntryJob, ExecutorBackend};
use crate::fs::FileSystem;
use crate::types::CycleOutcome;
use crate::watch::{Monitor, Notifier};

use super::{LoopOptions, MonitorEvent};

/// Run watch cycles back to back, forwarding each result to `tx`.
///
/// Returns when the monitor is interrupted, nothing is left to watch,
/// `options.once` is set and a cycle completed, or the receiving side has
/// gone away. A fatal wait error is returned as-is; the monitor has already
/// released its directories by then.
pub fn monitor_loop<N: Notifier, F: FileSystem>(
    monitor: &mut Monitor<N, F>,
    entries: &[Vec<String>],
    options: LoopOptions,
    tx: &mpsc::Sender<MonitorEvent>,
) -> Result<()> {
    info!(entries = entries.len(), timeout = ?options.timeout, "monitor loop started");

    loop {
        let outcome = monitor.run_with_timeout(entries, options.timeout)?;

        let event = match &outcome {
            CycleOutcome::Changed(_) => MonitorEvent::Changed(outcome.changed_indices()),
            CycleOutcome::TimedOut => {
                debug!("cycle timed out without changes");
                MonitorEvent::TimedOut
            }
            CycleOutcome::NothingToWatch => {
                warn!("none of the entries has a watchable directory; stopping");
                MonitorEvent::NothingToWatch
            }
            CycleOutcome::Interrupted => {
                info!("monitor interrupted; stopping");
                return Ok(());
            }
        };

        let stop = options.once || event == MonitorEvent::NothingToWatch;

        if tx.blocking_send(event).is_err() {
            debug!("runtime channel closed; stopping monitor loop");
            return Ok(());
        }

        if stop {
            return Ok(());
        }
    }
}

/// Move `monitor` onto a blocking thread and run [`monitor_loop`] there.
///
/// The monitor is torn down when the loop ends, whatever the reason.
pub fn spawn_monitor_loop<N, F>(
    mut monitor: Monitor<N, F>,
    entries: Vec<Vec<String>>,
    options: LoopOptions,
    tx: mpsc::Sender<MonitorEvent>,
) -> JoinHandle<Result<()>>
where
    N: Notifier + Send + 'static,
    N::Subscription: Send,
    F: FileSystem + 'static,
{
    tokio::task::spawn_blocking(move || {
        let result = monitor_loop(&mut monitor, &entries, options, &tx);
        monitor.teardown();
        result
    })
}

/// Async side: reports changed entries on stdout and runs their commands.
pub struct Runtime<E: ExecutorBackend> {
    entries: Vec<EntryConfig>,
    event_rx: mpsc::Receiver<MonitorEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        entries: Vec<EntryConfig>,
        event_rx: mpsc::Receiver<MonitorEvent>,
        executor: E,
    ) -> Self {
        Self {
            entries,
            event_rx,
            executor,
        }
    }

    /// Main event loop; ends when the monitor loop drops its sender.
    ///
    /// Returns every batch of changed entry indices, in arrival order.
    pub async fn run(mut self) -> Result<Vec<Vec<usize>>> {
        info!("dirmon runtime started");
        let mut batches = Vec::new();

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");

            match event {
                MonitorEvent::Changed(indices) => {
                    self.handle_changed(&indices).await?;
                    batches.push(indices);
                }
                MonitorEvent::TimedOut => {}
                MonitorEvent::NothingToWatch => {
                    warn!("nothing to watch");
                }
            }
        }

        info!("runtime exiting");
        Ok(batches)
    }

    async fn handle_changed(&mut self, indices: &[usize]) -> Result<()> {
        {
            let mut out = std::io::stdout().lock();
            for &index in indices {
                if let Some(entry) = self.entries.get(index) {
                    writeln!(out, "{}", entry.primary())?;
                }
            }
            out.flush()?;
        }

        for &index in indices {
            let Some(entry) = self.entries.get(index) else {
                warn!(index, "change reported for unknown entry");
                continue;
            };
            let Some(cmd) = &entry.cmd else {
                continue;
            };

            let job = EntryJob {
                index,
                label: entry.label().to_string(),
                primary: entry.primary().to_string(),
                cmd: cmd.clone(),
            };
            if let Err(err) = self.executor.run(job).await {
                error!(entry = %entry.label(), error = %err, "entry command could not be run");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    use crate::fs::mock::MockFileSystem;
    use crate::types::MonitorOptions;
    use crate::watch::MockNotifier;

    fn entries() -> Vec<Vec<String>> {
        vec![
            vec!["hss/style.hss".to_string()],
            vec!["hss/dark.hss".to_string(), "hss/subs/_vars.hss".to_string()],
        ]
    }

    fn setup() -> (Monitor<MockNotifier, MockFileSystem>, MockNotifier, MockFileSystem) {
        let notifier = MockNotifier::new();
        let fs = MockFileSystem::new();
        let old = SystemTime::now() - Duration::from_secs(3600);
        fs.add_file("hss/style.hss", old);
        fs.add_file("hss/dark.hss", old);
        fs.add_file("hss/subs/_vars.hss", old);
        let monitor = Monitor::with_fs(notifier.clone(), fs.clone(), MonitorOptions::default());
        (monitor, notifier, fs)
    }

    #[test]
    fn loop_forwards_events_until_interrupted() {
        let (mut monitor, mock, fs) = setup();
        let touched = fs.clone();
        mock.push_signal_with("hss/subs", move || {
            touched
                .set_modified("hss/subs/_vars.hss", SystemTime::now() + Duration::from_secs(3600))
                .unwrap();
        });
        mock.push_timeout();
        mock.push_interrupt();

        let (tx, mut rx) = mpsc::channel(8);
        monitor_loop(&mut monitor, &entries(), LoopOptions::default(), &tx).unwrap();

        assert_eq!(rx.try_recv().unwrap(), MonitorEvent::Changed(vec![1]));
        assert_eq!(rx.try_recv().unwrap(), MonitorEvent::TimedOut);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn once_stops_after_first_cycle() {
        let (mut monitor, mock, _fs) = setup();
        mock.push_timeout();
        mock.push_timeout();

        let (tx, mut rx) = mpsc::channel(8);
        let options = LoopOptions {
            once: true,
            timeout: Some(Duration::from_millis(10)),
        };
        monitor_loop(&mut monitor, &entries(), options, &tx).unwrap();

        assert_eq!(rx.try_recv().unwrap(), MonitorEvent::TimedOut);
        assert_eq!(mock.pending_signals(), 1);
    }

    #[test]
    fn nothing_to_watch_stops_the_loop() {
        let (mut monitor, _mock, _fs) = setup();
        let (tx, mut rx) = mpsc::channel(8);

        monitor_loop(&mut monitor, &[vec![String::new()]], LoopOptions::default(), &tx).unwrap();
        assert_eq!(rx.try_recv().unwrap(), MonitorEvent::NothingToWatch);
    }

    #[test]
    fn fatal_wait_error_is_returned() {
        let (mut monitor, mock, _fs) = setup();
        mock.push_failure("handle closed");

        let (tx, _rx) = mpsc::channel(8);
        let result = monitor_loop(&mut monitor, &entries(), LoopOptions::default(), &tx);

        assert!(result.is_err());
        assert!(mock.live().is_empty());
    }
}
