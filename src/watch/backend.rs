// src/watch/backend.rs

//! `notify`-backed implementation of [`Notifier`].
//!
//! Every subscription owns its own `RecommendedWatcher` watching exactly one
//! directory, non-recursively. All watchers fan in to one channel so a single
//! blocking `recv` waits on every directory at once.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use notify::event::{MetadataKind, ModifyKind};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::trace;

use crate::errors::SubscribeError;
use crate::watch::notifier::{Notifier, Subscription, SubscriptionId, WaitStatus};

#[derive(Debug)]
enum Signal {
    Changed(SubscriptionId),
    Failed(String),
    Interrupt,
}

/// Wakes a blocked [`NotifyNotifier::wait`] from another thread.
#[derive(Debug, Clone)]
pub struct Interrupter {
    tx: Sender<Signal>,
}

impl Interrupter {
    pub fn interrupt(&self) {
        // The receiver lives as long as the notifier; if it is gone there is
        // nothing left to wake.
        let _ = self.tx.send(Signal::Interrupt);
    }
}

/// Production notifier built on `notify::RecommendedWatcher`.
pub struct NotifyNotifier {
    next_id: u64,
    tx: Sender<Signal>,
    rx: Receiver<Signal>,
}

impl fmt::Debug for NotifyNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyNotifier")
            .field("next_id", &self.next_id)
            .field("queued", &self.rx.len())
            .finish()
    }
}

impl Default for NotifyNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyNotifier {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { next_id: 0, tx, rx }
    }

    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            tx: self.tx.clone(),
        }
    }
}

/// Subscription handle; dropping it drops the watcher and stops watching.
pub struct NotifySubscription {
    id: SubscriptionId,
    dir: String,
    pending: Arc<AtomicBool>,
    _watcher: RecommendedWatcher,
}

impl fmt::Debug for NotifySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifySubscription")
            .field("id", &self.id)
            .field("dir", &self.dir)
            .field("pending", &self.pending.load(Ordering::Acquire))
            .finish()
    }
}

impl Subscription for NotifySubscription {
    fn id(&self) -> SubscriptionId {
        self.id
    }

    fn rearm(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

/// Creations and content/metadata writes; plain reads are ignored.
///
/// A rescan request (the kernel queue overflowed and events were dropped)
/// counts as a write.
fn is_last_write(event: &Event) -> bool {
    if event.need_rescan() {
        return true;
    }
    match &event.kind {
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)) => false,
        EventKind::Create(_) | EventKind::Modify(_) => true,
        _ => false,
    }
}

fn subscribe_error(dir: &str, err: notify::Error) -> SubscribeError {
    let code = match &err.kind {
        notify::ErrorKind::Io(io) => io.raw_os_error(),
        _ => None,
    };
    SubscribeError {
        dir: dir.to_string(),
        code,
        reason: err.to_string(),
    }
}

impl Notifier for NotifyNotifier {
    type Subscription = NotifySubscription;

    fn subscribe(&mut self, dir: &str) -> Result<NotifySubscription, SubscribeError> {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let pending = Arc::new(AtomicBool::new(false));

        // Called on notify's own thread.
        let handler = {
            let tx = self.tx.clone();
            let pending = Arc::clone(&pending);
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !is_last_write(&event) {
                        return;
                    }
                    if !pending.swap(true, Ordering::AcqRel) {
                        let _ = tx.send(Signal::Changed(id));
                    }
                }
                Err(err) => {
                    let _ = tx.send(Signal::Failed(err.to_string()));
                }
            }
        };

        let mut watcher = RecommendedWatcher::new(handler, Config::default())
            .map_err(|e| subscribe_error(dir, e))?;
        watcher
            .watch(Path::new(dir), RecursiveMode::NonRecursive)
            .map_err(|e| subscribe_error(dir, e))?;

        trace!(?id, dir, "notify watcher attached");

        Ok(NotifySubscription {
            id,
            dir: dir.to_string(),
            pending,
            _watcher: watcher,
        })
    }

    fn wait(&mut self, timeout: Option<Duration>) -> WaitStatus {
        let signal = match timeout {
            None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some(t) => self.rx.recv_timeout(t),
        };

        match signal {
            Ok(Signal::Changed(id)) => WaitStatus::Signaled(id),
            Ok(Signal::Failed(reason)) => WaitStatus::Failed(reason),
            Ok(Signal::Interrupt) => WaitStatus::Interrupted,
            Err(RecvTimeoutError::Timeout) => WaitStatus::TimedOut,
            Err(RecvTimeoutError::Disconnected) => {
                WaitStatus::Failed("notification channel disconnected".to_string())
            }
        }
    }
}
