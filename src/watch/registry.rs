// src/watch/registry.rs

//! Bounded table of watched directories.
//!
//! Each cycle follows the same protocol:
//!
//! 1. [`HandleRegistry::begin_cycle`] clears every live mark.
//! 2. [`HandleRegistry::add`] is called for every directory the caller still
//!    wants. Known directories are re-marked; new ones get a subscription.
//! 3. [`HandleRegistry::sweep`] drops every record that was not re-marked,
//!    releasing its subscription, and keeps the rest in registration order.
//!
//! Subscriptions are owned by their record, so each one is released exactly
//! once: by `sweep`, by `teardown`, or when the registry is dropped.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::errors::{AddError, MonitorError, Result};
use crate::types::WaitOutcome;
use crate::watch::notifier::{Notifier, Subscription, WaitStatus};

/// One watched directory. The directory string is the registry key.
#[derive(Debug)]
struct WatchedDirectory<S> {
    subscription: S,
    live: bool,
}

/// Successful outcome of [`HandleRegistry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddStatus {
    /// A new subscription was created.
    Added,
    /// The directory was already registered; it has been re-marked.
    AlreadyWatched,
}

pub struct HandleRegistry<N: Notifier> {
    notifier: N,
    capacity: usize,
    records: IndexMap<String, WatchedDirectory<N::Subscription>>,
}

impl<N: Notifier + std::fmt::Debug> std::fmt::Debug for HandleRegistry<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("notifier", &self.notifier)
            .field("capacity", &self.capacity)
            .field("directories", &self.records.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<N: Notifier> HandleRegistry<N> {
    pub fn new(notifier: N, capacity: usize) -> Self {
        Self {
            notifier,
            capacity,
            records: IndexMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Watched directories in registration order.
    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn directory(&self, index: usize) -> Option<&str> {
        self.records.get_index(index).map(|(dir, _)| dir.as_str())
    }

    pub fn contains(&self, dir: &str) -> bool {
        self.records.contains_key(dir)
    }

    /// Live mark of `dir`, or `None` if it is not registered.
    pub fn is_marked(&self, dir: &str) -> Option<bool> {
        self.records.get(dir).map(|r| r.live)
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn begin_cycle(&mut self) {
        for record in self.records.values_mut() {
            record.live = false;
        }
    }

    /// Mark `dir` as wanted for this cycle, subscribing to it if needed.
    ///
    /// Both error cases are logged here; callers may ignore them.
    pub fn add(&mut self, dir: &str) -> std::result::Result<AddStatus, AddError> {
        if let Some(record) = self.records.get_mut(dir) {
            record.live = true;
            return Ok(AddStatus::AlreadyWatched);
        }

        if self.records.len() >= self.capacity {
            warn!(
                dir,
                capacity = self.capacity,
                "out of directory slots; not watching directory"
            );
            return Err(AddError::CapacityExceeded {
                dir: dir.to_string(),
                capacity: self.capacity,
            });
        }

        let subscription = self.notifier.subscribe(dir).map_err(|err| {
            warn!(
                dir,
                code = ?err.code,
                reason = %err.reason,
                "change notification subscription failed"
            );
            err
        })?;

        debug!(dir, id = ?subscription.id(), "watching directory");
        self.records.insert(
            dir.to_string(),
            WatchedDirectory {
                subscription,
                live: true,
            },
        );
        Ok(AddStatus::Added)
    }

    /// Release every unmarked record, keeping marked ones in their original
    /// relative order. Returns how many were released.
    pub fn sweep(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|dir, record| {
            if !record.live {
                debug!(dir = %dir, "releasing directory no longer requested");
            }
            record.live
        });
        before - self.records.len()
    }

    /// Block until one of the registered directories signals.
    ///
    /// The signalled subscription is re-armed before its index is returned.
    /// Signals from subscriptions released by an earlier sweep are skipped.
    /// `timeout` bounds the whole call, stale signals included.
    pub fn wait_any(&mut self, timeout: Option<Duration>) -> Result<WaitOutcome> {
        if self.records.is_empty() {
            return Err(MonitorError::WaitFailed(
                "no directories registered".to_string(),
            ));
        }

        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));

            match self.notifier.wait(remaining) {
                WaitStatus::Signaled(id) => {
                    let found = self
                        .records
                        .iter()
                        .enumerate()
                        .find(|(_, (_, record))| record.subscription.id() == id);

                    match found {
                        Some((index, (dir, record))) => {
                            record.subscription.rearm();
                            debug!(dir = %dir, index, "directory signalled");
                            return Ok(WaitOutcome::Signaled(index));
                        }
                        None => {
                            debug!(?id, "ignoring signal from a released subscription");
                        }
                    }
                }
                WaitStatus::TimedOut => return Ok(WaitOutcome::TimedOut),
                WaitStatus::Interrupted => return Ok(WaitOutcome::Interrupted),
                WaitStatus::Failed(reason) => return Err(MonitorError::WaitFailed(reason)),
            }
        }
    }

    /// Release every subscription. Safe to call on an empty registry.
    pub fn teardown(&mut self) {
        let released = self.records.len();
        self.records.clear();
        if released > 0 {
            debug!(released, "directory registry torn down");
        }
    }
}

impl<N: Notifier> Drop for HandleRegistry<N> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::mock::MockNotifier;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn registry(capacity: usize) -> (HandleRegistry<MockNotifier>, MockNotifier) {
        let notifier = MockNotifier::new();
        (HandleRegistry::new(notifier.clone(), capacity), notifier)
    }

    #[test]
    fn adding_same_directory_twice_subscribes_once() {
        let (mut reg, mock) = registry(4);

        assert_eq!(reg.add("hss"), Ok(AddStatus::Added));
        assert_eq!(reg.add("hss"), Ok(AddStatus::AlreadyWatched));

        assert_eq!(reg.len(), 1);
        assert_eq!(mock.subscribed(), strings(&["hss"]));
    }

    #[test]
    fn sweep_keeps_marked_in_order_and_releases_the_rest() {
        let (mut reg, mock) = registry(8);
        for dir in ["A", "B", "C", "D"] {
            reg.add(dir).unwrap();
        }

        reg.begin_cycle();
        reg.add("A").unwrap();
        reg.add("D").unwrap();
        let released = reg.sweep();

        assert_eq!(released, 2);
        assert_eq!(reg.directories().collect::<Vec<_>>(), vec!["A", "D"]);
        assert_eq!(mock.released(), strings(&["B", "C"]));
        assert_eq!(mock.live(), strings(&["A", "D"]));
    }

    #[test]
    fn begin_cycle_clears_marks() {
        let (mut reg, _mock) = registry(2);
        reg.add("A").unwrap();
        assert_eq!(reg.is_marked("A"), Some(true));

        reg.begin_cycle();
        assert_eq!(reg.is_marked("A"), Some(false));
        assert_eq!(reg.is_marked("B"), None);
    }

    #[test]
    fn capacity_exceeded_is_reported_and_harmless() {
        let (mut reg, mock) = registry(2);
        reg.add("A").unwrap();
        reg.add("B").unwrap();

        let err = reg.add("C").unwrap_err();
        assert_eq!(
            err,
            AddError::CapacityExceeded {
                dir: "C".to_string(),
                capacity: 2
            }
        );
        assert_eq!(reg.directories().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(mock.subscribed(), strings(&["A", "B"]));
        // Re-adding a known directory still works at capacity.
        assert_eq!(reg.add("A"), Ok(AddStatus::AlreadyWatched));
    }

    #[test]
    fn subscribe_failure_leaves_registry_untouched() {
        let (mut reg, mock) = registry(2);
        mock.fail_on("missing");

        assert!(matches!(reg.add("missing"), Err(AddError::Subscribe(_))));
        assert!(reg.is_empty());

        mock.allow("missing");
        assert_eq!(reg.add("missing"), Ok(AddStatus::Added));
    }

    #[test]
    fn wait_any_rearms_and_returns_index() {
        let (mut reg, mock) = registry(4);
        reg.add("A").unwrap();
        reg.add("B").unwrap();
        mock.push_signal("B");

        assert_eq!(reg.wait_any(None).unwrap(), WaitOutcome::Signaled(1));
        assert_eq!(mock.rearmed(), strings(&["B"]));
    }

    #[test]
    fn wait_any_skips_signals_from_released_directories() {
        let (mut reg, mock) = registry(4);
        reg.add("A").unwrap();
        reg.add("B").unwrap();
        reg.begin_cycle();
        reg.add("B").unwrap();
        reg.sweep();

        mock.push_signal("A");
        mock.push_signal("B");

        assert_eq!(reg.wait_any(None).unwrap(), WaitOutcome::Signaled(0));
        assert_eq!(reg.directory(0), Some("B"));
        assert_eq!(mock.waits(), 2);
    }

    #[test]
    fn wait_any_on_empty_registry_is_an_error() {
        let (mut reg, mock) = registry(4);
        assert!(matches!(reg.wait_any(None), Err(MonitorError::WaitFailed(_))));
        assert_eq!(mock.waits(), 0);
    }

    #[test]
    fn wait_failure_surfaces_as_error() {
        let (mut reg, mock) = registry(4);
        reg.add("A").unwrap();
        mock.push_failure("boom");

        match reg.wait_any(None) {
            Err(MonitorError::WaitFailed(reason)) => assert_eq!(reason, "boom"),
            other => panic!("expected WaitFailed, got {other:?}"),
        }
    }

    #[test]
    fn teardown_is_idempotent_and_drop_releases() {
        let (mut reg, mock) = registry(4);
        reg.add("A").unwrap();
        reg.add("B").unwrap();

        reg.teardown();
        reg.teardown();
        assert!(reg.is_empty());
        assert_eq!(mock.released(), strings(&["A", "B"]));

        reg.add("C").unwrap();
        drop(reg);
        assert_eq!(mock.released(), strings(&["A", "B", "C"]));
        assert!(mock.live().is_empty());
    }
}
