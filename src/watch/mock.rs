// src/watch/mock.rs

//! Scriptable in-memory [`Notifier`] for tests.
//!
//! Signals are queued up front and delivered one per `wait` call. The mock
//! keeps a ledger of every subscribe, release and re-arm so tests can check
//! resource pairing.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::SubscribeError;
use crate::watch::notifier::{Notifier, Subscription, SubscriptionId, WaitStatus};

type Action = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockSignal {
    /// Signal the most recent subscription ever made for this directory,
    /// even if it has been released since.
    Dir(String),
    Fail(String),
    Timeout,
    Interrupt,
}

struct Scripted {
    signal: MockSignal,
    action: Option<Action>,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    issued: Vec<(SubscriptionId, String)>,
    live: BTreeMap<SubscriptionId, String>,
    released: Vec<String>,
    rearmed: Vec<String>,
    failing: HashSet<String>,
    script: VecDeque<Scripted>,
    waits: usize,
}

/// Clones share state: keep one for assertions, give the other away.
#[derive(Clone, Default)]
pub struct MockNotifier {
    state: Arc<Mutex<MockState>>,
}

impl fmt::Debug for MockNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("MockNotifier")
            .field("live", &state.live)
            .field("queued", &state.script.len())
            .field("waits", &state.waits)
            .finish()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `subscribe(dir)` fail.
    pub fn fail_on(&self, dir: &str) {
        self.state.lock().unwrap().failing.insert(dir.to_string());
    }

    pub fn allow(&self, dir: &str) {
        self.state.lock().unwrap().failing.remove(dir);
    }

    pub fn push_signal(&self, dir: &str) {
        self.push(MockSignal::Dir(dir.to_string()), None);
    }

    /// Queue a signal for `dir` and run `action` right before it is delivered.
    pub fn push_signal_with(&self, dir: &str, action: impl FnOnce() + Send + 'static) {
        self.push(MockSignal::Dir(dir.to_string()), Some(Box::new(action)));
    }

    pub fn push_failure(&self, reason: &str) {
        self.push(MockSignal::Fail(reason.to_string()), None);
    }

    pub fn push_timeout(&self) {
        self.push(MockSignal::Timeout, None);
    }

    pub fn push_interrupt(&self) {
        self.push(MockSignal::Interrupt, None);
    }

    fn push(&self, signal: MockSignal, action: Option<Action>) {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back(Scripted { signal, action });
    }

    /// Directories passed to successful `subscribe` calls, in call order.
    pub fn subscribed(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.issued.iter().map(|(_, dir)| dir.clone()).collect()
    }

    /// Directories whose subscription was dropped, in drop order.
    pub fn released(&self) -> Vec<String> {
        self.state.lock().unwrap().released.clone()
    }

    pub fn rearmed(&self) -> Vec<String> {
        self.state.lock().unwrap().rearmed.clone()
    }

    /// Directories with a live subscription, in subscription order.
    pub fn live(&self) -> Vec<String> {
        self.state.lock().unwrap().live.values().cloned().collect()
    }

    pub fn waits(&self) -> usize {
        self.state.lock().unwrap().waits
    }

    pub fn pending_signals(&self) -> usize {
        self.state.lock().unwrap().script.len()
    }
}

#[derive(Debug)]
pub struct MockSubscription {
    id: SubscriptionId,
    dir: String,
    state: Arc<Mutex<MockState>>,
}

impl Subscription for MockSubscription {
    fn id(&self) -> SubscriptionId {
        self.id
    }

    fn rearm(&self) {
        self.state.lock().unwrap().rearmed.push(self.dir.clone());
    }
}

impl Drop for MockSubscription {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.live.remove(&self.id);
            state.released.push(self.dir.clone());
        }
    }
}

impl fmt::Debug for MockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockState")
            .field("live", &self.live)
            .finish_non_exhaustive()
    }
}

impl Notifier for MockNotifier {
    type Subscription = MockSubscription;

    fn subscribe(&mut self, dir: &str) -> Result<MockSubscription, SubscribeError> {
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(dir) {
            return Err(SubscribeError {
                dir: dir.to_string(),
                code: Some(2),
                reason: "mock: directory not found".to_string(),
            });
        }

        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.issued.push((id, dir.to_string()));
        state.live.insert(id, dir.to_string());

        Ok(MockSubscription {
            id,
            dir: dir.to_string(),
            state: Arc::clone(&self.state),
        })
    }

    fn wait(&mut self, _timeout: Option<Duration>) -> WaitStatus {
        let next = {
            let mut state = self.state.lock().unwrap();
            state.waits += 1;
            state.script.pop_front()
        };

        let Some(Scripted { signal, action }) = next else {
            return WaitStatus::Failed("mock signal script exhausted".to_string());
        };

        // Run outside the lock; actions typically poke a MockFileSystem.
        if let Some(action) = action {
            action();
        }

        match signal {
            MockSignal::Dir(dir) => {
                let state = self.state.lock().unwrap();
                match state.issued.iter().rev().find(|(_, d)| *d == dir) {
                    Some((id, _)) => WaitStatus::Signaled(*id),
                    None => WaitStatus::Failed(format!("mock: '{dir}' was never subscribed")),
                }
            }
            MockSignal::Fail(reason) => WaitStatus::Failed(reason),
            MockSignal::Timeout => WaitStatus::TimedOut,
            MockSignal::Interrupt => WaitStatus::Interrupted,
        }
    }
}
