// src/watch/notifier.rs

//! The seam between the handle registry and the OS notification facility.

use std::fmt::Debug;
use std::time::Duration;

use crate::errors::SubscribeError;

/// Identity of one subscription, unique for the lifetime of its notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// What a single `Notifier::wait` call observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitStatus {
    Signaled(SubscriptionId),
    TimedOut,
    Interrupted,
    /// The wait primitive itself failed. Treated as fatal by the cycle.
    Failed(String),
}

/// A live change-notification subscription on one directory.
///
/// Dropping the subscription releases the underlying OS resource.
pub trait Subscription: Debug {
    fn id(&self) -> SubscriptionId;

    /// Re-arm after a signal. Until this is called the subscription does not
    /// signal again; changes in the meantime coalesce into one pending signal.
    fn rearm(&self);
}

/// Factory for subscriptions plus the blocking wait over all of them.
pub trait Notifier {
    type Subscription: Subscription;

    /// Subscribe to last-write changes in `dir` (non-recursive).
    fn subscribe(&mut self, dir: &str) -> Result<Self::Subscription, SubscribeError>;

    /// Block until any subscription signals, the timeout expires, or the
    /// wait is interrupted. `None` waits forever.
    ///
    /// Signals from subscriptions that have since been dropped may still be
    /// returned; callers must ignore ids they no longer own.
    fn wait(&mut self, timeout: Option<Duration>) -> WaitStatus;
}
