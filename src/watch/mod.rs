// src/watch/mod.rs

//! Directory monitoring and change classification.
//!
//! This module is responsible for:
//! - Deriving the directory to watch for each tracked file (`path_utils`).
//! - Keeping a bounded registry of live directory subscriptions in sync with
//!   the caller's entry list (`registry`).
//! - Blocking until a directory signals, then deciding which entries actually
//!   changed by comparing file timestamps (`cycle`).
//!
//! The OS notification facility sits behind the [`Notifier`] trait:
//! [`NotifyNotifier`] for real use, [`MockNotifier`] for tests.

pub mod backend;
pub mod cycle;
pub mod mock;
pub mod notifier;
pub mod path_utils;
pub mod registry;

pub use backend::{Interrupter, NotifyNotifier, NotifySubscription};
pub use cycle::Monitor;
pub use mock::{MockNotifier, MockSignal};
pub use notifier::{Notifier, Subscription, SubscriptionId, WaitStatus};
pub use path_utils::{collect_directories, derive_directory};
pub use registry::{AddStatus, HandleRegistry};
