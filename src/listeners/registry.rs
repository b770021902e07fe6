//! # Listener registry - event name → ordered listener records.
//!
//! The registry is the only shared mutable state of the runtime. One exclusive
//! lock guards the whole map and covers registration and the
//! snapshot-and-cleanup phase of a notification. Callbacks never run under it.
//!
//! ## Architecture
//! ```text
//! register(name, cb) ──► lock ──► map[name].push(record)          ──► unlock
//!
//! notify(name, args) ──► lock ──► for record in map[name]:
//!                                   ├─► remaining > 0 → remaining -= 1
//!                                   ├─► launch(callback, args)    (detached task)
//!                                   └─► remaining hit 0 → mark
//!                                 any marked → map[name] = unmarked records (new Vec)
//!                        ──► unlock
//! ```
//!
//! ## Rules
//! - Launch order follows insertion order; execution order of callbacks is not defined.
//! - A registration racing a notification is linearized by the lock: the new
//!   record is either part of this cycle or only of future ones.
//! - A handler may call `register`/`notify` itself: the lock is not held
//!   while it runs, so there is no deadlock.
//! - Cycles for the same name are serialized, but their callbacks may overlap
//!   in time. Counters are only touched under the lock, so a finite record is
//!   exhausted exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, error, trace};

use super::handler::{Handler, launch};
use super::record::ListenerRecord;

/// Summary of one notification cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Notified {
    /// Number of callbacks launched.
    pub fired: usize,
    /// Number of records removed because their counter reached zero.
    pub expired: usize,
}

/// Concurrency-safe mapping from event name to listener records.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<String, Vec<ListenerRecord>>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an unlimited listener for `name`.
    ///
    /// Never fails; the record is visible to every notification that takes
    /// its snapshot after this call returns.
    pub fn register(&self, name: impl Into<String>, callback: Handler) {
        self.register_with_limit(name, 0, callback);
    }

    /// Appends a listener that expires after `max_invocations` firings.
    ///
    /// `max_invocations == 0` registers an unlimited listener.
    pub fn register_with_limit(
        &self,
        name: impl Into<String>,
        max_invocations: u64,
        callback: Handler,
    ) {
        let name = name.into();
        let mut listeners = self.listeners.lock();
        let records = listeners.entry(name).or_default();
        records.push(ListenerRecord::new(callback, max_invocations));
        trace!(listeners = records.len(), max_invocations, "listener registered");
    }

    /// Fires every listener of `name` with `args`.
    ///
    /// Callbacks are launched on detached Tokio tasks and are not awaited, so this
    /// must be called from within a Tokio runtime. Outside one, nothing fires and
    /// the registry is left untouched. Unknown names are a no-op.
    pub fn notify(&self, name: &str, args: Vec<Value>) -> Notified {
        let rt = match Handle::try_current() {
            Ok(rt) => rt,
            Err(_) => {
                error!(event = %name, "no tokio runtime; notification dropped");
                return Notified::default();
            }
        };
        let mut listeners = self.listeners.lock();

        let Some(records) = listeners.get_mut(name).filter(|r| !r.is_empty()) else {
            debug!(event = %name, "no listeners");
            return Notified::default();
        };

        let event: Arc<str> = Arc::from(name);
        let args: Arc<[Value]> = Arc::from(args);
        let mut expired = 0;

        for record in records.iter_mut() {
            if record.consume() {
                expired += 1;
            }
            launch(&rt, Arc::clone(&event), record.callback(), Arc::clone(&args));
        }
        let fired = records.len();

        if expired > 0 {
            let kept: Vec<ListenerRecord> = std::mem::take(records)
                .into_iter()
                .filter(|r| !r.is_marked())
                .collect();
            if kept.is_empty() {
                listeners.remove(name);
            } else {
                listeners.insert(name.to_string(), kept);
            }
        }
        drop(listeners);

        trace!(event = %name, fired, expired, "listeners notified");
        Notified { fired, expired }
    }

    /// Number of live listeners for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.lock().get(name).map_or(0, Vec::len)
    }

    /// Returns sorted list of event names with at least one listener.
    pub fn event_names(&self) -> Vec<String> {
        let listeners = self.listeners.lock();
        let mut names: Vec<String> = listeners
            .iter()
            .filter(|(_, r)| !r.is_empty())
            .map(|(n, _)| n.clone())
            .collect();
        names.sort_unstable();
        names
    }

    /// Returns true if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.lock().values().all(Vec::is_empty)
    }
}
