//! Broadcast mechanism for qualifying board changes.
//!
//! A change qualifies if it alters a cell's face state, value, or
//! existence. Control-only changes (claiming or releasing a face-up
//! card) do not qualify and must not wake watchers.

use parking_lot::{Condvar, Mutex};
use std::time::Instant;

/// A monotonically increasing change counter with a broadcast condition.
///
/// Watchers snapshot the counter, then suspend until it differs. Because
/// the snapshot is compared under the same lock the counter is bumped
/// under, there is no missed-wakeup window: a change between snapshot
/// and suspend makes the wait return immediately.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    version: Mutex<u64>,
    changed: Condvar,
}

impl ChangeNotifier {
    /// Creates a notifier with version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current change counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        *self.version.lock()
    }

    /// Records one qualifying change and wakes every watcher.
    pub fn record_change(&self) {
        let mut version = self.version.lock();
        *version += 1;
        self.changed.notify_all();
    }

    /// Suspends until the counter differs from `seen`, returning the new
    /// value. Returns immediately if it already differs.
    pub fn wait_past(&self, seen: u64) -> u64 {
        let mut version = self.version.lock();
        while *version == seen {
            self.changed.wait(&mut version);
        }
        *version
    }

    /// Like [`ChangeNotifier::wait_past`], but gives up at `deadline`.
    ///
    /// Returns `None` if the counter still equals `seen` at the deadline.
    pub fn wait_past_until(&self, seen: u64, deadline: Instant) -> Option<u64> {
        let mut version = self.version.lock();
        while *version == seen {
            if self.changed.wait_until(&mut version, deadline).timed_out() {
                return (*version != seen).then_some(*version);
            }
        }
        Some(*version)
    }
}
