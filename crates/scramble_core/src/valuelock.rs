//! Keyed lock table for value-scoped transform sections.
//!
//! Bulk transforms serialize per card value instead of per board, so
//! transforms over disjoint values run concurrently. A transform locks
//! both its source and target values: without the target lock, two
//! concurrent renames into the same value could interleave their
//! rewrites and leave a previously matching pair half-transformed.

use crate::types::CardValue;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Lock table keyed by card value, created on demand.
///
/// Entries are kept for the lifetime of the board. The table grows with
/// the number of distinct values ever seen, which transform targets
/// bound in practice.
#[derive(Debug, Default)]
pub struct ValueLocks {
    table: Mutex<HashMap<CardValue, Arc<Mutex<()>>>>,
}

impl ValueLocks {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, value: &CardValue) -> Arc<Mutex<()>> {
        let mut table = self.table.lock();
        Arc::clone(table.entry(value.clone()).or_default())
    }

    /// Runs `f` while exclusively holding the locks for `a` and `b`.
    ///
    /// Locks are acquired in value order, so concurrent calls with the
    /// same pair in either orientation cannot deadlock. `a == b` takes a
    /// single lock.
    pub fn with_pair<R>(&self, a: &CardValue, b: &CardValue, f: impl FnOnce() -> R) -> R {
        if a == b {
            let lock = self.handle(a);
            let _guard = lock.lock();
            return f();
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_lock = self.handle(first);
        let second_lock = self.handle(second);
        let _first = first_lock.lock();
        let _second = second_lock.lock();
        f()
    }
}
