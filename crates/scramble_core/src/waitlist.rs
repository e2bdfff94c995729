//! Per-position queues of blocked flip callers.
//!
//! A caller blocked by rule 1-D registers a ticket for the contested
//! position, suspends outside the exclusive section, and retries the
//! whole flip when the position is released. Classic condition-variable
//! discipline: check the condition, register, release the lock, suspend,
//! re-acquire and re-check on wake.

use crate::types::Position;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
struct Slot {
    /// Bumped on every release; a ticket holds the generation it
    /// observed at registration.
    generation: AtomicU64,
    freed: Condvar,
}

/// An opaque handle for one blocked caller waiting on one position.
///
/// Destroyed when the caller is signaled, times out, or abandons the
/// wait; dropping a ticket has no effect on anyone else.
#[derive(Debug)]
pub struct WaitTicket {
    slot: Arc<Slot>,
    generation: u64,
}

impl WaitTicket {
    fn released(&self) -> bool {
        self.slot.generation.load(Ordering::SeqCst) != self.generation
    }

    /// Suspends until the position is released.
    ///
    /// `guard` must be the exclusive section the ticket was registered
    /// under; it is released atomically while suspended and re-held on
    /// return. The caller must re-check all preconditions afterwards.
    pub fn wait<T: ?Sized>(&self, guard: &mut MutexGuard<'_, T>) {
        while !self.released() {
            self.slot.freed.wait(guard);
        }
    }

    /// Like [`WaitTicket::wait`], but gives up at `deadline`.
    ///
    /// Returns `true` if the position was released, `false` on timeout.
    pub fn wait_until<T: ?Sized>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        deadline: Instant,
    ) -> bool {
        while !self.released() {
            let result = self.slot.freed.wait_until(guard, deadline);
            if result.timed_out() {
                return self.released();
            }
        }
        true
    }
}

/// Registry of wait slots, one per contested position.
///
/// Slots are created on demand and never pruned: the grid is fixed at
/// construction, so the table is bounded by the number of positions.
#[derive(Debug, Default)]
pub struct WaitRegistry {
    slots: Mutex<HashMap<Position, Arc<Slot>>>,
}

impl WaitRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ticket for `pos`.
    ///
    /// Must be called while holding the exclusive section that
    /// [`WaitRegistry::release_all`] callers hold, so a release cannot
    /// slip between registration and the subsequent suspend.
    #[must_use]
    pub fn register(&self, pos: Position) -> WaitTicket {
        let slot = Arc::clone(self.slots.lock().entry(pos).or_default());
        let generation = slot.generation.load(Ordering::SeqCst);
        WaitTicket { slot, generation }
    }

    /// Wakes every ticket registered for `pos`. Idempotent when nobody
    /// is waiting.
    pub fn release_all(&self, pos: Position) {
        if let Some(slot) = self.slots.lock().get(&pos) {
            slot.generation.fetch_add(1, Ordering::SeqCst);
            slot.freed.notify_all();
        }
    }
}
