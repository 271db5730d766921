// SPDX-License-Identifier: MIT

//! A single process-wide event scheduler shared by every supervisor.
//!
//! Modelled as a min-heap keyed on `(fire_at, priority, insertion order)`,
//! guarded by a plain mutex that only ever protects the queue metadata —
//! never a running callback. `enter`/`cancel` can therefore be called from
//! any task while [`Scheduler::run`] is blocked awaiting a callback; the
//! callback itself runs to completion before the next entry is popped,
//! which is the serial-ordering guarantee the rest of the system relies on.

use mcsup_core::Clock;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Opaque handle returned by [`Scheduler::enter`]. Never reused across time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

/// A scheduled callback: takes no arguments, returns a future it drives to
/// completion before the scheduler pops its next entry.
pub type Action = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Cancelling a handle that has already fired, or was never issued, is a
/// silent no-op at the call site; this is the underlying signal for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown or already-fired scheduler handle")]
pub struct UnknownHandle;

struct Entry {
    fire_at: Instant,
    priority: i32,
    seq: u64,
    handle: Handle,
    action: Action,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest (fire_at, priority,
        // seq) tuple is popped first.
        (other.fire_at, other.priority, other.seq).cmp(&(self.fire_at, self.priority, self.seq))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct State {
    heap: BinaryHeap<Entry>,
    cancelled: HashSet<u64>,
}

/// Process-wide scheduler shared (by `Arc`) across all supervisors.
pub struct Scheduler<C: Clock> {
    clock: C,
    state: Mutex<State>,
    notify: Notify,
    next_seq: AtomicU64,
    next_handle: AtomicU64,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C) -> Arc<Self> {
        Arc::new(Self {
            clock,
            state: Mutex::new(State {
                heap: BinaryHeap::new(),
                cancelled: HashSet::new(),
            }),
            notify: Notify::new(),
            next_seq: AtomicU64::new(0),
            next_handle: AtomicU64::new(0),
        })
    }

    /// Schedule a one-shot action to fire `delay` from now.
    pub fn enter(&self, delay: Duration, priority: i32, action: Action) -> Handle {
        let handle = Handle(self.next_handle.fetch_add(1, AtomicOrdering::Relaxed));
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
        let fire_at = self.clock.now() + delay;

        {
            let mut state = self.state.lock();
            state.heap.push(Entry {
                fire_at,
                priority,
                seq,
                handle,
                action,
            });
        }
        self.notify.notify_one();
        handle
    }

    /// Cancel a previously scheduled action. Cancelling an unknown or
    /// already-fired handle fails with [`UnknownHandle`], which every caller
    /// in this system discards.
    pub fn cancel(&self, handle: Handle) -> Result<(), UnknownHandle> {
        let mut state = self.state.lock();
        let still_queued = state.heap.iter().any(|e| e.handle == handle);
        if !still_queued || !state.cancelled.insert(handle.0) {
            return Err(UnknownHandle);
        }
        Ok(())
    }

    /// Block the calling task, firing callbacks serially as they come due.
    /// Concurrent `enter`/`cancel` from other tasks is always safe, including
    /// while a callback is running — this method only releases the queue
    /// lock while it awaits either the next deadline or a fresh `enter`.
    pub async fn run(self: &Arc<Self>) {
        loop {
            let popped = self.pop_ready();
            match popped {
                Some(action) => action().await,
                None => {
                    let deadline = self.next_deadline();
                    match deadline {
                        Some(at) => {
                            let now = self.clock.now();
                            let wait = at.saturating_duration_since(now);
                            tokio::select! {
                                _ = tokio::time::sleep(wait) => {}
                                _ = self.notify.notified() => {}
                            }
                        }
                        None => self.notify.notified().await,
                    }
                }
            }
        }
    }

    fn pop_ready(&self) -> Option<Action> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        loop {
            let is_ready = matches!(state.heap.peek(), Some(e) if e.fire_at <= now);
            if !is_ready {
                return None;
            }
            #[allow(clippy::expect_used)]
            let entry = state.heap.pop().expect("peek confirmed an element");
            if state.cancelled.remove(&entry.handle.0) {
                continue;
            }
            return Some(entry.action);
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.state.lock().heap.peek().map(|e| e.fire_at)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
