//! Virtual clock with cancellable delayed events
//!
//! The match engine never reads wall-clock time. Every timed transition (countdown
//! steps, the per-second tick, freeze expiry, feedback clearing) is scheduled here
//! and fired in `(due, id)` order as the caller advances time.

use std::collections::BTreeMap;

/// Handle for cancelling a scheduled event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Ordered queue of pending events on a millisecond clock
#[derive(Clone, Debug)]
pub struct Scheduler<E> {
    now_ms: u64,
    next_id: u64,
    pending: BTreeMap<(u64, TimerId), E>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `event` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((self.now_ms + delay_ms, id), event);
        id
    }

    /// Cancel a pending event. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|&(_, timer), _| timer != id);
        self.pending.len() != before
    }

    /// Drop every pending event
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.keys().any(|&(_, timer)| timer == id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the earliest pending event
    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|&(due, _)| due)
    }

    /// Pop the earliest event due at or before `until`, moving the clock to its due time
    pub fn pop_due(&mut self, until: u64) -> Option<E> {
        let (&key, _) = self.pending.iter().next()?;
        if key.0 > until {
            return None;
        }
        let event = self.pending.remove(&key)?;
        self.now_ms = self.now_ms.max(key.0);
        Some(event)
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
