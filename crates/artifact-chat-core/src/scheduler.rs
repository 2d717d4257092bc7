//! Delayed-task scheduling
//!
//! The session never sleeps itself. It hands [`Timer`]s to a [`Scheduler`],
//! which delivers them back once their delay has elapsed. [`VirtualClock`] is
//! the deterministic implementation used in tests; the TUI provides a tokio
//! backed one.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::transition::Timer;

/// Handle to a scheduled task, usable for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

pub trait Scheduler {
    /// Deliver `timer` after `delay`
    fn schedule(&mut self, delay: Duration, timer: Timer) -> TaskId;

    /// Returns false if the task already fired or was never scheduled
    fn cancel(&mut self, id: TaskId) -> bool;

    /// Wall-clock time used to stamp messages
    fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock. Due tasks fire in deadline order, ties in the
/// order they were scheduled.
#[derive(Debug)]
pub struct VirtualClock {
    origin: DateTime<Utc>,
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, TaskId), Timer>,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Clock whose zero corresponds to `origin` for message timestamps
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            now: Duration::ZERO,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Time elapsed since the clock was created
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest task due at or before `until`, moving the clock to its
    /// deadline. Tasks scheduled while handling it are seen by the next call.
    pub fn pop_due(&mut self, until: Duration) -> Option<Timer> {
        let key = *self.pending.keys().next()?;
        if key.0 > until {
            return None;
        }
        self.now = self.now.max(key.0);
        self.pending.remove(&key)
    }

    /// Move the clock to `until` once nothing due remains
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl Scheduler for VirtualClock {
    fn schedule(&mut self, delay: Duration, timer: Timer) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.pending.insert((self.now + delay, id), timer);
        id
    }

    fn cancel(&mut self, id: TaskId) -> bool {
        let key = self.pending.keys().find(|(_, task)| *task == id).copied();
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.now)
            .ok()
            .and_then(|elapsed| self.origin.checked_add_signed(elapsed))
            .unwrap_or(self.origin)
    }
}
