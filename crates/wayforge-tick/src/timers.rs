//! Tick-driven timers: run-every, run-after, cancel.
//!
//! A game server scheduler takes a callback and calls it later. Callbacks
//! that capture engine state would fight the borrow checker and, worse,
//! re-enter the registries from wherever the scheduler happens to run.
//! `Timers` turns that inside out: a timer carries an *event value*, and
//! [`Timers::advance`] returns the events that are due. The owner then
//! handles each event on its own loop, one at a time.
//!
//! # Ordering
//!
//! Events due on the same tick come back in the order their timers were
//! scheduled (handles are monotonically increasing and kept in a
//! `BTreeMap`).
//!
//! # Cancellation
//!
//! A cancelled timer never appears in a later `advance`. An event that was
//! already returned by `advance` is the caller's: if handling one event
//! cancels another timer that was due on the same tick, the second event
//! is still in the batch, and the caller's own guards must ignore it.

use std::collections::BTreeMap;
use std::fmt;

/// Identifies one scheduled timer. Returned by the `run_*` methods and
/// accepted by [`Timers::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

struct Entry<E> {
    due: u64,
    /// `Some(interval)` for repeating timers.
    every: Option<u64>,
    event: E,
}

/// A set of pending timers keyed by [`TimerHandle`].
///
/// Time only moves when [`advance`](Self::advance) is called, which makes
/// timers fully deterministic in tests: no sleeping, no mocked clocks.
pub struct Timers<E> {
    now: u64,
    next_handle: u64,
    entries: BTreeMap<TimerHandle, Entry<E>>,
}

impl<E: Clone> Timers<E> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_handle: 1,
            entries: BTreeMap::new(),
        }
    }

    /// The current tick (number of `advance` calls so far).
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedules `event` every `interval` ticks, first firing `interval`
    /// ticks from now. An interval of 0 is treated as 1.
    pub fn run_every(&mut self, interval: u64, event: E) -> TimerHandle {
        let interval = interval.max(1);
        self.insert(interval, Some(interval), event)
    }

    /// Schedules `event` once, `delay` ticks from now. A delay of 0 fires
    /// on the next `advance`.
    pub fn run_after(&mut self, delay: u64, event: E) -> TimerHandle {
        self.insert(delay.max(1), None, event)
    }

    /// Cancels a timer. Returns `false` if it already fired (one-shot) or
    /// was already cancelled; calling it twice is harmless.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    /// Whether the timer is still pending.
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Moves time forward by one tick and returns every event now due.
    ///
    /// One-shot timers are removed; repeating timers are rescheduled.
    pub fn advance(&mut self) -> Vec<(TimerHandle, E)> {
        self.now += 1;
        let now = self.now;

        let mut fired = Vec::new();
        let mut finished = Vec::new();
        for (handle, entry) in self.entries.iter_mut() {
            if entry.due > now {
                continue;
            }
            fired.push((*handle, entry.event.clone()));
            match entry.every {
                Some(interval) => entry.due = now + interval,
                None => finished.push(*handle),
            }
        }
        for handle in finished {
            self.entries.remove(&handle);
        }
        fired
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, delay: u64, every: Option<u64>, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(
            handle,
            Entry {
                due: self.now + delay,
                every,
                event,
            },
        );
        handle
    }
}

impl<E: Clone> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}
