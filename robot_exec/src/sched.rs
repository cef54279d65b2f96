//! # Scheduler module
//!
//! Cooperative timer queue for the control core.
//!
//! Timers are identified by a [`TimerHandle`], which pairs a slot index with the generation of the
//! slot at the time the timer was armed. Cancelling a timer (or a one-shot timer firing) bumps the
//! generation of its slot, so an old handle can never match a newer timer reusing the same slot,
//! and the scheduler never yields a cancelled entry.
//!
//! Timers never fire on their own: the owner of the scheduler calls [`Scheduler::pop_due`] with
//! the current time and handles the fired timers one at a time, so that cancellations made while
//! handling one timer take effect before the next is popped.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to an armed timer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TimerHandle {
    slot: usize,
    gen: u64,
}

/// A timer that has come due.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fired<O> {
    pub handle: TimerHandle,

    /// The owner tag given when the timer was armed.
    pub owner: O,

    /// The time the timer was due, which is the time the handler should act at.
    pub due: Duration,
}

/// Cooperative timer scheduler, each timer is tagged with an owner of type `O`.
#[derive(Debug)]
pub struct Scheduler<O> {
    slots: Vec<Slot<O>>,

    /// Arming order counter, used to break ties between timers due at the same time.
    next_seq: u64,
}

#[derive(Debug)]
struct Slot<O> {
    gen: u64,
    entry: Option<Entry<O>>,
}

#[derive(Debug)]
struct Entry<O> {
    owner: O,
    due: Duration,
    period: Option<Duration>,
    seq: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<O> Default for Scheduler<O> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<O: Copy + PartialEq> Scheduler<O> {
    /// Create a new empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer which fires once `delay` after `now`.
    pub fn once(&mut self, owner: O, now: Duration, delay: Duration) -> TimerHandle {
        self.arm(owner, now + delay, None)
    }

    /// Arm a periodic timer which first fires `period` after `now` and then every `period`.
    ///
    /// A zero period is raised to one millisecond so that the timer can't fire forever at a
    /// single instant.
    pub fn every(&mut self, owner: O, now: Duration, period: Duration) -> TimerHandle {
        let period = period.max(Duration::from_millis(1));
        self.arm(owner, now + period, Some(period))
    }

    /// Cancel a timer.
    ///
    /// Returns `true` if the timer was still armed. Cancelling a stale handle is a no-op.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.slots.get_mut(handle.slot) {
            Some(slot) if slot.gen == handle.gen && slot.entry.is_some() => {
                slot.entry = None;
                slot.gen += 1;
                true
            }
            _ => false,
        }
    }

    /// Cancel every timer belonging to `owner`, returning how many were cancelled.
    pub fn cancel_owner(&mut self, owner: O) -> usize {
        let mut num_cancelled = 0;

        for slot in self.slots.iter_mut() {
            if matches!(slot.entry, Some(ref e) if e.owner == owner) {
                slot.entry = None;
                slot.gen += 1;
                num_cancelled += 1;
            }
        }

        num_cancelled
    }

    /// Returns true if the timer behind this handle is still armed.
    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        matches!(
            self.slots.get(handle.slot),
            Some(slot) if slot.gen == handle.gen && slot.entry.is_some()
        )
    }

    /// Number of armed timers.
    pub fn num_armed(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    /// Number of armed timers belonging to `owner`.
    pub fn num_armed_for(&self, owner: O) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.entry, Some(ref e) if e.owner == owner))
            .count()
    }

    /// The earliest time at which a timer is due, or `None` if no timers are armed.
    pub fn next_due(&self) -> Option<Duration> {
        self.slots
            .iter()
            .filter_map(|s| s.entry.as_ref().map(|e| e.due))
            .min()
    }

    /// Pop the earliest timer due at or before `now`.
    ///
    /// Periodic timers are re-armed one period after their due time, so a caller that falls
    /// behind gets one firing per elapsed period. One-shot timers are disarmed and their handle
    /// becomes stale.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired<O>> {
        let (idx, _) = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.entry.as_ref().map(|e| (i, (e.due, e.seq))))
            .filter(|(_, (due, _))| *due <= now)
            .min_by_key(|(_, key)| *key)?;

        let seq = self.take_seq();
        let slot = &mut self.slots[idx];
        let handle = TimerHandle {
            slot: idx,
            gen: slot.gen,
        };

        let (fired, keep) = match slot.entry {
            Some(ref mut e) => {
                let fired = Fired {
                    handle,
                    owner: e.owner,
                    due: e.due,
                };

                match e.period {
                    Some(p) => {
                        e.due += p;
                        e.seq = seq;
                        (fired, true)
                    }
                    None => (fired, false),
                }
            }
            None => return None,
        };

        if !keep {
            slot.entry = None;
            slot.gen += 1;
        }

        Some(fired)
    }

    fn arm(&mut self, owner: O, due: Duration, period: Option<Duration>) -> TimerHandle {
        let entry = Entry {
            owner,
            due,
            period,
            seq: self.take_seq(),
        };

        // Reuse a free slot if there is one
        let slot = match self.slots.iter().position(|s| s.entry.is_none()) {
            Some(i) => i,
            None => {
                self.slots.push(Slot {
                    gen: 0,
                    entry: None,
                });
                self.slots.len() - 1
            }
        };

        self.slots[slot].entry = Some(entry);

        TimerHandle {
            slot,
            gen: self.slots[slot].gen,
        }
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
