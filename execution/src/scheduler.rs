//! Timer port for the round engine.
//!
//! The engine never sleeps. It asks a [`Scheduler`] to deliver a [`Timer`] later and is
//! handed the resulting [`TimerId`] back through `Engine::fire` when the timer is due.
//! Drivers provide the clock: the bundled [`VirtualScheduler`] keeps simulated time for
//! tests and batch runs, and an async driver can map the same calls onto real timers.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// What a timer means to the engine when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Clock tick while a round is running (repeating).
    Tick,
    /// Start of a round after "place bet & start".
    DeferredStart,
    /// End of the post-round pause.
    Cooldown,
    /// Next auto-play round.
    AutoRestart,
}

/// Source of delayed and repeating timers.
///
/// Implementations must never deliver a timer after it has been cancelled. The engine also
/// ignores ids it no longer tracks, so a late delivery is harmless but wasted.
pub trait Scheduler {
    /// Deliver `timer` once after `delay`.
    fn after(&mut self, delay: Duration, timer: Timer) -> TimerId;

    /// Deliver `timer` every `interval`, starting one interval from now.
    fn repeat(&mut self, interval: Duration, timer: Timer) -> TimerId;

    /// Stop a timer. Unknown ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

impl<T: Scheduler + ?Sized> Scheduler for &mut T {
    fn after(&mut self, delay: Duration, timer: Timer) -> TimerId {
        (**self).after(delay, timer)
    }

    fn repeat(&mut self, interval: Duration, timer: Timer) -> TimerId {
        (**self).repeat(interval, timer)
    }

    fn cancel(&mut self, id: TimerId) {
        (**self).cancel(id)
    }
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    due: Duration,
    period: Option<Duration>,
    timer: Timer,
}

/// Deterministic scheduler over simulated time.
///
/// Timers due at the same instant fire in the order they were scheduled.
#[derive(Clone, Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    next_id: u64,
    entries: BTreeMap<TimerId, Entry>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of live timers.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Live timers of the given kind.
    pub fn pending_of(&self, timer: Timer) -> usize {
        self.entries.values().filter(|e| e.timer == timer).count()
    }

    /// When the earliest live timer is due.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.values().map(|e| e.due).min()
    }

    /// Move simulated time forward without firing anything.
    ///
    /// Time never moves backwards.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Pop the earliest timer due at or before `deadline`, advancing time to its due instant.
    ///
    /// Repeating timers are re-armed one period later under the same id.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(TimerId, Timer)> {
        let (id, entry) = self
            .entries
            .iter()
            .filter(|(_, e)| e.due <= deadline)
            .min_by_key(|(id, e)| (e.due, **id))
            .map(|(id, e)| (*id, *e))?;

        self.now = self.now.max(entry.due);
        match entry.period {
            Some(period) => {
                if let Some(live) = self.entries.get_mut(&id) {
                    live.due = entry.due + period;
                }
            }
            None => {
                self.entries.remove(&id);
            }
        }
        Some((id, entry.timer))
    }

    fn insert(&mut self, due: Duration, period: Option<Duration>, timer: Timer) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.entries.insert(id, Entry { due, period, timer });
        id
    }
}

impl Scheduler for VirtualScheduler {
    fn after(&mut self, delay: Duration, timer: Timer) -> TimerId {
        self.insert(self.now + delay, None, timer)
    }

    fn repeat(&mut self, interval: Duration, timer: Timer) -> TimerId {
        // A zero period would never let time advance.
        let interval = interval.max(Duration::from_millis(1));
        self.insert(self.now + interval, Some(interval), timer)
    }

    fn cancel(&mut self, id: TimerId) {
        self.entries.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut scheduler = VirtualScheduler::new();
        let id = scheduler.after(ms(100), Timer::Cooldown);
        assert!(scheduler.pop_due(ms(99)).is_none());
        assert_eq!(scheduler.pop_due(ms(100)), Some((id, Timer::Cooldown)));
        assert_eq!(scheduler.now(), ms(100));
        assert!(scheduler.pop_due(ms(1_000)).is_none());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_repeating_timer_rearms() {
        let mut scheduler = VirtualScheduler::new();
        let id = scheduler.repeat(ms(50), Timer::Tick);
        for k in 1..=3 {
            assert_eq!(scheduler.pop_due(ms(150)), Some((id, Timer::Tick)));
            assert_eq!(scheduler.now(), ms(50 * k));
        }
        assert!(scheduler.pop_due(ms(150)).is_none());
        assert!(scheduler.is_pending(id));
        assert_eq!(scheduler.next_due(), Some(ms(200)));
    }

    #[test]
    fn test_cancel_prevents_delivery() {
        let mut scheduler = VirtualScheduler::new();
        let tick = scheduler.repeat(ms(50), Timer::Tick);
        let cooldown = scheduler.after(ms(10), Timer::Cooldown);
        scheduler.cancel(tick);
        scheduler.cancel(cooldown);
        scheduler.cancel(TimerId(999));
        assert!(scheduler.pop_due(ms(10_000)).is_none());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_same_instant_fires_in_schedule_order() {
        let mut scheduler = VirtualScheduler::new();
        let first = scheduler.after(ms(100), Timer::AutoRestart);
        let second = scheduler.after(ms(100), Timer::DeferredStart);
        assert_eq!(scheduler.pop_due(ms(100)).map(|(id, _)| id), Some(first));
        assert_eq!(scheduler.pop_due(ms(100)).map(|(id, _)| id), Some(second));
    }

    #[test]
    fn test_set_now_is_monotonic() {
        let mut scheduler = VirtualScheduler::new();
        scheduler.set_now(ms(500));
        scheduler.set_now(ms(100));
        assert_eq!(scheduler.now(), ms(500));
        scheduler.after(ms(10), Timer::Cooldown);
        assert_eq!(scheduler.next_due(), Some(ms(510)));
        assert_eq!(scheduler.pending_of(Timer::Cooldown), 1);
    }
}
