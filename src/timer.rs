//! Cooperative single-threaded timers.
//!
//! The host advances the queue with the current time in milliseconds and
//! gets back every event whose deadline has passed, in deadline order.
//! Nothing here sleeps or spawns: a timer is just a deadline and a payload.
//!
//! ```ignore
//! let mut timers = TimerQueue::new();
//! timers.schedule_once(50, Event::Settle);
//! let ramp = timers.schedule_repeating(20, Event::Tick);
//!
//! for (id, event) in timers.advance(60) {
//!     // Settle at 50, Tick at 20 and 40 and 60
//! }
//! timers.cancel(ramp);
//! ```

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<E> {
    id: TimerId,
    deadline: u64,
    /// Re-arm interval for repeating timers.
    interval: Option<u64>,
    event: E,
}

/// A queue of one-shot and repeating timers on a millisecond clock.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    entries: Vec<Entry<E>>,
    next_id: u64,
    now: u64,
}

impl<E: Clone> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            now: 0,
        }
    }

    /// Time of the last [`advance`](Self::advance).
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire `event` once, `delay_ms` after the queue's current time.
    pub fn schedule_once(&mut self, delay_ms: u64, event: E) -> TimerId {
        self.push(self.now + delay_ms, None, event)
    }

    /// Fire `event` every `interval_ms` until cancelled. The first firing is
    /// one interval from now. A zero interval is treated as 1 ms.
    pub fn schedule_repeating(&mut self, interval_ms: u64, event: E) -> TimerId {
        let interval = interval_ms.max(1);
        self.push(self.now + interval, Some(interval), event)
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Whether `id` is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Pop the earliest timer due at or before `now`, moving the queue's
    /// clock to its deadline. Repeating timers are re-armed.
    ///
    /// Handlers that schedule new timers between pops see the deadline of
    /// the event being handled as "now", so chained delays stay exact even
    /// when the host advances in large steps.
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerId, E)> {
        // Earliest deadline first; ties fire in scheduling order.
        let (idx, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.id))?;

        let entry = &self.entries[idx];
        let fired = (entry.id, entry.event.clone());
        let (deadline, interval) = (entry.deadline, entry.interval);
        self.now = self.now.max(deadline);
        match interval {
            Some(interval) => self.entries[idx].deadline += interval,
            None => {
                self.entries.remove(idx);
            }
        }
        Some(fired)
    }

    /// Fire everything due at or before `now` and move the clock to `now`.
    pub fn advance(&mut self, now: u64) -> Vec<(TimerId, E)> {
        let mut fired = Vec::new();
        while let Some(event) = self.pop_due(now) {
            fired.push(event);
        }
        self.now = self.now.max(now);
        fired
    }

    /// Move the clock to `now` without firing anything. Used after draining
    /// with [`pop_due`](Self::pop_due).
    pub fn settle_clock(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    fn push(&mut self, deadline: u64, interval: Option<u64>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline,
            interval,
            event,
        });
        id
    }
}

impl<E: Clone> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Ev {
        A,
        B,
        Tick,
    }

    #[test]
    fn test_one_shot_fires_once_at_deadline() {
        let mut q = TimerQueue::new();
        q.schedule_once(50, Ev::A);
        assert!(q.advance(49).is_empty());
        let fired = q.advance(50);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, Ev::A);
        assert!(q.advance(1000).is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule_once(500, Ev::B);
        q.schedule_once(50, Ev::A);
        let events: Vec<Ev> = q.advance(1000).into_iter().map(|(_, e)| e).collect();
        assert_eq!(events, vec![Ev::A, Ev::B]);
    }

    #[test]
    fn test_repeating_rearms_until_cancelled() {
        let mut q = TimerQueue::new();
        let id = q.schedule_repeating(20, Ev::Tick);
        assert_eq!(q.advance(100).len(), 5);
        assert!(q.cancel(id));
        assert!(q.advance(1000).is_empty());
        assert!(!q.cancel(id));
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.schedule_once(10, Ev::A);
        let other = q.schedule_once(10, Ev::B);
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.is_pending(id));
        assert!(q.is_pending(other));
        let events: Vec<Ev> = q.advance(10).into_iter().map(|(_, e)| e).collect();
        assert_eq!(events, vec![Ev::B]);
        assert!(!q.is_pending(other));
    }

    #[test]
    fn test_pop_due_chains_from_deadline() {
        let mut q = TimerQueue::new();
        q.schedule_once(50, Ev::A);
        // Host jumps far ahead; the handler schedules relative to the
        // deadline of the event it is handling.
        let (_, ev) = q.pop_due(10_000).unwrap();
        assert_eq!(ev, Ev::A);
        assert_eq!(q.now(), 50);
        q.schedule_once(500, Ev::B);
        assert_eq!(q.next_deadline(), Some(550));
        let (_, ev) = q.pop_due(10_000).unwrap();
        assert_eq!(ev, Ev::B);
        q.settle_clock(10_000);
        assert_eq!(q.now(), 10_000);
    }

    #[test]
    fn test_zero_interval_repeating_is_bounded() {
        let mut q = TimerQueue::new();
        q.schedule_repeating(0, Ev::Tick);
        assert_eq!(q.advance(3).len(), 3);
    }
}
