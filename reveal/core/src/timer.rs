//! Logical Timer Queue
//!
//! Cancellable scheduled tasks on a logical clock. Every pending character
//! reveal in the controller is one entry in this queue.
//!
//! # Design
//!
//! - `schedule()` hands back a [`TimerHandle`] at the moment the task is
//!   queued. That handle is the only way to cancel it.
//! - Time never moves on its own. The host advances the clock explicitly
//!   (frame loop, tokio sleep, or a test), which keeps every transition
//!   deterministic.
//! - A cancelled task is removed from the queue immediately, so it can never
//!   be returned by [`TimerQueue::pop_due`] afterwards.
//!
//! ```text
//! schedule(10ms) ──► [ (10ms,#0) (10ms,#1) (20ms,#2) ] ──► pop_due(15ms)
//!                                                           ├─ (10ms,#0)
//!                                                           ├─ (10ms,#1)
//!                                                           └─ None (clock = 10ms)
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

/// Cancellation handle for a scheduled task
///
/// Ordered by deadline first and scheduling sequence second, so tasks due
/// at the same instant fire in the order they were scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle {
    deadline: Duration,
    id: u64,
}

impl TimerHandle {
    /// Logical time at which the task becomes due
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Monotonic scheduling sequence number
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Queue of cancellable tasks keyed by logical deadline
#[derive(Debug)]
pub struct TimerQueue<T> {
    /// Current logical time (elapsed since the queue was created)
    now: Duration,
    /// Next sequence number to hand out
    next_id: u64,
    /// Pending tasks, earliest first
    pending: BTreeMap<TimerHandle, T>,
}

impl<T> TimerQueue<T> {
    /// Create an empty queue with the clock at zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Current logical time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to become due `delay` after the current logical time
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerHandle {
        let handle = TimerHandle {
            deadline: self.now.saturating_add(delay),
            id: self.next_id,
        };
        self.next_id += 1;
        self.pending.insert(handle, task);
        handle
    }

    /// Cancel a pending task
    ///
    /// Returns `false` if the task already fired or was cancelled before.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    /// Whether the task behind `handle` is still waiting to fire
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Deadline of the earliest pending task
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(TimerHandle::deadline)
    }

    /// Remove and return the earliest task due at or before `until`
    ///
    /// The clock moves to the task's deadline, so anything the task schedules
    /// is measured from the moment it fired rather than from `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerHandle, T)> {
        let (&handle, _) = self.pending.first_key_value()?;
        if handle.deadline > until {
            return None;
        }
        let task = self.pending.remove(&handle)?;
        self.now = self.now.max(handle.deadline);
        Some((handle, task))
    }

    /// Move the clock forward to `to` without firing anything
    ///
    /// Never moves the clock backwards.
    pub fn advance_clock(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    /// Number of pending tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is scheduled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Cancel everything, returning how many tasks were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(20), "late");
        queue.schedule(ms(10), "early");

        assert_eq!(queue.next_deadline(), Some(ms(10)));
        assert_eq!(queue.pop_due(ms(30)).map(|(_, t)| t), Some("early"));
        assert_eq!(queue.now(), ms(10));
        assert_eq!(queue.pop_due(ms(30)).map(|(_, t)| t), Some("late"));
        assert!(queue.pop_due(ms(30)).is_none());
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(10), 'a');
        queue.schedule(ms(10), 'b');
        queue.schedule(ms(10), 'c');

        let fired: Vec<char> = std::iter::from_fn(|| queue.pop_due(ms(10)).map(|(_, t)| t)).collect();
        assert_eq!(fired, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_not_yet_due_stays_queued() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(10), ());

        assert!(queue.pop_due(ms(9)).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.now(), Duration::ZERO);
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(ms(5), "cancelled");
        queue.schedule(ms(5), "kept");

        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert!(!queue.is_pending(handle));

        let fired: Vec<&str> = std::iter::from_fn(|| queue.pop_due(ms(100)).map(|(_, t)| t)).collect();
        assert_eq!(fired, vec!["kept"]);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(ms(1), ());
        assert!(queue.pop_due(ms(1)).is_some());
        assert!(!queue.cancel(handle));
    }

    #[test]
    fn test_schedule_is_relative_to_fired_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(10), 1);

        let (_, first) = queue.pop_due(ms(100)).unwrap();
        assert_eq!(first, 1);
        let next = queue.schedule(ms(10), 2);
        assert_eq!(next.deadline(), ms(20));
    }

    #[test]
    fn test_advance_clock_is_monotonic() {
        let mut queue: TimerQueue<()> = TimerQueue::new();
        queue.advance_clock(ms(50));
        queue.advance_clock(ms(10));
        assert_eq!(queue.now(), ms(50));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(ms(1), ());
        queue.schedule(ms(2), ());

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert!(!queue.is_pending(handle));
        assert_eq!(queue.next_deadline(), None);
    }
}
