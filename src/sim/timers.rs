//! Session timers on simulated time
//!
//! Phase toggles, countdowns, cooldown expiries and intro delays are queued
//! here instead of firing from wall-clock callbacks. The owning game drains
//! due events at the start of each frame, ordered by due time and then by
//! scheduling order, so a timer and a frame never interleave mid-tick.

use serde::Serialize;

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Scheduled<E> {
    id: TimerId,
    due_ms: f64,
    /// Repeating timers are re-armed by this period after firing
    period_ms: Option<f64>,
    event: E,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    pending: Vec<Scheduled<E>>,
    next_id: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E: Clone> TimerQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due_ms: f64, period_ms: Option<f64>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            due_ms,
            period_ms,
            event,
        });
        id
    }

    /// Fire once, `delay_ms` after `now_ms`
    pub fn after(&mut self, now_ms: f64, delay_ms: f64, event: E) -> TimerId {
        self.push(now_ms + delay_ms, None, event)
    }

    /// Fire every `period_ms`, first at `now_ms + period_ms`.
    /// Non-positive periods are bumped to 1 ms so draining always terminates.
    pub fn every(&mut self, now_ms: f64, period_ms: f64, event: E) -> TimerId {
        let period = period_ms.max(1.0);
        self.push(now_ms + period, Some(period), event)
    }

    /// Returns true if the timer was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pop the earliest event due at or before `now_ms`.
    /// Ties go to the timer scheduled first.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<E> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.0.cmp(&b.id.0)))
            .map(|(i, _)| i)?;

        match self.pending[idx].period_ms {
            Some(period) => {
                let timer = &mut self.pending[idx];
                timer.due_ms += period;
                Some(timer.event.clone())
            }
            None => Some(self.pending.swap_remove(idx).event),
        }
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
    fn test_fires_in_due_order() {
        let mut q = TimerQueue::new();
        q.after(0.0, 200.0, Ev::B);
        q.after(0.0, 100.0, Ev::A);
        assert_eq!(q.pop_due(50.0), None);
        assert_eq!(q.pop_due(250.0), Some(Ev::A));
        assert_eq!(q.pop_due(250.0), Some(Ev::B));
        assert_eq!(q.pop_due(250.0), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_ties_keep_scheduling_order() {
        let mut q = TimerQueue::new();
        q.after(0.0, 100.0, Ev::B);
        q.after(0.0, 100.0, Ev::A);
        assert_eq!(q.pop_due(100.0), Some(Ev::B));
        assert_eq!(q.pop_due(100.0), Some(Ev::A));
    }

    #[test]
    fn test_repeating_timer_catches_up() {
        let mut q = TimerQueue::new();
        q.every(0.0, 1000.0, Ev::Tick);
        let mut fired = 0;
        while q.pop_due(3500.0).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut q = TimerQueue::new();
        let a = q.after(0.0, 10.0, Ev::A);
        let b = q.every(0.0, 10.0, Ev::Tick);
        assert!(q.is_pending(a));
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert!(q.is_pending(b));
        q.cancel_all();
        assert_eq!(q.pop_due(1_000.0), None);
    }
}
