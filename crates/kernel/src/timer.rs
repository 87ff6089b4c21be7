//! Scheduled one-shot and repeating timers driven by simulated time.
//!
//! Timers never fire on their own: the owner polls `pop_due` once per tick
//! with the current clock and handles every payload it gets back.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle returned by the schedule calls, used to cancel a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TimerId,
    interval: Option<Duration>,
    payload: T,
}

/// Timer queue ordered by due time, then by insertion order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    /// Keyed by (due, insertion sequence) so equal due times fire in order.
    queue: BTreeMap<(Duration, u64), Pending<T>>,
    index: HashMap<TimerId, (Duration, u64)>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            queue: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `payload` once at `due`.
    pub fn schedule_once(&mut self, due: Duration, payload: T) -> TimerId {
        self.insert(due, None, payload)
    }

    /// Fire `payload` at `first_due` and then every `interval` after it.
    ///
    /// A zero interval is bumped to one nanosecond so polling always terminates.
    pub fn schedule_repeating(&mut self, first_due: Duration, interval: Duration, payload: T) -> TimerId {
        let interval = interval.max(Duration::from_nanos(1));
        self.insert(first_due, Some(interval), payload)
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Remove and return every timer due at or before `now`, in firing order.
    ///
    /// A repeating timer that missed several periods fires once per missed
    /// period, then stays armed for the next one.
    pub fn pop_due(&mut self, now: Duration) -> Vec<(TimerId, T)> {
        let mut fired = Vec::new();
        while let Some((&(due, seq), _)) = self.queue.first_key_value() {
            if due > now {
                break;
            }
            let Some(pending) = self.queue.remove(&(due, seq)) else {
                break;
            };
            self.index.remove(&pending.id);
            fired.push((pending.id, pending.payload.clone()));
            if let Some(interval) = pending.interval {
                let key = (due + interval, self.bump());
                self.index.insert(pending.id, key);
                self.queue.insert(key, pending);
            }
        }
        fired
    }

    fn insert(&mut self, due: Duration, interval: Option<Duration>, payload: T) -> TimerId {
        let seq = self.bump();
        let id = TimerId(seq);
        self.index.insert(id, (due, seq));
        self.queue.insert(
            (due, seq),
            Pending {
                id,
                interval,
                payload,
            },
        );
        id
    }

    fn bump(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn one_shot_fires_once_when_due() {
        let mut q = TimerQueue::new();
        q.schedule_once(ms(100), "break");
        assert!(q.pop_due(ms(99)).is_empty());
        let fired = q.pop_due(ms(100));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, "break");
        assert!(q.pop_due(ms(1000)).is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn fires_in_due_then_insertion_order() {
        let mut q = TimerQueue::new();
        q.schedule_once(ms(50), 'b');
        q.schedule_once(ms(10), 'a');
        q.schedule_once(ms(50), 'c');
        let order: Vec<char> = q.pop_due(ms(60)).into_iter().map(|(_, p)| p).collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut q = TimerQueue::new();
        let id = q.schedule_once(ms(10), 1);
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(q.pop_due(ms(20)).is_empty());
    }

    #[test]
    fn repeating_timer_rearms() {
        let mut q = TimerQueue::new();
        let id = q.schedule_repeating(ms(100), ms(100), ());
        assert_eq!(q.pop_due(ms(100)).len(), 1);
        assert!(q.is_pending(id));
        assert!(q.pop_due(ms(150)).is_empty());
        assert_eq!(q.pop_due(ms(200)).len(), 1);
    }

    #[test]
    fn repeating_timer_catches_up() {
        let mut q = TimerQueue::new();
        q.schedule_repeating(ms(100), ms(100), ());
        assert_eq!(q.pop_due(ms(350)).len(), 3);
        assert_eq!(q.pop_due(ms(400)).len(), 1);
    }

    #[test]
    fn cancel_repeating_after_fire() {
        let mut q = TimerQueue::new();
        let id = q.schedule_repeating(ms(10), ms(10), ());
        q.pop_due(ms(10));
        assert!(q.cancel(id));
        assert!(q.pop_due(ms(100)).is_empty());
    }
}
