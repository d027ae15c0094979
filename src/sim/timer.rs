/// Cooperative task scheduler on a virtual clock.
///
/// Everything runs on one thread: the owner asks for the next due task with
/// `pop_due(now)` and dispatches it itself. There are two kinds of task:
///   - one-shot (`after`): removed when it fires
///   - repeating (`every`): re-armed at `due + period` when it fires
///
/// Every task has a `TaskHandle`. Holders keep the handle and must cancel it
/// when the state that made the task valid ends. Cancelling an unknown or
/// already-fired handle is a no-op.
///
/// Tasks due at the same instant fire in the order they were scheduled.

use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TaskHandle(u64);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Task {
    /// One display refresh of the game loop.
    Frame,
    /// Obstacle spawner (repeating).
    SpawnObstacles,
    /// End of the level-complete interstitial.
    FinishInterstitial,
}

#[derive(Clone, Debug)]
struct Entry {
    handle: TaskHandle,
    task: Task,
    due: Duration,
    period: Option<Duration>,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler { now: Duration::ZERO, next_id: 0, entries: Vec::with_capacity(4) }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` once, `delay` from now.
    pub fn after(&mut self, delay: Duration, task: Task) -> TaskHandle {
        self.insert(task, self.now + delay, None)
    }

    /// Schedule `task` every `period`, first firing one period from now.
    /// A zero period is bumped to 1ms so the task can never spin.
    pub fn every(&mut self, period: Duration, task: Task) -> TaskHandle {
        let period = period.max(Duration::from_millis(1));
        self.insert(task, self.now + period, Some(period))
    }

    /// Cancel a pending task. Returns whether anything was removed.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    #[cfg(test)]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Take the earliest task due at or before `until`, advancing the clock
    /// to its due time. Repeating tasks are re-armed before being returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskHandle, Task)> {
        let idx = self.entries.iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.handle.0))
            .map(|(i, _)| i)?;

        let due = self.entries[idx].due;
        self.now = self.now.max(due);

        match self.entries[idx].period {
            Some(period) => {
                let entry = &mut self.entries[idx];
                entry.due += period;
                Some((entry.handle, entry.task))
            }
            None => {
                let entry = self.entries.swap_remove(idx);
                Some((entry.handle, entry.task))
            }
        }
    }

    /// Move the clock forward to `until` once nothing else is due.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Skip `delta` of wall time: the clock and every pending task move
    /// forward together, so nothing fires for the skipped span.
    pub fn shift(&mut self, delta: Duration) {
        self.now += delta;
        for e in &mut self.entries {
            e.due += delta;
        }
    }

    fn insert(&mut self, task: Task, due: Duration, period: Option<Duration>) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { handle, task, due, period });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(s: &mut Scheduler, until: Duration) -> Vec<Task> {
        let mut out = vec![];
        while let Some((_, t)) = s.pop_due(until) {
            out.push(t);
        }
        s.settle(until);
        out
    }

    #[test]
    fn one_shot_fires_once() {
        let mut s = Scheduler::new();
        let h = s.after(ms(10), Task::Frame);
        assert!(drain(&mut s, ms(9)).is_empty());
        assert_eq!(drain(&mut s, ms(10)), vec![Task::Frame]);
        assert!(!s.is_pending(h));
        assert!(drain(&mut s, ms(100)).is_empty());
    }

    #[test]
    fn repeating_task_catches_up_in_order() {
        let mut s = Scheduler::new();
        s.every(ms(15), Task::SpawnObstacles);
        s.after(ms(20), Task::FinishInterstitial);
        let fired = drain(&mut s, ms(45));
        assert_eq!(fired, vec![
            Task::SpawnObstacles,     // 15
            Task::FinishInterstitial, // 20
            Task::SpawnObstacles,     // 30
            Task::SpawnObstacles,     // 45
        ]);
        assert_eq!(s.now(), ms(45));
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut s = Scheduler::new();
        let h = s.every(ms(5), Task::SpawnObstacles);
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        assert!(drain(&mut s, ms(50)).is_empty());
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut s = Scheduler::new();
        s.after(ms(5), Task::FinishInterstitial);
        s.after(ms(5), Task::Frame);
        assert_eq!(drain(&mut s, ms(5)), vec![Task::FinishInterstitial, Task::Frame]);
    }

    #[test]
    fn delays_are_relative_to_the_virtual_clock() {
        let mut s = Scheduler::new();
        s.settle(ms(100));
        s.after(ms(10), Task::Frame);
        assert!(drain(&mut s, ms(105)).is_empty());
        assert_eq!(drain(&mut s, ms(110)), vec![Task::Frame]);
    }

    #[test]
    fn shift_skips_time_without_firing() {
        let mut s = Scheduler::new();
        s.every(ms(10), Task::SpawnObstacles);
        s.shift(ms(1000));
        assert_eq!(s.now(), ms(1000));
        assert!(drain(&mut s, ms(1009)).is_empty());
        assert_eq!(drain(&mut s, ms(1010)), vec![Task::SpawnObstacles]);
    }

    #[test]
    fn zero_period_does_not_spin() {
        let mut s = Scheduler::new();
        s.every(Duration::ZERO, Task::SpawnObstacles);
        assert_eq!(drain(&mut s, ms(3)).len(), 3);
    }
}
