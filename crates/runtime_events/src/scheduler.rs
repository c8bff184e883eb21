use crate::page::Page;
use std::collections::BTreeMap;

pub(crate) type Task = Box<dyn FnOnce(&mut Page)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Virtual clock, timer queue and animation-frame queue.
///
/// Timers are ordered by due time, then by scheduling order, so two timers
/// due at the same instant run in the order they were set.
#[derive(Default)]
pub(crate) struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    timers: BTreeMap<(u64, u64), Task>,
    frames: Vec<Task>,
}

impl Scheduler {
    pub(crate) fn now(&self) -> u64 {
        self.now_ms
    }

    pub(crate) fn set_now(&mut self, now_ms: u64) {
        debug_assert!(now_ms >= self.now_ms, "virtual clock must not go backwards");
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub(crate) fn set_timeout(&mut self, delay_ms: u64, task: Task) -> TimerId {
        self.next_seq += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.timers.insert((due, self.next_seq), task);
        TimerId(self.next_seq)
    }

    pub(crate) fn next_due(&self) -> Option<u64> {
        self.timers.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer if it is due at or before `limit`.
    pub(crate) fn pop_due(&mut self, limit: u64) -> Option<(u64, Task)> {
        let (&(due, seq), _) = self.timers.iter().next()?;
        if due > limit {
            return None;
        }
        let task = self.timers.remove(&(due, seq))?;
        Some((due, task))
    }

    pub(crate) fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub(crate) fn request_frame(&mut self, task: Task) {
        self.frames.push(task);
    }

    pub(crate) fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Tasks for the next frame. Callbacks requested while these run land in
    /// the frame after.
    pub(crate) fn take_frame(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.frames)
    }
}
