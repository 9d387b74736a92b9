// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Work registered by scripts through `run.*`, to be executed in later turns.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use tracing::debug;
use uuid::Uuid;
use warren_var::{Obj, Var};

/// Shortest interval a repeating task may be registered with.
pub const MIN_REPEAT_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq)]
pub struct DeferredTask {
    pub handle: String,
    /// What to call when the task fires.
    pub callable: Var,
    /// Who registered the task.
    pub player: Obj,
    /// Set for tasks registered with `run.every`.
    pub interval: Option<Duration>,
}

/// Pending tasks ordered by due time, ties broken by registration order.
#[derive(Default)]
pub struct DeferredQueue {
    queue: BTreeMap<(Instant, u64), DeferredTask>,
    handles: AHashMap<String, (Instant, u64)>,
    next_seq: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, due: Instant, task: DeferredTask) {
        let key = (due, self.next_seq);
        self.next_seq += 1;
        self.handles.insert(task.handle.clone(), key);
        self.queue.insert(key, task);
    }

    /// Register `callable` to run at `due`, repeating every `interval` if one is given.
    /// Returns the handle the task can be checked or cancelled by.
    pub fn schedule(
        &mut self,
        due: Instant,
        callable: Var,
        player: Obj,
        interval: Option<Duration>,
    ) -> String {
        let handle = Uuid::new_v4().simple().to_string();
        let interval = interval.map(|i| i.max(MIN_REPEAT_INTERVAL));
        debug!(handle, ?interval, "Scheduling deferred task");
        self.insert(
            due,
            DeferredTask {
                handle: handle.clone(),
                callable,
                player,
                interval,
            },
        );
        handle
    }

    /// Remove a pending task. Whether there was one to remove.
    pub fn cancel(&mut self, handle: &str) -> bool {
        match self.handles.remove(handle) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn check(&self, handle: &str) -> bool {
        self.handles.contains_key(handle)
    }

    /// Handles of pending tasks, earliest due first.
    pub fn list(&self) -> Vec<String> {
        self.queue.values().map(|t| t.handle.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Remove and return every task due at `now`, in order. Repeating tasks are re-armed for
    /// their next interval before being returned, so they stay pending while they run.
    pub fn take_due(&mut self, now: Instant) -> Vec<DeferredTask> {
        let mut due = vec![];
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let task = entry.remove();
            self.handles.remove(&task.handle);
            if let Some(next) = task.interval.and_then(|i| now.checked_add(i)) {
                self.insert(next, task.clone());
            }
            due.push(task);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use warren_var::v_int;

    fn player() -> Obj {
        Obj::mk_id("test")
    }

    #[test]
    fn test_due_order_and_ties() {
        let mut q = DeferredQueue::new();
        let now = Instant::now();
        let late = q.schedule(now + Duration::from_millis(50), v_int(1), player(), None);
        let first = q.schedule(now, v_int(2), player(), None);
        let second = q.schedule(now, v_int(3), player(), None);
        assert_eq!(q.list(), vec![first.clone(), second.clone(), late.clone()]);
        assert_eq!(q.next_due(), Some(now));

        let fired: Vec<_> = q.take_due(now).into_iter().map(|t| t.handle).collect();
        assert_eq!(fired, vec![first.clone(), second]);
        assert!(!q.check(&first));
        assert!(q.check(&late));
    }

    #[test]
    fn test_cancel_never_fails() {
        let mut q = DeferredQueue::new();
        assert!(!q.cancel("nope"));
        let h = q.schedule(Instant::now(), v_int(1), player(), None);
        assert!(q.cancel(&h));
        assert!(!q.cancel(&h));
        assert!(q.list().is_empty());
    }

    #[test]
    fn test_repeating_rearms() {
        let mut q = DeferredQueue::new();
        let now = Instant::now();
        let interval = Duration::from_millis(10);
        let h = q.schedule(now, v_int(1), player(), Some(interval));
        assert_eq!(q.take_due(now).len(), 1);
        assert!(q.check(&h));
        assert_eq!(q.next_due(), Some(now + interval));
        assert!(q.take_due(now).is_empty());
        assert_eq!(q.take_due(now + interval).len(), 1);
        assert!(q.cancel(&h));
        assert!(q.is_empty());
    }

    #[test]
    fn test_handles_are_alphanumeric() {
        let mut q = DeferredQueue::new();
        let h = q.schedule(Instant::now(), v_int(1), player(), None);
        assert_eq!(h.len(), 32);
        assert!(h.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
