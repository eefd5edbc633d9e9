/// Purpose of a deferred action. At most one task per key is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKey {
    /// Start closing the drawer once a smooth scroll has begun.
    DrawerClose,
    /// Drop `open`/`closing` after the drawer's exit animation.
    DrawerCloseFinish,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub key: TaskKey,
    pub due_at: i64,
    pub order: i64,
}

/// Keyed one-shot timer queue. Scheduling a key that is already pending
/// replaces the earlier task instead of firing both.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: Vec<PendingTask>,
    next_order: i64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when an earlier task with the same key was superseded.
    pub fn schedule(&mut self, key: TaskKey, due_at: i64) -> bool {
        let superseded = self.cancel(key);
        let order = self.next_order;
        self.next_order += 1;
        self.queue.push(PendingTask { key, due_at, order });
        superseded
    }

    pub fn cancel(&mut self, key: TaskKey) -> bool {
        let before = self.queue.len();
        self.queue.retain(|task| task.key != key);
        self.queue.len() != before
    }

    pub fn clear(&mut self) -> usize {
        let cleared = self.queue.len();
        self.queue.clear();
        cleared
    }

    pub fn is_pending(&self, key: TaskKey) -> bool {
        self.queue.iter().any(|task| task.key == key)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn next_due(&self) -> Option<i64> {
        self.next_index(None).map(|idx| self.queue[idx].due_at)
    }

    /// Removes and returns the earliest task due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: i64) -> Option<PendingTask> {
        self.next_index(Some(now_ms)).map(|idx| self.queue.remove(idx))
    }

    pub fn pending(&self) -> Vec<PendingTask> {
        let mut tasks = self.queue.clone();
        tasks.sort_by_key(|task| (task.due_at, task.order));
        tasks
    }

    fn next_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_a_key_supersedes_the_pending_task() {
        let mut scheduler = Scheduler::new();
        assert!(!scheduler.schedule(TaskKey::DrawerClose, 260));
        assert!(scheduler.schedule(TaskKey::DrawerClose, 250));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_due(), Some(250));
    }

    #[test]
    fn pop_due_returns_tasks_in_due_then_insertion_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TaskKey::DrawerCloseFinish, 300);
        scheduler.schedule(TaskKey::DrawerClose, 300);
        assert_eq!(scheduler.pop_due(299), None);
        assert_eq!(
            scheduler.pop_due(300).map(|task| task.key),
            Some(TaskKey::DrawerCloseFinish)
        );
        assert_eq!(scheduler.pop_due(300).map(|task| task.key), Some(TaskKey::DrawerClose));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancel_reports_whether_anything_was_pending() {
        let mut scheduler = Scheduler::new();
        assert!(!scheduler.cancel(TaskKey::DrawerClose));
        scheduler.schedule(TaskKey::DrawerClose, 10);
        assert!(scheduler.is_pending(TaskKey::DrawerClose));
        assert!(scheduler.cancel(TaskKey::DrawerClose));
        assert!(!scheduler.is_pending(TaskKey::DrawerClose));
    }

    #[test]
    fn pending_is_sorted_by_due_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TaskKey::DrawerCloseFinish, 900);
        scheduler.schedule(TaskKey::DrawerClose, 100);
        let due = scheduler.pending().into_iter().map(|task| task.due_at).collect::<Vec<_>>();
        assert_eq!(due, vec![100, 900]);
        assert_eq!(scheduler.clear(), 2);
    }
}
