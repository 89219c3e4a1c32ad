//! Fire queue ordered by next fire time.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hookcron_protocols::JobHandle;
use tokio::time::Instant;

use crate::trigger::Due;

/// A pending firing of one schedule.
#[derive(Debug, Clone, Copy)]
pub struct FireEntry {
    pub handle: JobHandle,
    pub due: Due,
}

impl PartialEq for FireEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FireEntry {}

impl PartialOrd for FireEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FireEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap: earliest fire time first, then the
        // earliest registered handle.
        other
            .due
            .at
            .cmp(&self.due.at)
            .then_with(|| other.handle.cmp(&self.handle))
    }
}

/// Min-heap of pending firings.
#[derive(Debug, Default)]
pub struct FireQueue {
    heap: BinaryHeap<FireEntry>,
}

impl FireQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: JobHandle, due: Due) {
        self.heap.push(FireEntry { handle, due });
    }

    /// Fire time of the earliest entry.
    pub fn next_fire_time(&self) -> Option<Instant> {
        self.heap.peek().map(|e| e.due.at)
    }

    /// Pop the earliest entry if it is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<FireEntry> {
        if self.heap.peek()?.due.at <= now {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Drop every entry for `handle`.
    pub fn remove(&mut self, handle: JobHandle) {
        self.heap.retain(|e| e.handle != handle);
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn due_in(secs: u64) -> Due {
        Due {
            at: Instant::now() + Duration::from_secs(secs),
            wall: Utc::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_orders_by_fire_time() {
        let mut queue = FireQueue::new();
        queue.push(JobHandle::new(1), due_in(30));
        queue.push(JobHandle::new(2), due_in(10));
        queue.push(JobHandle::new(3), due_in(20));

        let far = Instant::now() + Duration::from_secs(60);
        let order: Vec<u64> = std::iter::from_fn(|| queue.pop_due(far))
            .map(|e| e.handle.get())
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ties_break_by_registration_order() {
        let mut queue = FireQueue::new();
        let due = due_in(5);
        queue.push(JobHandle::new(8), due);
        queue.push(JobHandle::new(3), due);
        queue.push(JobHandle::new(5), due);

        let later = Instant::now() + Duration::from_secs(5);
        assert_eq!(queue.pop_due(later).unwrap().handle.get(), 3);
        assert_eq!(queue.pop_due(later).unwrap().handle.get(), 5);
        assert_eq!(queue.pop_due(later).unwrap().handle.get(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_due_respects_now() {
        let mut queue = FireQueue::new();
        queue.push(JobHandle::new(1), due_in(10));

        assert!(queue.pop_due(Instant::now()).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_fire_time(), Some(Instant::now() + Duration::from_secs(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_and_clear() {
        let mut queue = FireQueue::new();
        queue.push(JobHandle::new(1), due_in(1));
        queue.push(JobHandle::new(2), due_in(2));

        queue.remove(JobHandle::new(1));
        assert_eq!(queue.len(), 1);

        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.next_fire_time().is_none());
    }
}
