//! Array-backed binary max-heap with in-place key updates.
//!
//! Tasks live in a `Vec` read as a complete binary tree: the children of
//! slot `i` are `2i + 1` and `2i + 2`, its parent is `(i - 1) / 2`. Every
//! public method leaves the tree in max-heap order (no child outranks its
//! parent) before returning.
//!
//! A `TaskId -> slot` map is updated on every move, so key updates find their
//! task in O(1) and re-settle it in O(log n).

use std::collections::HashMap;

use taskheap_core::QueueConfig;
use tracing::debug;

use crate::error::QueueError;
use crate::outcome::KeyUpdate;
use crate::stats::{Direction, QueueStats};
use crate::task::{Priority, Task, TaskId};

#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: Vec<Task>,
    /// Current slot of every stored task.
    positions: HashMap<TaskId, usize>,
    stats: QueueStats,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
            stats: QueueStats::default(),
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The highest-priority task, without removing it.
    pub fn peek(&self) -> Option<&Task> {
        self.heap.first()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.positions.get(&id).map(|&slot| &self.heap[slot])
    }

    /// Stored tasks in heap (storage) order, not priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.heap.iter()
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Add a task and sift it up to its place.
    pub fn insert(&mut self, task: Task) {
        let id = task.id();
        let slot = self.heap.len();
        debug_assert!(!self.positions.contains_key(&id), "task {id} queued twice");

        self.positions.insert(id, slot);
        self.heap.push(task);
        let settled = self.sift_up(slot);

        self.stats.record_insert(self.heap.len());
        debug!(task = %id, slot = settled, len = self.heap.len(), "inserted");
    }

    /// Remove and return the highest-priority task, or `None` when empty.
    ///
    /// Among equal priorities the order is unspecified.
    pub fn extract_max(&mut self) -> Option<Task> {
        if self.heap.is_empty() {
            self.stats.record_extract(false);
            return None;
        }

        // The last task takes the root slot, then sinks.
        let top = self.heap.swap_remove(0);
        self.positions.remove(&top.id());
        if let Some(root) = self.heap.first() {
            self.positions.insert(root.id(), 0);
            self.sift_down(0);
        }

        self.stats.record_extract(true);
        debug!(
            task = %top.id(),
            priority = top.priority(),
            len = self.heap.len(),
            "extracted"
        );
        Some(top)
    }

    /// Raise a queued task's priority.
    ///
    /// Returns [`KeyUpdate::Rejected`] unless `new_priority` is strictly
    /// higher than the current one.
    pub fn increase_key(&mut self, id: TaskId, new_priority: Priority) -> KeyUpdate {
        let outcome = match self.positions.get(&id).copied() {
            None => KeyUpdate::NotFound,
            Some(slot) => {
                let current = self.heap[slot].priority;
                if new_priority <= current {
                    KeyUpdate::Rejected { current }
                } else {
                    self.heap[slot].priority = new_priority;
                    self.sift_up(slot);
                    KeyUpdate::Applied { old: current, new: new_priority }
                }
            }
        };

        self.stats.record_update(Direction::Increase, outcome);
        debug!(task = %id, new_priority, ?outcome, "increase_key");
        outcome
    }

    /// Lower a queued task's priority.
    ///
    /// Returns [`KeyUpdate::Rejected`] unless `new_priority` is strictly
    /// lower than the current one.
    pub fn decrease_key(&mut self, id: TaskId, new_priority: Priority) -> KeyUpdate {
        let outcome = match self.positions.get(&id).copied() {
            None => KeyUpdate::NotFound,
            Some(slot) => {
                let current = self.heap[slot].priority;
                if new_priority >= current {
                    KeyUpdate::Rejected { current }
                } else {
                    self.heap[slot].priority = new_priority;
                    self.sift_down(slot);
                    KeyUpdate::Applied { old: current, new: new_priority }
                }
            }
        };

        self.stats.record_update(Direction::Decrease, outcome);
        debug!(task = %id, new_priority, ?outcome, "decrease_key");
        outcome
    }

    /// Drain the queue, highest priority first.
    pub fn into_sorted_vec(mut self) -> Vec<Task> {
        let mut sorted = Vec::with_capacity(self.heap.len());
        while let Some(task) = self.extract_max() {
            sorted.push(task);
        }
        sorted
    }

    /// Check heap order and the position index against the stored tasks.
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.positions.len() != self.heap.len() {
            return Err(QueueError::IndexSize {
                heap: self.heap.len(),
                index: self.positions.len(),
            });
        }

        for (slot, task) in self.heap.iter().enumerate() {
            let recorded = self.positions.get(&task.id()).copied();
            if recorded != Some(slot) {
                return Err(QueueError::IndexMismatch {
                    id: task.id(),
                    recorded,
                    actual: slot,
                });
            }

            if slot > 0 {
                let parent = (slot - 1) / 2;
                let parent_priority = self.heap[parent].priority;
                if task.priority > parent_priority {
                    return Err(QueueError::HeapOrder {
                        index: slot,
                        parent,
                        child_priority: task.priority,
                        parent_priority,
                    });
                }
            }
        }

        Ok(())
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions.insert(self.heap[a].id(), a);
        self.positions.insert(self.heap[b].id(), b);
    }

    /// Move the task at `slot` towards the root while it outranks its parent.
    /// Returns the slot it stops in.
    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.heap[slot].priority <= self.heap[parent].priority {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    /// Move the task at `slot` towards the leaves while a child outranks it.
    /// Returns the slot it stops in.
    fn sift_down(&mut self, mut slot: usize) -> usize {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;

            let mut largest = slot;
            if left < len && self.heap[left].priority > self.heap[largest].priority {
                largest = left;
            }
            if right < len && self.heap[right].priority > self.heap[largest].priority {
                largest = right;
            }

            if largest == slot {
                return slot;
            }
            self.swap(slot, largest);
            slot = largest;
        }
    }
}

impl FromIterator<Task> for PriorityQueue {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        let mut queue = PriorityQueue::new();
        queue.extend(iter);
        queue
    }
}

impl Extend<Task> for PriorityQueue {
    fn extend<I: IntoIterator<Item = Task>>(&mut self, iter: I) {
        for task in iter {
            self.insert(task);
        }
    }
}
