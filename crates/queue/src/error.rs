//! Heap validation errors.

use thiserror::Error;

use crate::task::{Priority, TaskId};

/// Structural problem found by [`PriorityQueue::validate`](crate::PriorityQueue::validate).
///
/// Queue operations themselves never fail; these only surface when a caller
/// asks the queue to check its own invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("heap order broken at index {index}: priority {child_priority} above parent {parent} with priority {parent_priority}")]
    HeapOrder {
        index: usize,
        parent: usize,
        child_priority: Priority,
        parent_priority: Priority,
    },

    #[error("position index for task {id} points at {recorded:?}, task is stored at {actual}")]
    IndexMismatch {
        id: TaskId,
        recorded: Option<usize>,
        actual: usize,
    },

    #[error("position index holds {index} entries for {heap} stored tasks")]
    IndexSize { heap: usize, index: usize },
}
