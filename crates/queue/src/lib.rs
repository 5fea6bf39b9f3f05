//! Mutable max-priority queue over [`Task`]s.
//!
//! [`PriorityQueue`] is an array-backed binary max-heap keyed on
//! [`Task::priority`]. Besides insert and extract it supports raising or
//! lowering the priority of a task that is already queued, located by its
//! [`TaskId`] through a side index kept in step with every swap.

pub mod error;
pub mod heap;
pub mod outcome;
pub mod stats;
pub mod task;

pub use error::QueueError;
pub use heap::PriorityQueue;
pub use outcome::KeyUpdate;
pub use stats::QueueStats;
pub use task::{Priority, Task, TaskId};
