use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Ordering key. Higher value = served first.
pub type Priority = i64;

/// Identity of a queued task.
///
/// Minted only by [`Task::new`], so no two tasks share one even when every
/// other field is equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TaskId(Uuid);

impl TaskId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A unit of schedulable work.
///
/// Not `Clone`: a task has exactly one owner, either the caller or the
/// [`PriorityQueue`](crate::PriorityQueue) holding it. The priority can only
/// be changed through the queue's key-update operations.
#[derive(Debug, Serialize)]
pub struct Task {
    id: TaskId,
    name: String,
    pub(crate) priority: Priority,
    arrival_time: DateTime<Utc>,
    deadline: DateTime<Utc>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        priority: Priority,
        arrival_time: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskId::generate(),
            name: name.into(),
            priority,
            arrival_time,
            deadline,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Caller-supplied label, used in diagnostics only.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn arrival_time(&self) -> DateTime<Utc> {
        self.arrival_time
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task(ID: {}, Priority: {}, Arrival: {}, Deadline: {})",
            self.name,
            self.priority,
            self.arrival_time.to_rfc3339(),
            self.deadline.to_rfc3339()
        )
    }
}
