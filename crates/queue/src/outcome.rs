//! Result values for key-update calls.

use serde::Serialize;

use crate::task::Priority;

/// What a key-update call did.
///
/// Every variant is a normal outcome; `NotFound` and `Rejected` leave the
/// queue untouched.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum KeyUpdate {
    /// The priority changed and the task was re-settled.
    Applied { old: Priority, new: Priority },
    /// No task with that identity is queued (never inserted or already extracted).
    NotFound,
    /// The new priority does not move in the requested direction.
    Rejected { current: Priority },
}

impl KeyUpdate {
    pub fn is_applied(&self) -> bool {
        matches!(self, KeyUpdate::Applied { .. })
    }
}
