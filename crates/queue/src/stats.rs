use serde::Serialize;

use crate::outcome::KeyUpdate;

/// Operation counters kept by a [`PriorityQueue`](crate::PriorityQueue).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Tasks inserted.
    pub inserted: u64,
    /// Tasks handed back by `extract_max`.
    pub extracted: u64,
    /// `extract_max` calls on an empty queue.
    pub empty_extractions: u64,
    /// Applied `increase_key` calls.
    pub increases: u64,
    /// Applied `decrease_key` calls.
    pub decreases: u64,
    /// Key updates naming a task that is not queued.
    pub updates_not_found: u64,
    /// Key updates refused for moving in the wrong direction.
    pub updates_rejected: u64,
    /// Largest size the queue has reached.
    pub peak_len: usize,
}

/// Direction of a key update, for bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Increase,
    Decrease,
}

impl QueueStats {
    pub(crate) fn record_insert(&mut self, len: usize) {
        self.inserted += 1;
        self.peak_len = self.peak_len.max(len);
    }

    pub(crate) fn record_extract(&mut self, found: bool) {
        if found {
            self.extracted += 1;
        } else {
            self.empty_extractions += 1;
        }
    }

    pub(crate) fn record_update(&mut self, direction: Direction, outcome: KeyUpdate) {
        match (outcome, direction) {
            (KeyUpdate::Applied { .. }, Direction::Increase) => self.increases += 1,
            (KeyUpdate::Applied { .. }, Direction::Decrease) => self.decreases += 1,
            (KeyUpdate::NotFound, _) => self.updates_not_found += 1,
            (KeyUpdate::Rejected { .. }, _) => self.updates_rejected += 1,
        }
    }
}
