//! Replays a [`Workload`] against a [`PriorityQueue`].

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use taskheap_core::{Config, Result, TaskheapError};
use taskheap_queue::{KeyUpdate, Priority, PriorityQueue, QueueError, QueueStats, Task, TaskId};

use crate::workload::{Operation, Workload};

/// Snapshot of a task handed out by the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedTask {
    pub name: String,
    pub priority: Priority,
    pub arrival: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

impl From<&Task> for ExtractedTask {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name().to_string(),
            priority: task.priority(),
            arrival: task.arrival_time(),
            deadline: task.deadline(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Increase,
    Decrease,
}

/// A key update and what the queue made of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateRecord {
    pub step: usize,
    pub name: String,
    pub kind: UpdateKind,
    pub requested: Priority,
    pub outcome: KeyUpdate,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Tasks in the order `extract` steps returned them.
    pub extracted: Vec<ExtractedTask>,
    /// Tasks pulled out after the workload when draining.
    pub drained: Vec<ExtractedTask>,
    pub updates: Vec<UpdateRecord>,
    /// Tasks still queued at the end.
    pub remaining: usize,
    pub stats: QueueStats,
}

/// Upper bound on the configured default deadline offset (100 years).
const MAX_DEADLINE_SECS: u64 = 100 * 365 * 24 * 60 * 60;

pub struct Replayer {
    queue: PriorityQueue,
    /// Name -> identity of the latest task inserted under that name.
    names: HashMap<String, TaskId>,
    default_deadline: Duration,
    verify: bool,
    started_at: DateTime<Utc>,
}

impl Replayer {
    pub fn new(config: &Config) -> Self {
        Self {
            queue: PriorityQueue::from_config(&config.queue),
            names: HashMap::new(),
            default_deadline: Duration::seconds(
                config.replay.default_deadline_secs.min(MAX_DEADLINE_SECS) as i64,
            ),
            verify: config.replay.verify,
            started_at: Utc::now(),
        }
    }

    /// Check the heap after every step.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Arrival time used for tasks that do not give one.
    #[cfg(test)]
    pub fn with_start_time(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Run every operation in order, optionally draining the queue afterwards.
    pub fn run(mut self, workload: &Workload, drain: bool) -> Result<Report> {
        info!(operations = workload.operations.len(), verify = self.verify, "replay started");

        let mut extracted = Vec::new();
        let mut updates = Vec::new();

        for (step, op) in workload.operations.iter().enumerate() {
            match op {
                Operation::Insert { name, priority, arrival, deadline } => {
                    self.insert(step, name, *priority, *arrival, *deadline)?;
                }
                Operation::Extract => match self.queue.extract_max() {
                    Some(task) => {
                        debug!(step, task = %task, "extract");
                        extracted.push(ExtractedTask::from(&task));
                    }
                    None => debug!(step, "extract on empty queue"),
                },
                Operation::Increase { name, priority } => {
                    let id = self.resolve(step, name)?;
                    let outcome = self.queue.increase_key(id, *priority);
                    updates.push(Self::record(step, name, UpdateKind::Increase, *priority, outcome));
                }
                Operation::Decrease { name, priority } => {
                    let id = self.resolve(step, name)?;
                    let outcome = self.queue.decrease_key(id, *priority);
                    updates.push(Self::record(step, name, UpdateKind::Decrease, *priority, outcome));
                }
            }

            if self.verify {
                self.queue.validate().map_err(|e| invariant_error(step, e))?;
            }
        }

        let mut drained = Vec::new();
        if drain {
            while let Some(task) = self.queue.extract_max() {
                drained.push(ExtractedTask::from(&task));
            }
        }

        let report = Report {
            extracted,
            drained,
            updates,
            remaining: self.queue.len(),
            stats: self.queue.stats().clone(),
        };
        info!(
            extracted = report.extracted.len(),
            drained = report.drained.len(),
            remaining = report.remaining,
            "replay finished"
        );
        Ok(report)
    }

    fn insert(
        &mut self,
        step: usize,
        name: &str,
        priority: Priority,
        arrival: Option<DateTime<Utc>>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if let Some(&existing) = self.names.get(name) {
            if self.queue.contains(existing) {
                return Err(TaskheapError::Workload(format!(
                    "step {}: task '{}' is already queued",
                    step, name
                )));
            }
        }

        let arrival = arrival.unwrap_or(self.started_at);
        let deadline = match deadline {
            Some(d) => d,
            None => arrival.checked_add_signed(self.default_deadline).ok_or_else(|| {
                TaskheapError::Workload(format!("step {}: default deadline for '{}' overflows", step, name))
            })?,
        };
        let task = Task::new(name, priority, arrival, deadline);
        debug!(step, task = %task, "insert");

        self.names.insert(name.to_string(), task.id());
        self.queue.insert(task);
        Ok(())
    }

    fn resolve(&self, step: usize, name: &str) -> Result<TaskId> {
        self.names.get(name).copied().ok_or_else(|| {
            TaskheapError::Workload(format!("step {}: task '{}' was never inserted", step, name))
        })
    }

    fn record(
        step: usize,
        name: &str,
        kind: UpdateKind,
        requested: Priority,
        outcome: KeyUpdate,
    ) -> UpdateRecord {
        if !outcome.is_applied() {
            warn!(step, task = name, ?kind, requested, ?outcome, "key update ignored");
        }
        UpdateRecord {
            step,
            name: name.to_string(),
            kind,
            requested,
            outcome,
        }
    }
}

fn invariant_error(step: usize, err: QueueError) -> TaskheapError {
    TaskheapError::Invariant(format!("after step {}: {}", step, err))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "extraction order:")?;
        for (i, task) in self.extracted.iter().enumerate() {
            writeln!(f, "  {:>3}. {} (priority {})", i + 1, task.name, task.priority)?;
        }
        if !self.drained.is_empty() {
            writeln!(f, "drained:")?;
            for (i, task) in self.drained.iter().enumerate() {
                writeln!(f, "  {:>3}. {} (priority {})", i + 1, task.name, task.priority)?;
            }
        }
        if !self.updates.is_empty() {
            writeln!(f, "key updates:")?;
            for u in &self.updates {
                let verb = match u.kind {
                    UpdateKind::Increase => "increase",
                    UpdateKind::Decrease => "decrease",
                };
                let result = match u.outcome {
                    KeyUpdate::Applied { old, new } => format!("applied ({} -> {})", old, new),
                    KeyUpdate::NotFound => "not found".to_string(),
                    KeyUpdate::Rejected { current } => format!("rejected (current {})", current),
                };
                writeln!(f, "  step {}: {} {} to {}: {}", u.step, verb, u.name, u.requested, result)?;
            }
        }
        writeln!(f, "remaining: {}", self.remaining)?;
        write!(
            f,
            "stats: inserted={} extracted={} empty_extractions={} increases={} decreases={} not_found={} rejected={} peak_len={}",
            self.stats.inserted,
            self.stats.extracted,
            self.stats.empty_extractions,
            self.stats.increases,
            self.stats.decreases,
            self.stats.updates_not_found,
            self.stats.updates_rejected,
            self.stats.peak_len
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn insert(name: &str, priority: Priority) -> Operation {
        Operation::Insert { name: name.into(), priority, arrival: None, deadline: None }
    }

    fn replayer() -> Replayer {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        Replayer::new(&Config::default()).with_verify(true).with_start_time(start)
    }

    fn names(tasks: &[ExtractedTask]) -> Vec<&str> {
        tasks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn extracts_highest_first() {
        let mut operations: Vec<Operation> = [5, 1, 9, 3, 8]
            .iter()
            .enumerate()
            .map(|(i, &p)| insert(&format!("t{}", i), p))
            .collect();
        operations.extend(std::iter::repeat(Operation::Extract).take(6));

        let report = replayer().run(&Workload { operations }, false).unwrap();
        let order: Vec<Priority> = report.extracted.iter().map(|t| t.priority).collect();
        assert_eq!(order, vec![9, 8, 5, 3, 1]);
        assert_eq!(report.stats.empty_extractions, 1);
        assert_eq!(report.remaining, 0);
    }

    #[test]
    fn increase_then_extract() {
        let workload = Workload {
            operations: vec![
                insert("A", 1),
                insert("B", 2),
                insert("C", 3),
                Operation::Increase { name: "A".into(), priority: 10 },
                Operation::Extract,
            ],
        };

        let report = replayer().run(&workload, true).unwrap();
        assert_eq!(names(&report.extracted), vec!["A"]);
        assert_eq!(names(&report.drained), vec!["C", "B"]);
        assert_eq!(report.updates[0].outcome, KeyUpdate::Applied { old: 1, new: 10 });
    }

    #[test]
    fn decrease_then_extract() {
        let workload = Workload {
            operations: vec![
                insert("A", 10),
                insert("B", 2),
                Operation::Decrease { name: "A".into(), priority: 1 },
                Operation::Extract,
            ],
        };

        let report = replayer().run(&workload, false).unwrap();
        assert_eq!(names(&report.extracted), vec!["B"]);
        assert_eq!(report.remaining, 1);
    }

    #[test]
    fn updates_after_extraction_are_not_found() {
        let workload = Workload {
            operations: vec![
                insert("A", 4),
                Operation::Extract,
                Operation::Increase { name: "A".into(), priority: 9 },
                insert("B", 1),
                Operation::Increase { name: "B".into(), priority: 0 },
            ],
        };

        let report = replayer().run(&workload, false).unwrap();
        assert_eq!(report.updates[0].outcome, KeyUpdate::NotFound);
        assert_eq!(report.updates[1].outcome, KeyUpdate::Rejected { current: 1 });
        assert_eq!(report.stats.updates_not_found, 1);
        assert_eq!(report.stats.updates_rejected, 1);
    }

    #[test]
    fn name_can_be_reused_once_extracted() {
        let workload = Workload {
            operations: vec![insert("A", 1), Operation::Extract, insert("A", 2), Operation::Extract],
        };

        let report = replayer().run(&workload, false).unwrap();
        let order: Vec<Priority> = report.extracted.iter().map(|t| t.priority).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn duplicate_live_name_is_an_error() {
        let workload = Workload { operations: vec![insert("A", 1), insert("A", 2)] };
        let err = replayer().run(&workload, false).unwrap_err();
        assert!(matches!(err, TaskheapError::Workload(ref m) if m.contains("already queued")));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let workload = Workload {
            operations: vec![Operation::Decrease { name: "ghost".into(), priority: 0 }],
        };
        let err = replayer().run(&workload, false).unwrap_err();
        assert!(matches!(err, TaskheapError::Workload(ref m) if m.contains("never inserted")));
    }

    #[test]
    fn default_timestamps_come_from_config() {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let workload = Workload { operations: vec![insert("A", 1), Operation::Extract] };

        let report = replayer().run(&workload, false).unwrap();
        let task = &report.extracted[0];
        assert_eq!(task.arrival, start);
        assert_eq!(task.deadline, start + Duration::seconds(3600));
    }

    #[test]
    fn report_renders_as_text_and_json() {
        let workload = Workload {
            operations: vec![
                insert("A", 1),
                Operation::Increase { name: "A".into(), priority: 3 },
                Operation::Extract,
            ],
        };
        let report = replayer().run(&workload, false).unwrap();

        let text = report.to_string();
        assert!(text.contains("1. A (priority 3)"));
        assert!(text.contains("increase A to 3: applied (1 -> 3)"));
        assert!(text.contains("remaining: 0"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["extracted"][0]["name"], "A");
        assert_eq!(json["updates"][0]["outcome"]["outcome"], "applied");
        assert_eq!(json["stats"]["inserted"], 1);
    }

    #[test]
    fn default_deadline_overflow_is_an_error() {
        let workload = Workload {
            operations: vec![Operation::Insert {
                name: "late".into(),
                priority: 1,
                arrival: Some(DateTime::<Utc>::MAX_UTC),
                deadline: None,
            }],
        };

        let err = replayer().run(&workload, false).unwrap_err();
        assert!(
            matches!(err, TaskheapError::Workload(ref m) if m.contains("step 0") && m.contains("overflows")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn explicit_deadline_skips_default_offset() {
        let deadline = DateTime::<Utc>::MAX_UTC;
        let workload = Workload {
            operations: vec![
                Operation::Insert {
                    name: "late".into(),
                    priority: 1,
                    arrival: Some(deadline),
                    deadline: Some(deadline),
                },
                Operation::Extract,
            ],
        };

        let report = replayer().run(&workload, false).unwrap();
        assert_eq!(report.extracted[0].deadline, deadline);
    }

    #[test]
    fn invariant_error_names_the_step() {
        let err = invariant_error(
            3,
            QueueError::HeapOrder { index: 1, parent: 0, child_priority: 20, parent_priority: 9 },
        );
        match err {
            TaskheapError::Invariant(ref m) => {
                assert!(m.starts_with("after step 3: heap order broken at index 1"), "got: {m}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Invariant violated: after step 3:"));
    }

    #[test]
    fn sample_workload_replays_cleanly() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/workload.toml");
        let workload = Workload::load(&path).unwrap();

        let report = replayer().run(&workload, true).unwrap();
        assert_eq!(names(&report.extracted), vec!["rebuild-index", "snapshot"]);
        assert_eq!(names(&report.drained), vec!["compact-segments", "vacuum", "flush-wal"]);
        let outcomes: Vec<KeyUpdate> = report.updates.iter().map(|u| u.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                KeyUpdate::Applied { old: 1, new: 10 },
                KeyUpdate::Applied { old: 9, new: 2 },
                KeyUpdate::Rejected { current: 3 },
                KeyUpdate::NotFound,
            ]
        );
        assert_eq!(report.remaining, 0);
    }
}
