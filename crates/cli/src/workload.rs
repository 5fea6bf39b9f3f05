//! Workload files: an ordered list of queue operations to replay.
//!
//! JSON (`.json`) and TOML (`.toml`) are accepted; anything else is read as
//! JSON. Timestamps are RFC 3339 strings.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use taskheap_core::{Result, TaskheapError};
use taskheap_queue::Priority;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// One step of a workload. Tasks are referred to by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Insert {
        name: String,
        priority: Priority,
        #[serde(default)]
        arrival: Option<DateTime<Utc>>,
        #[serde(default)]
        deadline: Option<DateTime<Utc>>,
    },
    Extract,
    Increase { name: String, priority: Priority },
    Decrease { name: String, priority: Priority },
}

impl Workload {
    /// Read and parse a workload file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        };
        let workload = parsed.map_err(|e| match e {
            TaskheapError::Parse(msg) => TaskheapError::Parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        debug!(path = %path.display(), operations = workload.operations.len(), "workload loaded");
        Ok(workload)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| TaskheapError::Parse(format!("invalid JSON workload: {}", e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TaskheapError::Parse(format!("invalid TOML workload: {}", e)))
    }
}
