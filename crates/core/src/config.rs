use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub queue: QueueConfig,
    pub logging: LoggingConfig,
    pub replay: ReplayConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TASKHEAP_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TASKHEAP_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            queue: QueueConfig::from_env_profiled(p),
            logging: LoggingConfig::from_env_profiled(p),
            replay: ReplayConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  queue:    initial_capacity={}", self.queue.initial_capacity);
        tracing::info!("  logging:  level={}", self.logging.level);
        tracing::info!(
            "  replay:   default_deadline_secs={}, verify={}",
            self.replay.default_deadline_secs,
            self.replay.verify
        );
    }

    /// Return the resolved config as JSON (used by `--json` reports).
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "queue": { "initial_capacity": self.queue.initial_capacity },
            "logging": { "level": self.logging.level },
            "replay": {
                "default_deadline_secs": self.replay.default_deadline_secs,
                "verify": self.replay.verify,
            },
        })
    }
}

// ── Queue ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Slots reserved up front in the backing vector.
    pub initial_capacity: usize,
}

impl QueueConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            initial_capacity: profiled_env_usize(p, "TASKHEAP_INITIAL_CAPACITY", 64),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { initial_capacity: 64 }
    }
}

// ── Logging ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is unset.
    pub level: String,
}

impl LoggingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            level: profiled_env_or(p, "TASKHEAP_LOG_LEVEL", "info"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

// ── Replay ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Deadline offset from arrival for workload tasks that omit one.
    pub default_deadline_secs: u64,
    /// Validate the heap after every replayed operation.
    pub verify: bool,
}

impl ReplayConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            default_deadline_secs: profiled_env_u64(p, "TASKHEAP_DEFAULT_DEADLINE_SECS", 3600),
            verify: profiled_env_bool(p, "TASKHEAP_VERIFY", false),
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            default_deadline_secs: 3600,
            verify: false,
        }
    }
}
