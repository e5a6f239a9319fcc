use chrono::{DateTime, TimeDelta, Utc};
use helm_common::protocol::BrowserAction;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const DEFAULT_INTERVAL_MINUTES: i64 = 5;
pub const MIN_INTERVAL_MINUTES: i64 = 1;
/// One year.
pub const MAX_INTERVAL_MINUTES: i64 = 60 * 24 * 365;
/// Execution results kept per task.
pub const RESULT_HISTORY: usize = 10;

static FIRST_INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Minutes between runs for an interval specification.
///
/// The first integer in the text is read as minutes, so `*/7 * * * *`
/// means every 7 minutes. No integer, or one that does not fit, gives the
/// default of 5.
pub fn normalize_interval(spec: &str) -> i64 {
    FIRST_INTEGER_RE
        .find(spec)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(DEFAULT_INTERVAL_MINUTES)
        .clamp(MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES)
}

/// Shorthand used when the resolver builds a schedule: `*/N * * * *`.
pub fn interval_spec(minutes: i64) -> String {
    format!("*/{} * * * *", minutes.clamp(MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Active,
    Paused,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Active => "active",
            TaskState::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub interval: String,
    pub command: String,
    pub is_active: bool,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ScheduledTask {
    pub fn interval_minutes(&self) -> i64 {
        normalize_interval(&self.interval)
    }

    pub fn period(&self) -> TimeDelta {
        TimeDelta::minutes(self.interval_minutes())
    }

    pub fn state(&self) -> TaskState {
        if self.is_active {
            TaskState::Active
        } else {
            TaskState::Paused
        }
    }

    /// Next run measured from `from`.
    pub(crate) fn next_run_after(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        from.checked_add_signed(self.period())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub interval: String,
    pub command: String,
}

/// Partial update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub interval: Option<String>,
    pub command: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecutionResult {
    pub task_id: String,
    pub success: bool,
    pub message: String,
    pub actions: Vec<BrowserAction>,
    pub timestamp: DateTime<Utc>,
}
