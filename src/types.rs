//! Core wire types for the task tracker.
//!
//! This module defines [`TaskRecord`] -- the single entity persisted by the
//! store -- and [`TaskStatus`], its closed status enumeration.
//!
//! # Serialization
//!
//! Records serialize with `snake_case` field naming, matching the stored
//! attribute names exactly. Optional fields are **omitted** when absent
//! (`skip_serializing_if`), never serialized as `null` -- absence and null
//! are distinct states and only absence is valid.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Task lifecycle status.
///
/// A closed set of four states. Unlike a workflow state machine there are
/// no transition restrictions: any status may be replaced by any other via
/// a partial update.
///
/// # Examples
///
/// ```
/// use task_tracker_mcp::TaskStatus;
///
/// let status = TaskStatus::default();
/// assert_eq!(status, TaskStatus::NotStarted);
/// assert_eq!(status.to_string(), "not_started");
///
/// let parsed: TaskStatus = "in_progress".parse().unwrap();
/// assert_eq!(parsed, TaskStatus::InProgress);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not begun.
    #[default]
    NotStarted,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Done,
    /// Task is retained for history but no longer active.
    Archived,
}

impl TaskStatus {
    /// Returns the wire form of this status (`snake_case`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// The stored representation of a task.
///
/// `id` is the store's primary key, generated once at creation and never
/// mutated. `created_at` is set once; `updated_at` is refreshed on every
/// successful mutation and equals `created_at` immediately after creation.
/// The three optional fields are stored only when provided.
///
/// # Examples
///
/// ```
/// use task_tracker_mcp::{TaskRecord, TaskStatus};
///
/// let record = TaskRecord {
///     id: "5f2b1e9c-0000-4000-8000-000000000000".to_string(),
///     created_at: "2026-08-05T12:00:00.000Z".to_string(),
///     updated_at: "2026-08-05T12:00:00.000Z".to_string(),
///     task: "Write docs".to_string(),
///     status: TaskStatus::NotStarted,
///     time_to_complete: None,
///     deadline: None,
///     solutions: None,
/// };
///
/// let json = serde_json::to_value(&record).unwrap();
/// assert_eq!(json["task"], "Write docs");
/// assert_eq!(json["status"], "not_started");
/// // Absent optionals are omitted, not null.
/// assert!(json.get("deadline").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Primary key. A UUIDv4 string, immutable after creation.
    pub id: String,

    /// RFC 3339 UTC timestamp (millisecond precision) of creation.
    pub created_at: String,

    /// RFC 3339 UTC timestamp of the most recent successful mutation.
    pub updated_at: String,

    /// Free-text description, trimmed, 1-500 characters.
    pub task: String,

    /// Current lifecycle status.
    pub status: TaskStatus,

    /// Estimated minutes to complete, at most one week (10080).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_complete: Option<u32>,

    /// RFC 3339 completion deadline, strictly in the future at write time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    /// Candidate solutions, at most 10 non-empty entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solutions: Option<Vec<String>>,
}

/// Current UTC time as a sortable RFC 3339 string with millisecond precision.
///
/// This is the single timestamp format used for `created_at`, `updated_at`,
/// and failure envelope timestamps.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
