//! Task records and the inputs used to create and edit them.
//!
//! The on-disk shape is a JSON array of [`Task`] with camelCase field names
//! (`dueDate`, `createdAt`), kebab-case enum values (`in-progress`) and
//! `YYYY-MM-DD` due dates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_open(self) -> bool {
        self != TaskStatus::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(Error::InvalidArgument(format!(
                "invalid status '{}' (expected todo|in-progress|completed)",
                s.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(Error::InvalidArgument(format!(
                "invalid priority '{}' (expected low|medium|high)",
                s.trim()
            ))),
        }
    }
}

/// Lowercase and fold `_`/space separators into `-` so `in_progress` and
/// `In Progress` both parse.
fn normalize_token(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .replace(['_', ' '], "-")
}

/// A persisted task record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(
        default,
        deserialize_with = "blank_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(
        default,
        deserialize_with = "blank_date_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "blank_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Records written by form-based clients store unset text fields as `""`.
fn blank_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}

fn blank_date_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_string_as_none(deserializer)? {
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(de::Error::custom),
        None => Ok(None),
    }
}

impl Task {
    /// Build a record from caller input plus store-assigned identity.
    pub fn from_input(id: String, input: TaskInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            due_date: input.due_date,
            assignee: input.assignee,
            created_at,
        }
    }

    /// Shallow-merge the fields present in `patch`; `id` and `created_at`
    /// are never touched.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = assignee.clone();
        }
    }

    pub fn is_high_priority_open(&self) -> bool {
        self.priority == TaskPriority::High && self.status.is_open()
    }
}

/// Caller-supplied fields for a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }
}

/// Partial update. `None` leaves a field alone; for optional task fields
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub assignee: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &TaskPatch::default()
    }
}

/// Parse a `YYYY-MM-DD` due date.
pub fn parse_due_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
        Error::InvalidArgument(format!(
            "invalid due date '{}' (expected YYYY-MM-DD): {err}",
            value.trim()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task {
            id: "t1".to_string(),
            title: "Fix bug".to_string(),
            description: Some("crash on start".to_string()),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: NaiveDate::from_ymd_opt(2026, 10, 20),
            assignee: Some("Sarah Chen".to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn serializes_with_camel_case_fields_and_kebab_values() {
        let mut task = sample();
        task.status = TaskStatus::InProgress;
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["status"], "in-progress");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["dueDate"], "2026-10-20");
        assert_eq!(value["createdAt"], "2026-10-01T09:30:00Z");
        assert!(value.get("due_date").is_none());
    }

    #[test]
    fn deserializes_records_with_missing_optional_fields() {
        let raw = r#"{"id":"a","title":"Write docs","createdAt":"2026-10-01T00:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn blank_optional_fields_read_as_absent() {
        let raw = r#"{"id":"a","title":"Write docs","description":"","dueDate":"","assignee":" ","createdAt":"2026-10-01T00:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.assignee, None);

        let raw = r#"{"id":"a","title":"Write docs","dueDate":null,"createdAt":"2026-10-01T00:00:00Z"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.due_date, None);

        let raw = r#"{"id":"a","title":"Write docs","dueDate":"soon","createdAt":"2026-10-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Task>(raw).is_err());
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut task = sample();
        let before = task.clone();
        task.apply(&TaskPatch {
            priority: Some(TaskPriority::High),
            ..TaskPatch::default()
        });
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.due_date, before.due_date);
        assert_eq!(task.created_at, before.created_at);
    }

    #[test]
    fn apply_can_clear_optional_fields() {
        let mut task = sample();
        task.apply(&TaskPatch {
            due_date: Some(None),
            assignee: Some(None),
            ..TaskPatch::default()
        });
        assert_eq!(task.due_date, None);
        assert_eq!(task.assignee, None);
        assert!(task.description.is_some());
    }

    #[test]
    fn status_and_priority_parse_loosely() {
        assert_eq!("In Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("HIGH".parse::<TaskPriority>().unwrap(), TaskPriority::High);
        assert!("urgent".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn parse_due_date_rejects_other_formats() {
        assert!(parse_due_date("2026-10-19").is_ok());
        assert!(parse_due_date("10/19/2026").is_err());
    }
}
