//! Filter selection for the task list view.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::task::{Task, TaskPriority, TaskStatus};

/// Status filter: everything, or one status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => status.fmt(f),
        }
    }
}

/// Priority filter: everything, or one priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(TaskPriority),
}

impl PriorityFilter {
    pub fn matches(self, priority: TaskPriority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(wanted) => wanted == priority,
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(PriorityFilter::All);
        }
        s.parse().map(PriorityFilter::Only)
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("all"),
            PriorityFilter::Only(priority) => priority.fmt(f),
        }
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for PriorityFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Active filter selection. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub search: String,
}

impl FilterSpec {
    /// True when any filter narrows the list
    pub fn is_active(&self) -> bool {
        self.status != StatusFilter::All
            || self.priority != PriorityFilter::All
            || !self.search.is_empty()
    }

    /// Status and priority match, and the search term (case-insensitive)
    /// appears in the title or description. An empty search matches all.
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_lowered(task, &self.search.to_lowercase())
    }

    /// Matching tasks in their existing order
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let needle = self.search.to_lowercase();
        tasks
            .iter()
            .filter(|task| self.matches_lowered(task, &needle))
            .collect()
    }

    /// `matches` with the search term already lowercased
    fn matches_lowered(&self, task: &Task, needle: &str) -> bool {
        self.status.matches(task.status)
            && self.priority.matches(task.priority)
            && matches_search(task, needle)
    }

    /// Merge the fields present in `patch`
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(search) = patch.search {
            self.search = search;
        }
    }
}

fn matches_search(task: &Task, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(needle)
        || task
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
}

/// Partial filter update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub status: Option<StatusFilter>,
    pub priority: Option<PriorityFilter>,
    pub search: Option<String>,
}

impl FilterPatch {
    pub fn status(status: StatusFilter) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn priority(priority: PriorityFilter) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(title: &str, description: Option<&str>, status: TaskStatus, priority: TaskPriority) -> Task {
        Task {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            description: description.map(str::to_string),
            status,
            priority,
            due_date: None,
            assignee: None,
            created_at: Utc::now(),
        }
    }

    fn fixture() -> Vec<Task> {
        vec![
            task("Fix bug", Some("Crash on start"), TaskStatus::Todo, TaskPriority::High),
            task("Write docs", None, TaskStatus::Completed, TaskPriority::Low),
            task("Review PR", Some("Check the DOCS folder"), TaskStatus::InProgress, TaskPriority::Medium),
        ]
    }

    fn titles(tasks: Vec<&Task>) -> Vec<&str> {
        tasks.into_iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn default_spec_matches_everything_in_order() {
        let tasks = fixture();
        let spec = FilterSpec::default();
        assert!(!spec.is_active());
        assert_eq!(titles(spec.apply(&tasks)), ["Fix bug", "Write docs", "Review PR"]);
    }

    #[test]
    fn search_covers_title_and_description_case_insensitively() {
        let tasks = fixture();
        let spec = FilterSpec {
            search: "DoC".to_string(),
            ..FilterSpec::default()
        };
        assert!(spec.is_active());
        assert_eq!(titles(spec.apply(&tasks)), ["Write docs", "Review PR"]);
    }

    #[test]
    fn status_and_priority_combine() {
        let tasks = fixture();
        let spec = FilterSpec {
            status: StatusFilter::Only(TaskStatus::Todo),
            priority: PriorityFilter::Only(TaskPriority::Low),
            search: String::new(),
        };
        assert!(spec.apply(&tasks).is_empty());
        assert!(spec.matches(&task("x", None, TaskStatus::Todo, TaskPriority::Low)));
    }

    #[test]
    fn apply_agrees_with_matches() {
        let tasks = fixture();
        let spec = FilterSpec {
            status: StatusFilter::Only(TaskStatus::InProgress),
            priority: PriorityFilter::All,
            search: "DOCS".to_string(),
        };
        let by_matches: Vec<&Task> = tasks.iter().filter(|task| spec.matches(task)).collect();
        assert_eq!(spec.apply(&tasks), by_matches);
        assert_eq!(titles(by_matches), ["Review PR"]);
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let mut spec = FilterSpec::default();
        spec.merge(FilterPatch::search("bug"));
        spec.merge(FilterPatch::status(StatusFilter::Only(TaskStatus::Todo)));
        assert_eq!(spec.search, "bug");
        assert_eq!(spec.status, StatusFilter::Only(TaskStatus::Todo));
        assert_eq!(spec.priority, PriorityFilter::All);
    }

    #[test]
    fn filters_parse_all_and_values() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "in-progress".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(TaskStatus::InProgress)
        );
        assert_eq!("ALL".parse::<PriorityFilter>().unwrap(), PriorityFilter::All);
        assert_eq!(
            "high".parse::<PriorityFilter>().unwrap(),
            PriorityFilter::Only(TaskPriority::High)
        );
        assert!("soon".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::Only(TaskStatus::InProgress).to_string(), "in-progress");
    }
}
