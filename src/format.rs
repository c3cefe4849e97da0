//! Display helpers for task fields.

use chrono::NaiveDate;

use crate::task::{TaskPriority, TaskStatus};

const ELLIPSIS: &str = "...";

/// `Oct 19, 2026`, or `No date`
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "No date".to_string(),
    }
}

/// Due-date badge text relative to `today`; empty when there is no date.
pub fn relative_due(date: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(date) = date else {
        return String::new();
    };
    match (date - today).num_days() {
        days if days < 0 => "Overdue".to_string(),
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        days => format!("Due in {days} days"),
    }
}

pub fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "To Do",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Completed => "Completed",
    }
}

pub fn priority_label(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "Low",
        TaskPriority::Medium => "Medium",
        TaskPriority::High => "High",
    }
}

/// Cut `value` to at most `max` characters, marking the cut with `...`.
/// When `max` leaves no room for the marker the value is cut bare.
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    if max <= ELLIPSIS.len() {
        return value.chars().take(max).collect();
    }
    let mut out: String = value.chars().take(max - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}
