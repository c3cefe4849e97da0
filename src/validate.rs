//! Field validation for task input.
//!
//! The store trusts what it is given; these checks run in the presentation
//! layer before a create or update is submitted. Lengths are counted in
//! characters, not bytes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{TaskInput, TaskPatch};

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Field name -> message, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already has one
    pub fn add(&mut self, field: &str, message: Option<String>) {
        if let Some(message) = message {
            self.0.entry(field.to_string()).or_insert(message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

pub fn required(value: &str, field: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{field} is required"));
    }
    None
}

pub fn min_length(value: &str, min: usize, field: &str) -> Option<String> {
    if !value.is_empty() && value.chars().count() < min {
        return Some(format!("{field} must be at least {min} characters"));
    }
    None
}

pub fn max_length(value: &str, max: usize, field: &str) -> Option<String> {
    if value.chars().count() > max {
        return Some(format!("{field} must be at most {max} characters"));
    }
    None
}

/// Rejects dates strictly before `today`
pub fn future_date(date: Option<NaiveDate>, today: NaiveDate) -> Option<String> {
    match date {
        Some(date) if date < today => Some("Due date cannot be in the past".to_string()),
        _ => None,
    }
}

fn title_error(title: &str) -> Option<String> {
    required(title, "Title")
        .or_else(|| min_length(title.trim(), TITLE_MIN_LEN, "Title"))
        .or_else(|| max_length(title.trim(), TITLE_MAX_LEN, "Title"))
}

fn description_error(description: Option<&str>) -> Option<String> {
    description.and_then(|value| max_length(value, DESCRIPTION_MAX_LEN, "Description"))
}

/// Validate a new task; due dates may not lie in the past.
pub fn validate_task_input(input: &TaskInput, today: NaiveDate) -> Result<()> {
    let mut errors = FieldErrors::new();
    errors.add("title", title_error(&input.title));
    errors.add("description", description_error(input.description.as_deref()));
    errors.add("dueDate", future_date(input.due_date, today));
    errors.into_result()
}

/// Validate the fields an edit actually changes.
///
/// A due date is only checked when the patch sets one, so editing other
/// fields of an overdue task still succeeds.
pub fn validate_task_patch(patch: &TaskPatch, today: NaiveDate) -> Result<()> {
    let mut errors = FieldErrors::new();
    if let Some(title) = &patch.title {
        errors.add("title", title_error(title));
    }
    if let Some(description) = &patch.description {
        errors.add("description", description_error(description.as_deref()));
    }
    if let Some(due_date) = patch.due_date {
        errors.add("dueDate", future_date(due_date, today));
    }
    errors.into_result()
}
