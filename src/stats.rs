//! Aggregate counts shown on the dashboard.

use serde::Serialize;

use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub todo: usize,
    /// High priority and not yet completed
    pub high_priority_open: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Todo => stats.todo += 1,
            }
            if task.is_high_priority_open() {
                stats.high_priority_open += 1;
            }
            stats
        })
    }

    /// Share of tasks completed, in whole percent; 0 for an empty list
    pub fn completion_percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.completed * 100 / self.total
    }
}
