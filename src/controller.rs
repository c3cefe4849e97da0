//! State controller: the in-memory mirror of the task store.
//!
//! Presentation code reads and mutates tasks only through a
//! [`TaskController`]. Each store call is bracketed by state transitions:
//! loading is raised before the call, and the result (or the error message)
//! is folded back in afterwards. Transitions are expressed as
//! [`TaskAction`] values applied by [`TaskState::reduce`], which consumes one
//! snapshot and returns the next.
//!
//! On failure the controller keeps its last good `tasks`, records the error
//! message, and hands the error back to the caller. It never retries.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::filter::{FilterPatch, FilterSpec};
use crate::stats::TaskStats;
use crate::storage::BlobStorage;
use crate::store::TaskStore;
use crate::task::{Task, TaskInput, TaskPatch};

/// Number of tasks shown in the dashboard's recent list
pub const RECENT_TASKS_LIMIT: usize = 5;

/// Number of tasks shown in the dashboard's high priority list
pub const HIGH_PRIORITY_LIMIT: usize = 3;

/// Immutable snapshot of controller state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
    pub filters: FilterSpec,
}

/// Every state transition the controller performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// A store call started; clears any previous error
    SetLoading,
    /// A store call failed; `tasks` is left as it was
    SetError(String),
    SetTasks(Vec<Task>),
    AddTask(Task),
    UpdateTask(Task),
    DeleteTask(String),
    SetFilters(FilterPatch),
    ClearFilters,
}

impl TaskState {
    pub fn reduce(mut self, action: TaskAction) -> TaskState {
        match action {
            TaskAction::SetLoading => {
                self.loading = true;
                self.error = None;
            }
            TaskAction::SetError(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            TaskAction::SetTasks(tasks) => {
                self.tasks = tasks;
                self.loading = false;
            }
            TaskAction::AddTask(task) => {
                self.tasks.insert(0, task);
                self.loading = false;
            }
            TaskAction::UpdateTask(updated) => {
                if let Some(slot) = self.tasks.iter_mut().find(|task| task.id == updated.id) {
                    *slot = updated;
                }
                self.loading = false;
            }
            TaskAction::DeleteTask(id) => {
                self.tasks.retain(|task| task.id != id);
                self.loading = false;
            }
            TaskAction::SetFilters(patch) => self.filters.merge(patch),
            TaskAction::ClearFilters => self.filters = FilterSpec::default(),
        }
        self
    }
}

pub struct TaskController<S> {
    store: TaskStore<S>,
    state: TaskState,
}

impl<S: BlobStorage> TaskController<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Self {
            store,
            state: TaskState::default(),
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.state.filters
    }

    fn dispatch(&mut self, action: TaskAction) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    fn fail(&mut self, err: Error) -> Error {
        warn!(error = %err, "task operation failed");
        self.dispatch(TaskAction::SetError(err.to_string()));
        err
    }

    /// Replace the mirror with the store's current collection.
    pub fn fetch_all(&mut self) -> Result<()> {
        self.dispatch(TaskAction::SetLoading);
        match self.store.get_all() {
            Ok(tasks) => {
                debug!(count = tasks.len(), "fetched tasks");
                self.dispatch(TaskAction::SetTasks(tasks));
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Read one task straight from the store, e.g. to prefill an edit form.
    /// Does not touch controller state.
    pub fn load_task(&self, id: &str) -> Result<Task> {
        self.store.get_by_id(id)
    }

    pub fn create_task(&mut self, input: TaskInput) -> Result<Task> {
        self.dispatch(TaskAction::SetLoading);
        match self.store.create(input) {
            Ok(task) => {
                self.dispatch(TaskAction::AddTask(task.clone()));
                Ok(task)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<Task> {
        self.dispatch(TaskAction::SetLoading);
        match self.store.update(id, patch) {
            Ok(task) => {
                self.dispatch(TaskAction::UpdateTask(task.clone()));
                Ok(task)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        self.dispatch(TaskAction::SetLoading);
        match self.store.delete(id) {
            Ok(()) => {
                self.dispatch(TaskAction::DeleteTask(id.to_string()));
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn set_filters(&mut self, patch: FilterPatch) {
        self.dispatch(TaskAction::SetFilters(patch));
    }

    pub fn clear_filters(&mut self) {
        self.dispatch(TaskAction::ClearFilters);
    }

    /// Tasks passing the current filters, in mirror order
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.state.filters.apply(&self.state.tasks)
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.state.tasks)
    }

    /// The newest `limit` tasks
    pub fn recent_tasks(&self, limit: usize) -> &[Task] {
        let end = limit.min(self.state.tasks.len());
        &self.state.tasks[..end]
    }

    /// Up to `limit` open high-priority tasks, newest first
    pub fn high_priority_open_tasks(&self, limit: usize) -> Vec<&Task> {
        self.state
            .tasks
            .iter()
            .filter(|task| task.is_high_priority_open())
            .take(limit)
            .collect()
    }
}
