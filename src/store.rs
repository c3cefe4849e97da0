//! Task store: durable CRUD over the task collection.
//!
//! The whole collection lives in one JSON blob (see [`crate::task`] for the
//! record shape) under a fixed storage key. Every mutation is a full
//! read-modify-write of that blob, serialized through an in-process mutex
//! and the backend's [`BlobStorage::lock`], so concurrent callers cannot
//! lose each other's writes.
//!
//! Records are kept newest first: `create` prepends.

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::config::{Config, LatencyConfig, StoreOp, DEFAULT_STORAGE_KEY};
use crate::error::{Error, Result};
use crate::storage::BlobStorage;
use crate::task::{Task, TaskInput, TaskPatch, TaskPriority, TaskStatus};

/// What `initialize` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store was empty and now holds this many sample tasks
    Seeded(usize),
    /// The store already had tasks; nothing written
    AlreadyPopulated,
    /// Seeding is turned off in configuration
    Disabled,
    /// The stored blob could not be parsed; left untouched
    Corrupt,
}

/// Decoded state of the collection blob
enum Blob {
    Missing,
    Tasks(Vec<Task>),
    Corrupt(String),
}

pub struct TaskStore<S> {
    storage: S,
    key: String,
    seed: bool,
    latency: LatencyConfig,
    write_lock: Mutex<()>,
}

impl<S: BlobStorage> TaskStore<S> {
    /// Store with the default key, seeding on, no simulated latency
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: DEFAULT_STORAGE_KEY.to_string(),
            seed: true,
            latency: LatencyConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_config(storage: S, config: &Config) -> Self {
        Self {
            storage,
            key: config.storage.key.clone(),
            seed: config.seed.enabled,
            latency: config.latency.clone(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Seed the sample tasks if, and only if, the collection is empty.
    pub fn initialize(&self) -> Result<SeedOutcome> {
        if !self.seed {
            return Ok(SeedOutcome::Disabled);
        }

        let _guard = self.lock_writes()?;
        let _blob_guard = self.storage.lock(&self.key)?;
        match self.load()? {
            Blob::Tasks(tasks) if !tasks.is_empty() => Ok(SeedOutcome::AlreadyPopulated),
            Blob::Corrupt(reason) => {
                warn!(key = %self.key, %reason, "not seeding over unreadable task data");
                Ok(SeedOutcome::Corrupt)
            }
            Blob::Missing | Blob::Tasks(_) => {
                let now = Utc::now();
                let tasks = seed_tasks(now.date_naive(), now);
                self.save(&tasks)?;
                info!(key = %self.key, count = tasks.len(), "seeded sample tasks");
                Ok(SeedOutcome::Seeded(tasks.len()))
            }
        }
    }

    /// Every task in stored order (newest first).
    ///
    /// Unparsable data reads as an empty collection.
    pub fn get_all(&self) -> Result<Vec<Task>> {
        self.simulate_latency(StoreOp::GetAll);
        match self.load()? {
            Blob::Missing => Ok(Vec::new()),
            Blob::Tasks(tasks) => Ok(tasks),
            Blob::Corrupt(reason) => {
                warn!(key = %self.key, %reason, "task data is unreadable, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    pub fn get_by_id(&self, id: &str) -> Result<Task> {
        self.simulate_latency(StoreOp::GetById);
        let tasks = match self.load()? {
            Blob::Tasks(tasks) => tasks,
            Blob::Missing | Blob::Corrupt(_) => Vec::new(),
        };
        tasks
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    pub fn create(&self, input: TaskInput) -> Result<Task> {
        self.simulate_latency(StoreOp::Create);
        self.mutate(|tasks| {
            let id = generate_id(tasks);
            let task = Task::from_input(id, input, Utc::now());
            tasks.insert(0, task.clone());
            debug!(id = %task.id, "created task");
            Ok(task)
        })
    }

    /// Shallow-merge `patch` onto the task with `id`.
    pub fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        self.simulate_latency(StoreOp::Update);
        self.mutate(|tasks| {
            let task = tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            task.apply(patch);
            debug!(%id, "updated task");
            Ok(task.clone())
        })
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.simulate_latency(StoreOp::Delete);
        self.mutate(|tasks| {
            let before = tasks.len();
            tasks.retain(|task| task.id != id);
            if tasks.len() == before {
                return Err(Error::TaskNotFound(id.to_string()));
            }
            debug!(%id, "deleted task");
            Ok(())
        })
    }

    /// Resolve a full id or a unique id prefix to the stored id.
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }
        let needle = trimmed.to_ascii_lowercase();

        let tasks = match self.load()? {
            Blob::Tasks(tasks) => tasks,
            Blob::Missing | Blob::Corrupt(_) => Vec::new(),
        };
        if let Some(task) = tasks.iter().find(|task| task.id == trimmed) {
            return Ok(task.id.clone());
        }

        let mut matches: Vec<String> = tasks
            .iter()
            .filter(|task| task.id.to_ascii_lowercase().starts_with(&needle))
            .map(|task| task.id.clone())
            .collect();
        matches.sort();
        matches.dedup();
        match matches.len() {
            0 => Err(Error::TaskNotFound(trimmed.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(Error::InvalidArgument(format!(
                "ambiguous task id '{}': {}",
                trimmed,
                matches.join(", ")
            ))),
        }
    }

    fn lock_writes(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::Storage("task store lock poisoned".to_string()))
    }

    /// One locked read-modify-write cycle. Nothing is written when `apply`
    /// fails or the stored data is unreadable.
    fn mutate<T>(&self, apply: impl FnOnce(&mut Vec<Task>) -> Result<T>) -> Result<T> {
        let _guard = self.lock_writes()?;
        let _blob_guard = self.storage.lock(&self.key)?;
        let mut tasks = match self.load()? {
            Blob::Missing => Vec::new(),
            Blob::Tasks(tasks) => tasks,
            Blob::Corrupt(reason) => {
                return Err(Error::Storage(format!(
                    "refusing to overwrite unreadable task data under '{}': {reason}",
                    self.key
                )));
            }
        };
        let result = apply(&mut tasks)?;
        self.save(&tasks)?;
        Ok(result)
    }

    fn load(&self) -> Result<Blob> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(Blob::Missing);
        };
        if raw.trim().is_empty() {
            return Ok(Blob::Missing);
        }
        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => Ok(Blob::Tasks(tasks)),
            Err(err) => Ok(Blob::Corrupt(err.to_string())),
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let serialized = serde_json::to_string(tasks)?;
        self.storage.set_item(&self.key, &serialized)
    }

    fn simulate_latency(&self, op: StoreOp) {
        let delay = self.latency.delay_for(op);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Lowercase ULID (timestamp + randomness) not already used in `tasks`.
fn generate_id(tasks: &[Task]) -> String {
    loop {
        let id = Ulid::new().to_string().to_lowercase();
        if !tasks.iter().any(|task| task.id == id) {
            return id;
        }
    }
}

/// The sample tasks written on first run; due dates are relative to `today`.
pub fn seed_tasks(today: NaiveDate, now: DateTime<Utc>) -> Vec<Task> {
    let samples = [
        (
            "Design System Architecture",
            "Create comprehensive design system documentation and component library",
            TaskStatus::InProgress,
            TaskPriority::High,
            3,
            "Sarah Chen",
        ),
        (
            "API Integration",
            "Integrate REST API endpoints with frontend components",
            TaskStatus::Todo,
            TaskPriority::High,
            5,
            "Mike Johnson",
        ),
        (
            "User Authentication",
            "Implement JWT-based authentication and authorization",
            TaskStatus::Completed,
            TaskPriority::Medium,
            -1,
            "Emma Wilson",
        ),
        (
            "Performance Optimization",
            "Optimize bundle size and implement code splitting",
            TaskStatus::Todo,
            TaskPriority::Medium,
            7,
            "David Lee",
        ),
        (
            "Unit Testing",
            "Write comprehensive unit tests for all components",
            TaskStatus::InProgress,
            TaskPriority::Low,
            10,
            "Lisa Park",
        ),
    ];

    let mut tasks: Vec<Task> = Vec::with_capacity(samples.len());
    for (title, description, status, priority, due_in_days, assignee) in samples {
        let input = TaskInput {
            title: title.to_string(),
            description: Some(description.to_string()),
            status,
            priority,
            due_date: Some(today + Duration::days(due_in_days)),
            assignee: Some(assignee.to_string()),
        };
        let id = generate_id(&tasks);
        tasks.push(Task::from_input(id, input, now));
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> TaskStore<MemoryStorage> {
        TaskStore::new(MemoryStorage::new())
    }

    #[test]
    fn create_prepends_and_assigns_identity() {
        let store = store();
        let first = store.create(TaskInput::new("First task")).unwrap();
        let second = store.create(TaskInput::new("Second task")).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.id.len(), 26);

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[test]
    fn blob_is_a_camel_case_json_array() {
        let store = store();
        let created = store
            .create(
                TaskInput::new("Ship release")
                    .status(TaskStatus::InProgress)
                    .due_date(NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()),
            )
            .unwrap();

        let raw = store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let record = &value.as_array().unwrap()[0];
        assert_eq!(record["id"], created.id.as_str());
        assert_eq!(record["status"], "in-progress");
        assert_eq!(record["dueDate"], "2026-11-02");
        assert!(record["createdAt"].is_string());
    }

    #[test]
    fn update_missing_id_is_not_found_and_writes_nothing() {
        let store = store();
        store.create(TaskInput::new("Keep me")).unwrap();
        let before = store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap();

        let err = store
            .update("missing", &TaskPatch::default())
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap(), before);
    }

    #[test]
    fn corrupt_blob_reads_empty_but_blocks_writes() {
        let store = store();
        store
            .storage()
            .set_item(DEFAULT_STORAGE_KEY, "{not json")
            .unwrap();

        assert!(store.get_all().unwrap().is_empty());
        assert!(matches!(
            store.create(TaskInput::new("New task")),
            Err(Error::Storage(_))
        ));
        assert_eq!(store.initialize().unwrap(), SeedOutcome::Corrupt);
        assert_eq!(
            store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn empty_blob_counts_as_missing() {
        let store = store();
        store.storage().set_item(DEFAULT_STORAGE_KEY, "").unwrap();
        assert!(store.get_all().unwrap().is_empty());
        assert_eq!(store.initialize().unwrap(), SeedOutcome::Seeded(5));
    }

    #[test]
    fn seeding_can_be_disabled() {
        let mut config = Config::default();
        config.seed.enabled = false;
        let store = TaskStore::with_config(MemoryStorage::new(), &config);
        assert_eq!(store.initialize().unwrap(), SeedOutcome::Disabled);
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn form_records_with_blank_fields_stay_usable() {
        let store = store();
        let raw = r#"[{"id":"1700000000000","title":"Imported task","description":"","status":"todo","priority":"medium","dueDate":"","assignee":"","createdAt":"2026-10-01T08:00:00.000Z"}]"#;
        store.storage().set_item(DEFAULT_STORAGE_KEY, raw).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description, None);
        assert_eq!(all[0].due_date, None);
        assert_eq!(all[0].assignee, None);

        let created = store.create(TaskInput::new("Fresh task")).unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, created.id);
        assert_eq!(all[1].id, "1700000000000");
        assert_eq!(store.initialize().unwrap(), SeedOutcome::AlreadyPopulated);
    }

    #[test]
    fn initialize_after_user_task_changes_nothing() {
        let store = store();
        assert_eq!(store.initialize().unwrap(), SeedOutcome::Seeded(5));
        store.create(TaskInput::new("Mine, not a sample")).unwrap();
        let before = store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap();

        assert_eq!(store.initialize().unwrap(), SeedOutcome::AlreadyPopulated);
        assert_eq!(store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap(), before);
        assert_eq!(store.get_all().unwrap().len(), 6);
    }

    #[test]
    fn seed_tasks_are_deterministic_apart_from_ids() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let now = Utc::now();
        let a = seed_tasks(today, now);
        let b = seed_tasks(today, now);

        let strip = |tasks: &[Task]| {
            tasks
                .iter()
                .map(|t| (t.title.clone(), t.status, t.priority, t.due_date, t.assignee.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&a), strip(&b));
        assert_eq!(a[0].title, "Design System Architecture");
        assert_eq!(a[0].due_date, NaiveDate::from_ymd_opt(2026, 10, 22));
        assert_eq!(a[2].due_date, NaiveDate::from_ymd_opt(2026, 10, 18));
    }

    #[test]
    fn resolve_id_accepts_unique_prefix() {
        let store = store();
        let task = store.create(TaskInput::new("Prefix me")).unwrap();

        assert_eq!(store.resolve_id(&task.id).unwrap(), task.id);
        assert_eq!(store.resolve_id(&task.id[..20]).unwrap(), task.id);
        assert_eq!(
            store.resolve_id(&task.id[..20].to_uppercase()).unwrap(),
            task.id
        );
        assert!(store.resolve_id("zzzzzzzz").unwrap_err().is_not_found());
        assert!(matches!(store.resolve_id("  "), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn latency_is_applied_when_enabled() {
        let mut config = Config::default();
        config.latency.enabled = true;
        config.latency.get_all_ms = 30;
        let store = TaskStore::with_config(MemoryStorage::new(), &config);

        let start = std::time::Instant::now();
        store.get_all().unwrap();
        assert!(start.elapsed() >= std::time::Duration::from_millis(30));
    }
}
