use std::time::Duration;

use jiff::Timestamp;
use jiff::civil::{Date, date};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        filter::{FilterState, FilterUpdate},
        task::{Priority, Task, TaskStats, TasksByPriority},
    },
    storage::{KeyValueStorage, StorageError, TASKS_KEY, read_json, write_json},
    stores::TaskQuery,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreateTaskError {
    #[error("Task is missing required field '{0}'")]
    MissingField(&'static str),
}

/// Everything a new task carries except its identifier and timestamps.
///
/// Deserializes leniently so that absent fields surface as [`CreateTaskError`]
/// instead of a decode failure.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTaskParameters {
    pub title: Option<String>,
    pub description: String,
    pub completed: bool,
    pub priority: Option<Priority>,
    pub due_date: Option<Date>,
    pub project_id: Option<String>,
    pub tag_ids: Vec<String>,
}

/// Partial update of an existing task. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskParameters {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    /// `Some(None)` removes the due date.
    pub due_date: Option<Option<Date>>,
    pub project_id: Option<String>,
    pub tag_ids: Option<Vec<String>>,
}

impl UpdateTaskParameters {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(tag_ids) = self.tag_ids {
            task.tag_ids = tag_ids;
        }
    }
}

/// Owns the task collection (newest first) and the active filter configuration.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    filters: FilterState,
    loading: bool,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the sample tasks a fresh board starts with.
    pub fn seeded() -> Self {
        Self {
            tasks: seed_tasks(),
            ..Self::default()
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.filters.apply(&self.tasks)
    }

    pub fn stats(&self) -> TaskStats {
        self.stats_at(Timestamp::now())
    }

    /// Recounts the whole collection, judging due dates against `now`.
    pub fn stats_at(&self, now: Timestamp) -> TaskStats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        let overdue = self.tasks.iter().filter(|t| t.is_overdue_at(now)).count();

        TaskStats {
            total,
            completed,
            pending: total - completed,
            overdue,
        }
    }

    pub fn tasks_by_priority(&self) -> TasksByPriority {
        let mut buckets = TasksByPriority::default();
        for task in &self.tasks {
            let bucket = match task.priority {
                Priority::High => &mut buckets.high,
                Priority::Medium => &mut buckets.medium,
                Priority::Low => &mut buckets.low,
            };
            bucket.push(task.clone());
        }
        buckets
    }

    pub fn create_task(&mut self, parameters: CreateTaskParameters) -> Result<Task, CreateTaskError> {
        let title = parameters
            .title
            .ok_or(CreateTaskError::MissingField("title"))?;
        let priority = parameters
            .priority
            .ok_or(CreateTaskError::MissingField("priority"))?;
        let project_id = parameters
            .project_id
            .ok_or(CreateTaskError::MissingField("projectId"))?;

        let now = Timestamp::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title,
            description: parameters.description,
            completed: parameters.completed,
            priority,
            due_date: parameters.due_date,
            project_id,
            tag_ids: parameters.tag_ids,
            created_at: now,
            updated_at: now,
        };

        tracing::debug!(id = %task.id, title = %task.title, "created task");
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Merges `parameters` into the task with the same id. Unknown ids are ignored.
    pub fn update_task(&mut self, parameters: UpdateTaskParameters) -> Option<Task> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == parameters.id) else {
            tracing::debug!(id = %parameters.id, "update ignored, task not found");
            return None;
        };

        parameters.apply_to(task);
        task.touch(Timestamp::now());
        Some(task.clone())
    }

    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        tracing::debug!(id, "deleted task");
        Some(self.tasks.remove(index))
    }

    pub fn toggle_task(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        task.touch(Timestamp::now());
        tracing::debug!(id, completed = task.completed, "toggled task");
        Some(task.clone())
    }

    pub fn set_filters(&mut self, update: FilterUpdate) {
        self.filters.merge(update);
    }

    /// Drops every completed task, returning how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        tracing::debug!(removed, "cleared completed tasks");
        removed
    }

    /// Loads the persisted collection after `delay`, replacing the in-memory one.
    ///
    /// Returns `Ok(false)` when nothing was persisted. Malformed data fails the load
    /// and leaves the current collection untouched.
    pub async fn fetch_tasks(
        &mut self,
        storage: &impl KeyValueStorage,
        delay: Duration,
    ) -> Result<bool, StorageError> {
        let pending = self.begin_load(delay);
        let loaded = pending.resolve(storage).await;
        self.finish_load(loaded)
    }

    /// Marks the store as loading. The returned handle reads storage once its delay elapses.
    pub fn begin_load(&mut self, delay: Duration) -> PendingLoad {
        self.loading = true;
        PendingLoad { delay }
    }

    /// Applies the outcome of a [`PendingLoad`] and clears the loading flag.
    ///
    /// A successful load replaces the collection wholesale: edits made between
    /// `begin_load` and this call are lost.
    pub fn finish_load(
        &mut self,
        loaded: Result<Option<Vec<Task>>, StorageError>,
    ) -> Result<bool, StorageError> {
        self.loading = false;
        match loaded {
            Ok(Some(tasks)) => {
                tracing::info!(count = tasks.len(), "loaded tasks from storage");
                self.tasks = tasks;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                tracing::error!(error = %e, "failed to load tasks");
                Err(e)
            }
        }
    }

    pub fn save_to_storage(&self, storage: &impl KeyValueStorage) -> Result<(), StorageError> {
        write_json(storage, TASKS_KEY, &self.tasks)
    }
}

impl TaskQuery for TaskStore {
    fn count_by_project(&self, project_id: &str) -> usize {
        self.tasks.iter().filter(|t| t.project_id == project_id).count()
    }

    fn count_by_tag(&self, tag_id: &str) -> usize {
        self.tasks.iter().filter(|t| t.has_tag(tag_id)).count()
    }
}

/// A task load in flight. Nothing is read until [`PendingLoad::resolve`] is awaited.
#[derive(Debug)]
#[must_use]
pub struct PendingLoad {
    delay: Duration,
}

impl PendingLoad {
    pub async fn resolve(
        self,
        storage: &impl KeyValueStorage,
    ) -> Result<Option<Vec<Task>>, StorageError> {
        tokio::time::sleep(self.delay).await;
        read_json(storage, TASKS_KEY)
    }
}

fn midnight_utc(second: i64) -> Timestamp {
    Timestamp::constant(second, 0)
}

#[allow(clippy::too_many_arguments)]
fn seed_task(
    id: &str,
    title: &str,
    description: &str,
    completed: bool,
    priority: Priority,
    due_date: Option<Date>,
    project_id: &str,
    tag_ids: &[&str],
    created_at: Timestamp,
    updated_at: Timestamp,
) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        completed,
        priority,
        due_date,
        project_id: project_id.to_string(),
        tag_ids: tag_ids.iter().map(|t| t.to_string()).collect(),
        created_at,
        updated_at,
    }
}

fn seed_tasks() -> Vec<Task> {
    let jan_08 = midnight_utc(1_704_672_000);
    let jan_09 = midnight_utc(1_704_758_400);
    let jan_10 = midnight_utc(1_704_844_800);
    let jan_11 = midnight_utc(1_704_931_200);
    let jan_13 = midnight_utc(1_705_104_000);

    vec![
        seed_task(
            "1",
            "Complete Rust tutorial",
            "Finish learning the store architecture and apply it in the project",
            false,
            Priority::High,
            Some(date(2024, 1, 15)),
            "3",
            &["1", "4"],
            jan_10,
            jan_10,
        ),
        seed_task(
            "2",
            "Prepare project presentation",
            "Create slides and demo for the team meeting",
            true,
            Priority::Medium,
            Some(date(2024, 1, 12)),
            "2",
            &["5"],
            jan_08,
            jan_11,
        ),
        seed_task(
            "3",
            "Fix responsive layout issues",
            "Mobile view breaks on small screens, need to fix CSS",
            false,
            Priority::Medium,
            Some(date(2024, 1, 20)),
            "2",
            &["4", "6"],
            jan_09,
            jan_09,
        ),
        seed_task(
            "4",
            "Buy groceries",
            "Milk, eggs, bread, fruits and vegetables",
            false,
            Priority::Low,
            None,
            "1",
            &[],
            jan_13,
            jan_13,
        ),
        seed_task(
            "5",
            "Write documentation",
            "Document the new API endpoints and update README",
            false,
            Priority::High,
            Some(date(2024, 1, 14)),
            "2",
            &["6"],
            jan_11,
            jan_11,
        ),
    ]
}
