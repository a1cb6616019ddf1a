use std::time::Duration;

use thiserror::Error;

use crate::{
    config::Config,
    models::{
        project::ProjectWithStats,
        tag::TagWithStats,
        ui::Theme,
    },
    storage::{KeyValueStorage, StorageError},
    system::{SystemTheme, ThemeSink},
};

pub mod projects;
pub mod tags;
pub mod tasks;
pub mod ui;

use projects::ProjectStore;
use tags::TagStore;
use tasks::TaskStore;
use ui::UiStore;

/// Read-only counts over the task collection, for stores that aggregate over tasks.
pub trait TaskQuery {
    fn count_by_project(&self, project_id: &str) -> usize;
    fn count_by_tag(&self, tag_id: &str) -> usize;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreateEntityError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

/// Owns every store and the storage they persist into.
pub struct RootStore<S> {
    pub tasks: TaskStore,
    pub projects: ProjectStore,
    pub tags: TagStore,
    pub ui: UiStore,
    storage: S,
    load_delay: Duration,
}

impl<S: KeyValueStorage> RootStore<S> {
    pub fn new(storage: S, config: &Config, sink: Box<dyn ThemeSink>) -> Self {
        let (tasks, projects, tags) = if config.seed {
            (TaskStore::seeded(), ProjectStore::seeded(), TagStore::seeded())
        } else {
            (TaskStore::new(), ProjectStore::new(), TagStore::new())
        };

        Self {
            tasks,
            projects,
            tags,
            ui: UiStore::new(sink),
            storage,
            load_delay: config.load_delay,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn projects_with_stats(&self) -> Vec<ProjectWithStats> {
        self.projects.projects_with_stats(&self.tasks)
    }

    pub fn tags_with_stats(&self) -> Vec<TagWithStats> {
        self.tags.tags_with_stats(&self.tasks)
    }

    pub fn popular_tags(&self) -> Vec<TagWithStats> {
        self.tags.popular_tags(&self.tasks)
    }

    pub fn init_theme(&mut self, system: &impl SystemTheme) -> Result<Theme, StorageError> {
        self.ui.init_theme(&self.storage, system)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, StorageError> {
        self.ui.toggle_theme(&self.storage)
    }

    /// Saves tasks, projects and tags. Every save is attempted; the first failure
    /// is returned after all have run. In-memory state is left as is.
    pub fn save_all(&self) -> Result<(), StorageError> {
        let results = [
            ("tasks", self.tasks.save_to_storage(&self.storage)),
            ("projects", self.projects.save_to_storage(&self.storage)),
            ("tags", self.tags.save_to_storage(&self.storage)),
        ];
        first_failure(results)
    }

    /// Loads projects and tags, then runs the delayed task load.
    pub async fn load_all(&mut self) -> Result<(), StorageError> {
        let projects = self.projects.load_from_storage(&self.storage).map(|_| ());
        let tags = self.tags.load_from_storage(&self.storage).map(|_| ());
        let tasks = self
            .tasks
            .fetch_tasks(&self.storage, self.load_delay)
            .await
            .map(|_| ());

        first_failure([("projects", projects), ("tags", tags), ("tasks", tasks)])
    }
}

fn first_failure<const N: usize>(
    results: [(&str, Result<(), StorageError>); N],
) -> Result<(), StorageError> {
    let mut first = None;
    for (name, result) in results {
        if let Err(e) = result {
            tracing::warn!(store = name, error = %e, "storage operation failed");
            first.get_or_insert(e);
        }
    }
    match first {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::task::Priority;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::{PROJECTS_KEY, TAGS_KEY, TASKS_KEY};
    use crate::system::TracingThemeSink;

    /// Accepts reads but refuses to store anything under `key`.
    struct RejectingStorage {
        inner: MemoryStorage,
        key: &'static str,
    }

    impl KeyValueStorage for RejectingStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.key {
                return Err(StorageError::WriteFailed {
                    path: key.into(),
                    source: std::io::Error::other("quota exceeded"),
                });
            }
            self.inner.set(key, value)
        }
    }

    fn config(seed: bool) -> Config {
        Config {
            storage_path: "unused.json".into(),
            load_delay: Duration::from_millis(500),
            seed,
        }
    }

    #[test]
    fn test_save_all_writes_every_collection() {
        let root = RootStore::new(MemoryStorage::new(), &config(true), Box::new(TracingThemeSink));

        root.save_all().unwrap();

        for key in [TASKS_KEY, PROJECTS_KEY, TAGS_KEY] {
            assert!(root.storage().get(key).unwrap().is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_save_all_keeps_going_after_a_failure() {
        let storage = RejectingStorage {
            inner: MemoryStorage::new(),
            key: PROJECTS_KEY,
        };
        let mut root = RootStore::new(storage, &config(true), Box::new(TracingThemeSink));
        root.tasks.toggle_task("4");

        let result = root.save_all();

        assert!(matches!(result, Err(StorageError::WriteFailed { .. })));
        assert!(root.storage().get(TASKS_KEY).unwrap().is_some());
        assert!(root.storage().get(TAGS_KEY).unwrap().is_some());
        assert!(root.tasks.get_task("4").unwrap().completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_all_restores_every_collection() {
        let storage = MemoryStorage::new();
        let mut saved = RootStore::new(&storage, &config(true), Box::new(TracingThemeSink));
        saved.tasks.delete_task("1");
        saved.projects.delete_project("3");
        saved.tags.delete_tag("2");
        saved.save_all().unwrap();

        let mut root = RootStore::new(&storage, &config(false), Box::new(TracingThemeSink));
        root.load_all().await.unwrap();

        assert_eq!(root.tasks.tasks(), saved.tasks.tasks());
        assert_eq!(root.projects.projects(), saved.projects.projects());
        assert_eq!(root.tags.tags(), saved.tags.tags());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_all_reports_corrupt_collection_and_loads_the_rest() {
        let storage = MemoryStorage::new();
        RootStore::new(&storage, &config(true), Box::new(TracingThemeSink))
            .save_all()
            .unwrap();
        storage.set(TAGS_KEY, "not json").unwrap();

        let mut root = RootStore::new(&storage, &config(false), Box::new(TracingThemeSink));
        let result = root.load_all().await;

        assert!(matches!(result, Err(StorageError::ParseFailed { .. })));
        assert!(root.tags.tags().is_empty());
        assert_eq!(root.projects.projects().len(), 3);
        assert_eq!(root.tasks.tasks().len(), 5);
    }

    #[test]
    fn test_cross_store_counts_track_task_mutations() {
        let mut root = RootStore::new(MemoryStorage::new(), &config(true), Box::new(TracingThemeSink));

        root.tasks
            .create_task(tasks::CreateTaskParameters {
                title: Some("Read a book".to_string()),
                priority: Some(Priority::Low),
                project_id: Some("3".to_string()),
                tag_ids: vec!["2".to_string()],
                ..Default::default()
            })
            .unwrap();

        let learning = root
            .projects_with_stats()
            .into_iter()
            .find(|p| p.project.id == "3")
            .unwrap();
        assert_eq!(learning.task_count, 2);

        let important = root
            .tags_with_stats()
            .into_iter()
            .find(|t| t.tag.id == "2")
            .unwrap();
        assert_eq!(important.task_count, 1);
    }
}
