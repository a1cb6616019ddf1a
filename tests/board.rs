use std::time::Duration;

use jiff::Timestamp;
use taskboard::{
    Config, RootStore,
    models::{FilterUpdate, PriorityFilter, StatusFilter},
    storage::{KeyValueStorage, TASKS_KEY, THEME_KEY, json::JsonFileStorage, memory::MemoryStorage},
    system::TracingThemeSink,
};
use tempfile::TempDir;

fn seeded_config() -> Config {
    Config {
        storage_path: "unused.json".into(),
        load_delay: Duration::from_millis(500),
        seed: true,
    }
}

#[test]
fn test_seed_board_filters_stats_and_clear_completed() {
    let mut root = RootStore::new(MemoryStorage::new(), &seeded_config(), Box::new(TracingThemeSink));
    let now: Timestamp = "2024-01-14T12:00:00Z".parse().unwrap();

    let stats = root.tasks.stats_at(now);
    assert_eq!(stats.total, 5);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.pending, stats.total - stats.completed);

    root.tasks.set_filters(FilterUpdate {
        status: Some(StatusFilter::Active),
        priority: Some(PriorityFilter::High),
        ..FilterUpdate::default()
    });
    let visible: Vec<&str> = root
        .tasks
        .filtered_tasks()
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(visible, vec!["1", "5"]);

    let completed_before = root.tasks.stats_at(now).completed;
    assert_eq!(root.tasks.clear_completed(), 1);
    let stats = root.tasks.stats_at(now);
    assert_eq!(stats.completed, 0);
    assert_eq!(stats.total, 5 - completed_before);
    assert_eq!(stats.total, 4);
}

#[test]
fn test_deleted_project_leaves_tasks_and_reports_zero_for_unused() {
    let mut root = RootStore::new(MemoryStorage::new(), &seeded_config(), Box::new(TracingThemeSink));

    root.projects.delete_project("2");

    assert_eq!(root.tasks.tasks().len(), 5);
    assert!(root.projects_with_stats().iter().all(|p| p.project.id != "2"));

    root.tasks.delete_task("1");
    let learning = root
        .projects_with_stats()
        .into_iter()
        .find(|p| p.project.id == "3")
        .unwrap();
    assert_eq!(learning.task_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_board_round_trips_through_file_storage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let mut first = RootStore::new(
        JsonFileStorage::new(path.clone()),
        &seeded_config(),
        Box::new(TracingThemeSink),
    );
    first.tasks.toggle_task("3");
    first.toggle_theme().unwrap();
    first.save_all().unwrap();

    let config = Config {
        seed: false,
        ..seeded_config()
    };
    let mut second = RootStore::new(JsonFileStorage::new(path), &config, Box::new(TracingThemeSink));
    second.load_all().await.unwrap();

    assert_eq!(second.tasks.tasks(), first.tasks.tasks());
    assert!(second.tasks.get_task("3").unwrap().completed);
    assert_eq!(second.projects.projects().len(), 3);
    assert_eq!(second.tags.tags().len(), 6);
    assert_eq!(second.storage().get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    assert!(second.storage().get(TASKS_KEY).unwrap().is_some());
}
