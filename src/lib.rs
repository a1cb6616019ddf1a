//! In-memory state container for a task board: tasks with filtering and
//! statistics, projects and tags with usage counts derived from the tasks,
//! and presentation preferences, all persisted to a key-value store.

pub mod config;
pub mod models;
pub mod storage;
pub mod stores;
pub mod system;

pub use config::Config;
pub use stores::{RootStore, TaskQuery};
