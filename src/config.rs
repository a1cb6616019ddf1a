use std::path::PathBuf;
use std::time::Duration;

/// Delay before a task load reads storage
pub const DEFAULT_LOAD_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File backing the key-value storage
    pub storage_path: PathBuf,
    pub load_delay: Duration,
    /// Start from the sample board when nothing has been saved yet
    pub seed: bool,
}

impl Config {
    pub fn default_storage_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskboard")
            .join("store.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: Self::default_storage_path(),
            load_delay: DEFAULT_LOAD_DELAY,
            seed: true,
        }
    }
}
