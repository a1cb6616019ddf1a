use std::{
    collections::BTreeMap,
    fs::{self, File, OpenOptions, rename, write},
    path::PathBuf,
};

use fs2::FileExt;
use serde_json::to_string_pretty;
use uuid::Uuid;

use crate::storage::{KeyValueStorage, StorageError};

type Entries = BTreeMap<String, String>;

/// Key-value storage persisted as a single JSON object file.
///
/// Writes take an exclusive lock on a sibling `.lock` file, re-read the document,
/// replace one key and swap the file in through a uniquely named temp file.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Entries::new()),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| StorageError::CorruptFile {
                    path: self.path.clone(),
                    source: e,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StorageError::ReadFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        let json = to_string_pretty(entries).map_err(|e| StorageError::SerializeFailed {
            key: self.path.display().to_string(),
            source: e,
        })?;

        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        write(&temp_path, json).map_err(|e| StorageError::WriteFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::WriteFailed {
                path: self.path.clone(),
                source: e,
            }
        })
    }

    fn lock(&self) -> Result<File, StorageError> {
        let lock_file_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::LockFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::LockFailed {
                path: lock_file_path,
                source: e,
            })?;
        Ok(lock_file)
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self.read_entries()?;
        Ok(entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let lock_file = self.lock()?;

        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;

        tracing::debug!(key, path = %self.path.display(), "stored value");

        lock_file.unlock().map_err(|e| StorageError::LockFailed {
            path: self.path.clone(),
            source: e,
        })
    }
}
