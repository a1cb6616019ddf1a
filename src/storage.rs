use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod json;
pub mod memory;

/// Key holding the serialized task collection
pub const TASKS_KEY: &str = "tm_tasks";
/// Key holding the serialized project collection
pub const PROJECTS_KEY: &str = "tm_projects";
/// Key holding the serialized tag collection
pub const TAGS_KEY: &str = "tm_tags";
/// Key holding the bare theme token (`light` or `dark`)
pub const THEME_KEY: &str = "tm_theme";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read storage file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write storage file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock storage file '{path}': {source}")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage file '{path}' is not a valid key-value document: {source}")]
    CorruptFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse value stored under '{key}': {source}")]
    ParseFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize value for '{key}': {source}")]
    SerializeFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Opaque string store addressed by fixed keys. Every `set` fully overwrites the key.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Reads and decodes the JSON value under `key`. A missing key yields `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(
    storage: &impl KeyValueStorage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::ParseFailed {
                key: key.to_string(),
                source: e,
            }),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    storage: &impl KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::SerializeFailed {
        key: key.to_string(),
        source: e,
    })?;
    storage.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_read_json_missing_key_is_none() {
        let storage = MemoryStorage::new();
        let value: Option<Vec<String>> = read_json(&storage, "absent").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_read_json_reports_malformed_value() {
        let storage = MemoryStorage::new();
        storage.set(TASKS_KEY, "[{ not json").unwrap();

        let result: Result<Option<Vec<String>>, _> = read_json(&storage, TASKS_KEY);
        match result {
            Err(StorageError::ParseFailed { key, .. }) => assert_eq!(key, TASKS_KEY),
            _ => panic!("Expected ParseFailed error"),
        }
    }
}
