use serde::Deserialize;
use uuid::Uuid;

use crate::{
    models::tag::{Tag, TagWithStats},
    storage::{KeyValueStorage, StorageError, TAGS_KEY, read_json, write_json},
    stores::{CreateEntityError, TaskQuery},
};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CreateTagParameters {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTagParameters {
    pub id: String,
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Default)]
pub struct TagStore {
    tags: Vec<Tag>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let tag = |id: &str, name: &str, color: &str| Tag {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        };

        Self {
            tags: vec![
                tag("1", "Urgent", "#f44336"),
                tag("2", "Important", "#ff9800"),
                tag("3", "Backend", "#2196f3"),
                tag("4", "Frontend", "#4caf50"),
                tag("5", "Meeting", "#9c27b0"),
                tag("6", "Documentation", "#607d8b"),
            ],
        }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get_tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn tags_with_stats(&self, tasks: &impl TaskQuery) -> Vec<TagWithStats> {
        self.tags
            .iter()
            .map(|tag| TagWithStats {
                tag: tag.clone(),
                task_count: tasks.count_by_tag(&tag.id),
            })
            .collect()
    }

    /// Tags in use, most used first. Ties keep collection order.
    pub fn popular_tags(&self, tasks: &impl TaskQuery) -> Vec<TagWithStats> {
        let mut popular: Vec<_> = self
            .tags_with_stats(tasks)
            .into_iter()
            .filter(|t| t.task_count > 0)
            .collect();
        popular.sort_by(|a, b| b.task_count.cmp(&a.task_count));
        popular
    }

    pub fn create_tag(&mut self, parameters: CreateTagParameters) -> Result<Tag, CreateEntityError> {
        if parameters.name.trim().is_empty() {
            return Err(CreateEntityError::MissingField("name"));
        }

        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name: parameters.name,
            color: parameters.color,
        };

        tracing::debug!(id = %tag.id, name = %tag.name, "created tag");
        self.tags.push(tag.clone());
        Ok(tag)
    }

    pub fn update_tag(&mut self, parameters: UpdateTagParameters) -> Option<Tag> {
        let Some(tag) = self.tags.iter_mut().find(|t| t.id == parameters.id) else {
            tracing::debug!(id = %parameters.id, "update ignored, tag not found");
            return None;
        };

        if let Some(name) = parameters.name {
            tag.name = name;
        }
        if let Some(color) = parameters.color {
            tag.color = color;
        }
        Some(tag.clone())
    }

    pub fn delete_tag(&mut self, id: &str) -> Option<Tag> {
        let index = self.tags.iter().position(|t| t.id == id)?;
        tracing::debug!(id, "deleted tag");
        Some(self.tags.remove(index))
    }

    pub fn load_from_storage(&mut self, storage: &impl KeyValueStorage) -> Result<bool, StorageError> {
        match read_json::<Vec<Tag>>(storage, TAGS_KEY)? {
            Some(tags) => {
                tracing::info!(count = tags.len(), "loaded tags from storage");
                self.tags = tags;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn save_to_storage(&self, storage: &impl KeyValueStorage) -> Result<(), StorageError> {
        write_json(storage, TAGS_KEY, &self.tags)
    }
}
