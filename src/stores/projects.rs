use serde::Deserialize;
use uuid::Uuid;

use crate::{
    models::project::{Project, ProjectWithStats},
    storage::{KeyValueStorage, PROJECTS_KEY, StorageError, read_json, write_json},
    stores::{CreateEntityError, TaskQuery},
};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProjectParameters {
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProjectParameters {
    pub id: String,
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Default)]
pub struct ProjectStore {
    projects: Vec<Project>,
    current_project_id: Option<String>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let project = |id: &str, name: &str, color: &str, description: &str| Project {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            description: Some(description.to_string()),
        };

        Self {
            projects: vec![
                project("1", "Personal", "#4CAF50", "Personal tasks and assignments"),
                project("2", "Work", "#2196F3", "Work-related tasks"),
                project("3", "Learning", "#FF9800", "Self-education and development"),
            ],
            current_project_id: None,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get_project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current_project_id
            .as_deref()
            .and_then(|id| self.get_project(id))
    }

    pub fn set_current_project(&mut self, project_id: Option<String>) {
        self.current_project_id = project_id;
    }

    /// Every project with the number of tasks pointing at it, counted fresh from `tasks`.
    pub fn projects_with_stats(&self, tasks: &impl TaskQuery) -> Vec<ProjectWithStats> {
        self.projects
            .iter()
            .map(|project| ProjectWithStats {
                project: project.clone(),
                task_count: tasks.count_by_project(&project.id),
            })
            .collect()
    }

    pub fn create_project(
        &mut self,
        parameters: CreateProjectParameters,
    ) -> Result<Project, CreateEntityError> {
        if parameters.name.trim().is_empty() {
            return Err(CreateEntityError::MissingField("name"));
        }

        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: parameters.name,
            color: parameters.color,
            description: parameters.description,
        };

        tracing::debug!(id = %project.id, name = %project.name, "created project");
        self.projects.push(project.clone());
        Ok(project)
    }

    pub fn update_project(&mut self, parameters: UpdateProjectParameters) -> Option<Project> {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == parameters.id) else {
            tracing::debug!(id = %parameters.id, "update ignored, project not found");
            return None;
        };

        if let Some(name) = parameters.name {
            project.name = name;
        }
        if let Some(color) = parameters.color {
            project.color = color;
        }
        if let Some(description) = parameters.description {
            project.description = description;
        }
        Some(project.clone())
    }

    /// Removes the project. Tasks referencing it keep their dangling reference.
    pub fn delete_project(&mut self, id: &str) -> Option<Project> {
        let index = self.projects.iter().position(|p| p.id == id)?;
        if self.current_project_id.as_deref() == Some(id) {
            self.current_project_id = None;
        }
        tracing::debug!(id, "deleted project");
        Some(self.projects.remove(index))
    }

    pub fn load_from_storage(&mut self, storage: &impl KeyValueStorage) -> Result<bool, StorageError> {
        match read_json::<Vec<Project>>(storage, PROJECTS_KEY)? {
            Some(projects) => {
                tracing::info!(count = projects.len(), "loaded projects from storage");
                self.projects = projects;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn save_to_storage(&self, storage: &impl KeyValueStorage) -> Result<(), StorageError> {
        write_json(storage, PROJECTS_KEY, &self.projects)
    }
}
