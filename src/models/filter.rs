use serde::{Deserialize, Serialize};

use crate::models::task::{Priority, Task};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl PriorityFilter {
    fn accepts(&self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Low => priority == Priority::Low,
            PriorityFilter::Medium => priority == Priority::Medium,
            PriorityFilter::High => priority == Priority::High,
        }
    }
}

impl From<Priority> for PriorityFilter {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => PriorityFilter::Low,
            Priority::Medium => PriorityFilter::Medium,
            Priority::High => PriorityFilter::High,
        }
    }
}

/// The single, current set of predicates narrowing the visible task list.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Case-insensitive substring matched against title or description. Empty disables it.
    pub search_query: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub project_id: Option<String>,
    /// Every listed tag must be present on a task. Empty disables it.
    pub tag_ids: Vec<String>,
}

/// Partial update of a [`FilterState`]. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub search_query: Option<String>,
    pub status: Option<StatusFilter>,
    pub priority: Option<PriorityFilter>,
    /// `Some(None)` clears the project filter.
    pub project_id: Option<Option<String>>,
    pub tag_ids: Option<Vec<String>>,
}

impl FilterState {
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(search_query) = update.search_query {
            self.search_query = search_query;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(project_id) = update.project_id {
            self.project_id = project_id;
        }
        if let Some(tag_ids) = update.tag_ids {
            self.tag_ids = tag_ids;
        }
    }

    /// Narrows `tasks` through search, status, priority, project and tags, in that order.
    /// The returned references keep the relative order of `tasks`.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let mut matching: Vec<&Task> = tasks.iter().collect();

        if !self.search_query.is_empty() {
            let query = self.search_query.to_lowercase();
            matching.retain(|t| {
                t.title.to_lowercase().contains(&query)
                    || t.description.to_lowercase().contains(&query)
            });
        }

        match self.status {
            StatusFilter::All => {}
            StatusFilter::Active => matching.retain(|t| !t.completed),
            StatusFilter::Completed => matching.retain(|t| t.completed),
        }

        if self.priority != PriorityFilter::All {
            matching.retain(|t| self.priority.accepts(t.priority));
        }

        if let Some(project_id) = &self.project_id {
            matching.retain(|t| &t.project_id == project_id);
        }

        if !self.tag_ids.is_empty() {
            matching.retain(|t| self.tag_ids.iter().all(|tag| t.has_tag(tag)));
        }

        matching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let mut filters = FilterState {
            search_query: "docs".to_string(),
            status: StatusFilter::Active,
            ..FilterState::default()
        };

        filters.merge(FilterUpdate {
            priority: Some(PriorityFilter::High),
            ..FilterUpdate::default()
        });

        assert_eq!(filters.search_query, "docs");
        assert_eq!(filters.status, StatusFilter::Active);
        assert_eq!(filters.priority, PriorityFilter::High);
    }

    #[test]
    fn test_merge_can_clear_project_filter() {
        let mut filters = FilterState {
            project_id: Some("2".to_string()),
            ..FilterState::default()
        };

        filters.merge(FilterUpdate {
            project_id: Some(None),
            ..FilterUpdate::default()
        });

        assert_eq!(filters.project_id, None);
    }
}
