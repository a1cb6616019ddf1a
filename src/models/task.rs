use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Client-generated identifier of the task
    pub id: String,
    /// Title of the task
    pub title: String,
    /// Free-form notes of the task
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub priority: Priority,
    /// Calendar day the task is due, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    /// Project this task belongs to. It does not have to resolve to an existing project.
    pub project_id: String,
    /// Tags of the task. Order and duplicates carry no meaning.
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// When the task was created
    pub created_at: Timestamp,
    /// When the task was last touched. Never earlier than `created_at`.
    pub updated_at: Timestamp,
}

impl Task {
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|t| t == tag_id)
    }

    /// A task is overdue when it is still open and the start of its due day
    /// (UTC) lies strictly before `now`.
    pub fn is_overdue_at(&self, now: Timestamp) -> bool {
        if self.completed {
            return false;
        }
        match self.due_date {
            Some(due) => due
                .to_zoned(TimeZone::UTC)
                .map(|start| start.timestamp() < now)
                .unwrap_or(false),
            None => false,
        }
    }

    /// Moves `updated_at` to `now`, never behind `created_at`.
    pub(crate) fn touch(&mut self, now: Timestamp) {
        self.updated_at = now.max(self.created_at);
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

/// The whole task collection split by priority. Each task lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasksByPriority {
    pub high: Vec<Task>,
    pub medium: Vec<Task>,
    pub low: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_due(due: Option<&str>, completed: bool) -> Task {
        let created: Timestamp = "2024-01-01T00:00:00Z".parse().unwrap();
        Task {
            id: "t".to_string(),
            title: "Some task".to_string(),
            description: String::new(),
            completed,
            priority: Priority::Medium,
            due_date: due.map(|d| d.parse().unwrap()),
            project_id: "1".to_string(),
            tag_ids: vec![],
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_overdue_starts_at_midnight_utc_of_due_day() {
        let task = task_due(Some("2024-01-15"), false);
        let before: Timestamp = "2024-01-14T23:59:59Z".parse().unwrap();
        let during: Timestamp = "2024-01-15T00:00:01Z".parse().unwrap();
        assert!(!task.is_overdue_at(before));
        assert!(task.is_overdue_at(during));
    }

    #[test]
    fn test_completed_or_undated_tasks_are_never_overdue() {
        let now: Timestamp = "2030-01-01T00:00:00Z".parse().unwrap();
        assert!(!task_due(Some("2024-01-15"), true).is_overdue_at(now));
        assert!(!task_due(None, false).is_overdue_at(now));
    }

    #[test]
    fn test_touch_never_moves_before_creation() {
        let mut task = task_due(None, false);
        let earlier: Timestamp = "2023-06-01T00:00:00Z".parse().unwrap();
        task.touch(earlier);
        assert_eq!(task.updated_at, task.created_at);
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let task = task_due(Some("2024-01-15"), false);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2024-01-15");
        assert_eq!(json["projectId"], "1");
        assert_eq!(json["priority"], "medium");
        assert!(json.get("tagIds").is_some());
    }
}
