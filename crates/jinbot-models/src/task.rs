//! Task records owned by the record store.
//!
//! Tasks are created either by the operator (`/task`) or automatically
//! from action items extracted out of saved messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a task. The only transition is Pending -> Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is open and waiting to be done.
    #[default]
    Pending,
    /// Task has been completed.
    Completed,
}

/// Priority levels for tasks.
///
/// Higher numeric value = higher priority.
/// High (3) > Medium (2) > Low (1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Low priority (1).
    Low,
    /// Medium priority (2).
    #[default]
    Medium,
    /// High priority (3).
    High,
}

impl TaskPriority {
    /// Returns the numeric value of this priority.
    /// Higher value = higher priority.
    pub fn as_value(&self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
        }
    }

    /// Parses a priority keyword (`high`, `medium`, `low`), case-insensitive.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

impl PartialOrd for TaskPriority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskPriority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_value().cmp(&other.as_value())
    }
}

/// A task tracked by the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Sequential identifier assigned from the store's persisted counter.
    pub id: u64,

    /// Description of the task. Never empty.
    pub description: String,

    /// Priority level of the task.
    pub priority: TaskPriority,

    /// Current status of the task.
    pub status: TaskStatus,

    /// Tags attached to the task. Deduplicated, original case kept.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Chat the task was extracted from, for auto-extracted tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// When the task was created.
    pub created_at: DateTime<Utc>,

    /// When the task was completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new pending task with the given id and description.
    pub fn new(id: u64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            tags: Vec::new(),
            source: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Creates a new pending task with the specified priority.
    pub fn with_priority(id: u64, description: impl Into<String>, priority: TaskPriority) -> Self {
        let mut task = Self::new(id, description);
        task.priority = priority;
        task
    }

    /// Adds a tag unless an equal tag (ignoring case) is already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self
            .tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&tag))
        {
            self.tags.push(tag);
        }
    }

    /// Marks the task as completed.
    ///
    /// Completing an already-completed task is a no-op: the status and
    /// `completed_at` stay untouched.
    pub fn complete(&mut self) {
        if self.status == TaskStatus::Pending {
            self.status = TaskStatus::Completed;
            self.completed_at = Some(Utc::now());
        }
    }

    /// Returns true if the task is still pending.
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Case-insensitive substring match against the description or any tag.
    ///
    /// `needle` must already be lowercased by the caller.
    pub fn matches(&self, needle: &str) -> bool {
        self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::High > TaskPriority::Medium);
        assert!(TaskPriority::Medium > TaskPriority::Low);
    }

    #[test]
    fn test_priority_values() {
        assert_eq!(TaskPriority::Low.as_value(), 1);
        assert_eq!(TaskPriority::Medium.as_value(), 2);
        assert_eq!(TaskPriority::High.as_value(), 3);
    }

    #[test]
    fn test_priority_from_keyword() {
        assert_eq!(TaskPriority::from_keyword("HIGH"), Some(TaskPriority::High));
        assert_eq!(TaskPriority::from_keyword("low"), Some(TaskPriority::Low));
        assert_eq!(TaskPriority::from_keyword("whenever"), None);
    }

    #[test]
    fn test_task_creation() {
        let task = Task::new(1, "Water the plants");

        assert_eq!(task.id, 1);
        assert_eq!(task.description, "Water the plants");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.tags.is_empty());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_task_complete() {
        let mut task = Task::new(1, "Task");
        task.complete();

        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_task_complete_idempotent() {
        let mut task = Task::new(1, "Task");
        task.complete();
        let first = task.completed_at;

        task.complete();
        assert_eq!(task.completed_at, first);
    }

    #[test]
    fn test_add_tag_dedup_case_insensitive() {
        let mut task = Task::new(1, "Task");
        task.add_tag("Urgent");
        task.add_tag("urgent");
        task.add_tag("URGENT");

        assert_eq!(task.tags, vec!["Urgent".to_string()]);
    }

    #[test]
    fn test_matches_description_and_tags() {
        let mut task = Task::new(1, "Email Alice about the report");
        task.add_tag("Deadline");

        assert!(task.matches("alice"));
        assert!(task.matches("deadline"));
        assert!(!task.matches("meeting"));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TaskStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");

        let parsed: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Completed);
    }

    #[test]
    fn test_task_serialization_roundtrip() {
        let mut task = Task::with_priority(7, "Ship it", TaskPriority::High);
        task.add_tag("release");

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.description, "Ship it");
        assert_eq!(parsed.priority, TaskPriority::High);
        assert_eq!(parsed.tags, vec!["release".to_string()]);
    }
}
