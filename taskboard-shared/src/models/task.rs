//! Task model
//!
//! Tasks belong to exactly one project and sit in one of three status
//! columns on the project board.
//!
//! # Status Columns
//!
//! ```text
//! not_started ⇄ ongoing ⇄ completed
//! ```
//!
//! Any column can be reached from any other by a board move. A status
//! string outside these three values never parses, so a task can only ever
//! hold a valid status.
//!
//! # Document
//!
//! ```json
//! {
//!   "$id": "65a1f0c2b3d4e5f60719",
//!   "title": "Write copy",
//!   "description": "",
//!   "dueDate": "2024-03-08",
//!   "priority": "medium",
//!   "status": "not_started",
//!   "assignees": ["ada@example.com"],
//!   "projectId": "65a1f0c2b3d4e5f60718",
//!   "createdAt": "2024-03-01T10:00:00Z",
//!   "updatedAt": "2024-03-01T10:00:00Z"
//! }
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A string that names no known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Board column a task sits in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not begun
    #[default]
    NotStarted,

    /// Work in progress
    Ongoing,

    /// Work finished
    Completed,
}

impl TaskStatus {
    /// All statuses in board column order
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::NotStarted,
        TaskStatus::Ongoing,
        TaskStatus::Completed,
    ];

    /// Wire value, also used as the board column id
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::Ongoing => "ongoing",
            TaskStatus::Completed => "completed",
        }
    }

    /// Human-readable form used in notices ("not started")
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not started",
            TaskStatus::Ongoing => "ongoing",
            TaskStatus::Completed => "completed",
        }
    }

    /// Column heading on the board
    pub fn title(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::Ongoing => "Ongoing",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "task status",
                value: s.to_string(),
            })
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(UnknownVariant {
                kind: "task priority",
                value: other.to_string(),
            }),
        }
    }
}

/// Task document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Document id
    #[serde(rename = "$id")]
    pub id: String,

    /// Short title
    pub title: String,

    /// Free-form description, may be empty
    #[serde(default)]
    pub description: String,

    /// Due date (calendar day)
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub status: TaskStatus,

    /// Assignee emails
    #[serde(default)]
    pub assignees: Vec<String>,

    /// Owning project
    pub project_id: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub assignees: Vec<String>,

    pub project_id: String,
}

impl NewTask {
    /// A not-started, medium priority task due today with no assignees
    pub fn new(project_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            due_date: Some(Utc::now().date_naive()),
            priority: TaskPriority::Medium,
            status: TaskStatus::NotStarted,
            assignees: Vec::new(),
            project_id: project_id.into(),
        }
    }
}

/// Due dates travel as `YYYY-MM-DD`; the backend may echo them back as a
/// full timestamp, in which case only the date part is kept.
mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_values_are_exactly_three() {
        let values: Vec<&str> = TaskStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(values, vec!["not_started", "ongoing", "completed"]);
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!("ongoing".parse::<TaskStatus>().unwrap(), TaskStatus::Ongoing);
        assert!("done".parse::<TaskStatus>().is_err());
        assert!("Ongoing".parse::<TaskStatus>().is_err());
        assert!("".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::NotStarted);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(TaskStatus::NotStarted.label(), "not started");
        assert_eq!(TaskStatus::Completed.title(), "Completed");
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("high".parse::<TaskPriority>().unwrap(), TaskPriority::High);
        assert!("urgent".parse::<TaskPriority>().is_err());
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_task_with_timestamp_due_date() {
        let task: Task = serde_json::from_value(json!({
            "$id": "t1",
            "title": "Write copy",
            "dueDate": "2024-03-08T00:00:00.000+00:00",
            "priority": "high",
            "status": "ongoing",
            "assignees": ["ada@example.com"],
            "projectId": "p1",
            "createdAt": "2024-03-01T10:00:00.000+00:00",
            "updatedAt": "2024-03-01T10:00:00.000+00:00"
        }))
        .unwrap();

        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 3, 8));
        assert_eq!(task.status, TaskStatus::Ongoing);
        assert_eq!(task.description, "");
    }

    #[test]
    fn test_task_with_invalid_status_fails() {
        let result: Result<Task, _> = serde_json::from_value(json!({
            "$id": "t1",
            "title": "Write copy",
            "status": "archived",
            "projectId": "p1",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_new_task_document_shape() {
        let mut task = NewTask::new("p1", "Write copy");
        task.due_date = NaiveDate::from_ymd_opt(2024, 3, 8);

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "2024-03-08");
        assert_eq!(value["status"], "not_started");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["projectId"], "p1");
        assert_eq!(value["assignees"], json!([]));
    }
}
