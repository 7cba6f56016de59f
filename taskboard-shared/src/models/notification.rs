//! Notification model
//!
//! Notifications are created by the task-creation flow when an assignee
//! resolves to a known user. They are only ever mutated by the read toggle
//! and are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TaskAssigned,
    TaskUpdated,
    ProjectShared,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::TaskAssigned => "task_assigned",
            NotificationType::TaskUpdated => "task_updated",
            NotificationType::ProjectShared => "project_shared",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "$id")]
    pub id: String,

    /// Recipient
    pub user_id: String,

    #[serde(rename = "type")]
    pub kind: NotificationType,

    pub title: String,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default)]
    pub is_read: bool,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: String,

    #[serde(rename = "type")]
    pub kind: NotificationType,

    pub title: String,

    pub message: String,

    pub task_id: Option<String>,

    pub project_id: Option<String>,

    pub is_read: bool,
}

impl NewNotification {
    /// Unread `task_assigned` notification for one assignee
    pub fn task_assigned(
        user_id: impl Into<String>,
        task_id: impl Into<String>,
        task_title: &str,
        project_id: impl Into<String>,
        project_name: &str,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind: NotificationType::TaskAssigned,
            title: "New Task Assigned".to_string(),
            message: format!(
                "You have been assigned to \"{}\" in project \"{}\"",
                task_title, project_name
            ),
            task_id: Some(task_id.into()),
            project_id: Some(project_id.into()),
            is_read: false,
        }
    }
}
