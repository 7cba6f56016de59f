//! Project model
//!
//! A project is a named container owned by exactly one user (its creator).
//! Only the owner may delete it, and deleting it removes its tasks first.
//!
//! # Document
//!
//! ```json
//! {
//!   "$id": "65a1f0c2b3d4e5f60718",
//!   "name": "Launch",
//!   "description": "",
//!   "userId": "65a1e9...",
//!   "createdAt": "2024-03-01T10:00:00Z",
//!   "updatedAt": "2024-03-01T10:00:00Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Document id
    #[serde(rename = "$id")]
    pub id: String,

    /// Project name
    pub name: String,

    /// Free-form description, may be empty
    #[serde(default)]
    pub description: String,

    /// Owning user
    #[serde(default)]
    pub user_id: String,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Checks whether `user_id` owns this project
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        !self.user_id.is_empty() && self.user_id == user_id
    }
}

/// Input for creating a project
///
/// The owner and timestamps are stamped by the wrapper layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,

    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_from_document() {
        let project: Project = serde_json::from_value(json!({
            "$id": "p1",
            "$collectionId": "projects",
            "name": "Launch",
            "userId": "u1",
            "createdAt": "2024-03-01T10:00:00.000+00:00",
            "updatedAt": "2024-03-01T10:00:00.000+00:00"
        }))
        .unwrap();

        assert_eq!(project.name, "Launch");
        assert_eq!(project.description, "");
        assert!(project.is_owned_by("u1"));
        assert!(!project.is_owned_by("u2"));
    }

    #[test]
    fn test_project_without_owner_is_owned_by_nobody() {
        let project: Project = serde_json::from_value(json!({
            "$id": "p1",
            "name": "Orphan",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();

        assert!(!project.is_owned_by(""));
    }
}
