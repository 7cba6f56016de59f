//! Backend configuration
//!
//! Identifiers of the hosted backend (endpoint, project, database and the
//! four collections) are read from the environment. Missing identifiers
//! default to empty strings: the service still starts, and calls against
//! the backend fail at request time instead.
//!
//! # Environment Variables
//!
//! - `TASKBOARD_BACKEND`: `appwrite` (default) or `memory`
//! - `TASKBOARD_ENDPOINT`: backend endpoint (default: `https://cloud.appwrite.io/v1`)
//! - `TASKBOARD_PROJECT_ID`: backend project id
//! - `TASKBOARD_DATABASE_ID`: database id
//! - `TASKBOARD_PROJECTS_COLLECTION_ID`
//! - `TASKBOARD_TASKS_COLLECTION_ID`
//! - `TASKBOARD_USERS_COLLECTION_ID`
//! - `TASKBOARD_NOTIFICATIONS_COLLECTION_ID`

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::remote::Collection;

/// Default backend endpoint
pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Which backend implementation serves remote calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted document database over REST
    Appwrite,

    /// In-process store, nothing survives a restart
    Memory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Appwrite => "appwrite",
            BackendKind::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "appwrite" => Ok(BackendKind::Appwrite),
            "memory" => Ok(BackendKind::Memory),
            other => anyhow::bail!("Unknown backend kind: {}", other),
        }
    }
}

/// Collection identifiers inside the configured database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionIds {
    pub projects: String,
    pub tasks: String,
    pub users: String,
    pub notifications: String,
}

impl CollectionIds {
    /// Returns the configured id of a collection
    pub fn id_of(&self, collection: Collection) -> &str {
        match collection {
            Collection::Projects => &self.projects,
            Collection::Tasks => &self.tasks,
            Collection::Users => &self.users,
            Collection::Notifications => &self.notifications,
        }
    }
}

/// Hosted backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Which implementation to use
    pub kind: BackendKind,

    /// REST endpoint, including the version prefix
    pub endpoint: String,

    /// Backend project id, sent with every request
    pub project_id: String,

    /// Database holding the collections
    pub database_id: String,

    /// Collection ids
    pub collections: CollectionIds,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Appwrite,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: String::new(),
            database_id: String::new(),
            collections: CollectionIds::default(),
        }
    }
}

impl BackendConfig {
    /// Loads backend configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error only when `TASKBOARD_BACKEND` names an unknown
    /// backend. Absent identifiers become empty strings.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let kind = match env::var("TASKBOARD_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => BackendKind::Appwrite,
        };

        let config = Self {
            kind,
            endpoint: env::var("TASKBOARD_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            project_id: var_or_empty("TASKBOARD_PROJECT_ID"),
            database_id: var_or_empty("TASKBOARD_DATABASE_ID"),
            collections: CollectionIds {
                projects: var_or_empty("TASKBOARD_PROJECTS_COLLECTION_ID"),
                tasks: var_or_empty("TASKBOARD_TASKS_COLLECTION_ID"),
                users: var_or_empty("TASKBOARD_USERS_COLLECTION_ID"),
                notifications: var_or_empty("TASKBOARD_NOTIFICATIONS_COLLECTION_ID"),
            },
        };

        for missing in config.missing_identifiers() {
            tracing::warn!(variable = missing, "Backend identifier is not configured");
        }

        Ok(config)
    }

    /// Names of the identifiers left empty
    pub fn missing_identifiers(&self) -> Vec<&'static str> {
        if self.kind == BackendKind::Memory {
            return Vec::new();
        }

        let checks = [
            ("TASKBOARD_PROJECT_ID", &self.project_id),
            ("TASKBOARD_DATABASE_ID", &self.database_id),
            ("TASKBOARD_PROJECTS_COLLECTION_ID", &self.collections.projects),
            ("TASKBOARD_TASKS_COLLECTION_ID", &self.collections.tasks),
            ("TASKBOARD_USERS_COLLECTION_ID", &self.collections.users),
            (
                "TASKBOARD_NOTIFICATIONS_COLLECTION_ID",
                &self.collections.notifications,
            ),
        ];

        checks
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}

fn var_or_empty(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!(" Appwrite ".parse::<BackendKind>().unwrap(), BackendKind::Appwrite);
        assert!("postgres".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_default_config_has_empty_identifiers() {
        let config = BackendConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.missing_identifiers().len(), 6);
    }

    #[test]
    fn test_memory_backend_needs_no_identifiers() {
        let config = BackendConfig {
            kind: BackendKind::Memory,
            ..BackendConfig::default()
        };
        assert!(config.missing_identifiers().is_empty());
    }

    #[test]
    fn test_collection_lookup() {
        let ids = CollectionIds {
            projects: "p".to_string(),
            tasks: "t".to_string(),
            users: "u".to_string(),
            notifications: "n".to_string(),
        };
        assert_eq!(ids.id_of(Collection::Tasks), "t");
        assert_eq!(ids.id_of(Collection::Notifications), "n");
    }
}
