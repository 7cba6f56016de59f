use serde_json::{json, Value};
use std::collections::HashSet;

use super::{decode, decode_all, now_iso, with_fields, Api};
use crate::ids::unique_id;
use crate::models::{NewProject, Project, Task};
use crate::remote::{Collection, Query, RemoteError, RemoteResult};

impl Api {
    /// Creates a project owned by the signed-in user
    pub async fn create_project(&self, project: &NewProject) -> RemoteResult<Project> {
        let result = async {
            let user = self
                .current_user()
                .await
                .ok_or_else(|| RemoteError::unauthorized("No signed-in user"))?;

            let now = now_iso();
            let data = with_fields(
                serde_json::to_value(project)?,
                vec![
                    ("userId", json!(user.id)),
                    ("createdAt", json!(now)),
                    ("updatedAt", json!(now)),
                ],
            );

            let document = self
                .backend
                .create_document(Collection::Projects, &unique_id(), data)
                .await?;
            decode::<Project>(document)
        }
        .await;

        match &result {
            Ok(project) => tracing::info!(project_id = %project.id, "Project created"),
            Err(e) => tracing::error!(error = %e, "Error creating project"),
        }
        result
    }

    /// Projects owned by the signed-in user
    pub async fn user_projects(&self) -> Vec<Project> {
        let result = async {
            let user = self
                .current_user()
                .await
                .ok_or_else(|| RemoteError::unauthorized("No signed-in user"))?;

            let documents = self
                .backend
                .list_all_documents(Collection::Projects, &[Query::equal("userId", user.id)])
                .await?;
            decode_all::<Project>(documents)
        }
        .await;

        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Error getting user projects");
            Vec::new()
        })
    }

    pub async fn project(&self, project_id: &str) -> RemoteResult<Project> {
        let result = async {
            let document = self
                .backend
                .get_document(Collection::Projects, project_id)
                .await?;
            decode::<Project>(document)
        }
        .await;

        if let Err(e) = &result {
            tracing::error!(error = %e, project_id = %project_id, "Error getting project");
        }
        result
    }

    /// Deletes a project and every task in it, tasks first
    ///
    /// The task listing does not degrade here: if it fails, nothing is
    /// deleted. A failure part-way leaves the project and its remaining
    /// tasks in place.
    pub async fn delete_project(&self, project_id: &str) -> RemoteResult<()> {
        let result = async {
            let tasks = self
                .backend
                .list_all_documents(Collection::Tasks, &[Query::equal("projectId", project_id)])
                .await?;

            for task in &tasks {
                if let Some(task_id) = task.get("$id").and_then(Value::as_str) {
                    self.backend
                        .delete_document(Collection::Tasks, task_id)
                        .await?;
                }
            }

            self.backend
                .delete_document(Collection::Projects, project_id)
                .await?;
            Ok::<_, RemoteError>(tasks.len())
        }
        .await;

        match result {
            Ok(removed_tasks) => {
                tracing::info!(project_id = %project_id, removed_tasks, "Project deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, project_id = %project_id, "Error deleting project");
                Err(e)
            }
        }
    }

    /// Projects holding tasks assigned to `email`
    ///
    /// Each project is fetched once; projects that fail to load are logged
    /// and skipped.
    pub async fn projects_with_assigned_tasks(&self, email: &str) -> Vec<Project> {
        let tasks = match self
            .backend
            .list_all_documents(Collection::Tasks, &[Query::search("assignees", email)])
            .await
            .and_then(decode_all::<Task>)
        {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::error!(error = %e, "Error getting projects with assigned tasks");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut projects = Vec::new();

        for task in tasks {
            if !seen.insert(task.project_id.clone()) {
                continue;
            }

            match self.project(&task.project_id).await {
                Ok(project) => projects.push(project),
                Err(e) => tracing::error!(
                    error = %e,
                    project_id = %task.project_id,
                    "Error fetching assigned project"
                ),
            }
        }

        projects
    }
}
