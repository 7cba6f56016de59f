//! Project dashboard
//!
//! Lists the projects the user owns and the projects where the user has
//! tasks assigned, each with its task count and per-status counts. Task
//! listings for all projects are fetched concurrently and joined before
//! the view is built.

use futures::future::join_all;
use serde::Serialize;

use crate::api::Api;
use crate::board::StatusCounts;
use crate::models::{Account, NewProject, Project};
use crate::notice::Notices;
use crate::remote::RemoteError;

/// Dashboard errors
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("{0}")]
    Validation(String),

    #[error("Only the project owner can delete it")]
    NotOwner,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// A project with its task counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,

    pub task_count: usize,

    pub counts: StatusCounts,
}

/// Dashboard view
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    /// Projects the user owns
    pub owned: Vec<ProjectSummary>,

    /// Projects owned by others where the user has assigned tasks
    pub shared: Vec<ProjectSummary>,
}

async fn summarize(api: &Api, projects: Vec<Project>) -> Vec<ProjectSummary> {
    let listings = join_all(projects.iter().map(|project| api.project_tasks(&project.id))).await;

    projects
        .into_iter()
        .zip(listings)
        .map(|(project, tasks)| ProjectSummary {
            task_count: tasks.len(),
            counts: StatusCounts::tally(&tasks),
            project,
        })
        .collect()
}

/// Builds the dashboard of `user`
pub async fn load_dashboard(api: &Api, user: &Account) -> Dashboard {
    let owned = api.user_projects().await;
    let shared: Vec<Project> = api
        .projects_with_assigned_tasks(&user.email)
        .await
        .into_iter()
        .filter(|project| !project.is_owned_by(&user.id))
        .collect();

    let (owned, shared) = futures::join!(summarize(api, owned), summarize(api, shared));

    tracing::debug!(
        user_id = %user.id,
        owned = owned.len(),
        shared = shared.len(),
        "Dashboard loaded"
    );

    Dashboard { owned, shared }
}

/// Creates a project after checking its name
pub async fn create_project(
    api: &Api,
    mut project: NewProject,
    notices: &mut Notices,
) -> Result<Project, DashboardError> {
    project.name = project.name.trim().to_string();
    if project.name.is_empty() {
        notices.error("Project name is required");
        return Err(DashboardError::Validation("Project name is required".to_string()));
    }

    match api.create_project(&project).await {
        Ok(created) => {
            notices.success("Project created successfully");
            Ok(created)
        }
        Err(e) => {
            notices.error("Failed to create project");
            Err(e.into())
        }
    }
}

/// Deletes a project the user owns, with all of its tasks
pub async fn delete_project(
    api: &Api,
    user: &Account,
    project_id: &str,
    notices: &mut Notices,
) -> Result<(), DashboardError> {
    let result = async {
        let project = api.project(project_id).await?;
        if !project.is_owned_by(&user.id) {
            return Err(DashboardError::NotOwner);
        }
        api.delete_project(project_id).await?;
        Ok(())
    }
    .await;

    match &result {
        Ok(()) => notices.success("Project deleted successfully"),
        Err(_) => notices.error("Failed to delete project"),
    }
    result
}
