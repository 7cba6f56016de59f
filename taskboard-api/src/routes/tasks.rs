//! Task endpoints
//!
//! - `POST   /v1/projects/:id/tasks` - Create a task on a board
//! - `DELETE /v1/projects/:id/tasks/:task_id` - Delete a task (owner only)
//!
//! New tasks always start in the not-started column. Known assignees are
//! notified and mailed; unknown emails are kept on the task but reach
//! nobody.

use crate::{app::CurrentSession, error::ApiResult, sessions::BoardHandle};
use axum::{extract::Path, http::StatusCode, Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use taskboard_shared::models::{NewTask, Task, TaskPriority, TaskStatus};
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    /// Defaults to today
    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub priority: TaskPriority,

    /// Assignee emails; blanks are dropped
    #[serde(default)]
    pub assignees: Vec<String>,
}

impl CreateTaskRequest {
    fn into_new_task(self, project_id: &str) -> NewTask {
        NewTask {
            title: self.title,
            description: self.description,
            due_date: self.due_date.or_else(|| Some(Utc::now().date_naive())),
            priority: self.priority,
            status: TaskStatus::NotStarted,
            assignees: self.assignees,
            project_id: project_id.to_string(),
        }
    }
}

/// Create a task
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Blank or oversized title
/// - `404 Not Found`: No such project
pub async fn create_task(
    Extension(current): Extension<CurrentSession>,
    Path(project_id): Path<String>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let mut session = current.session.lock().await;
    let BoardHandle { api, board, notices } = session.board(&project_id).await?;
    let task = board
        .create_task(&api, req.into_new_task(&project_id), notices)
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Delete a task
///
/// # Errors
///
/// - `403 Forbidden`: The caller does not own the project
/// - `404 Not Found`: No such project or task
pub async fn delete_task(
    Extension(current): Extension<CurrentSession>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut session = current.session.lock().await;
    let BoardHandle { api, board, notices } = session.board(&project_id).await?;
    board.delete_task(&api, &task_id, notices).await?;

    Ok(StatusCode::NO_CONTENT)
}
