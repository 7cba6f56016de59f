//! Project endpoints
//!
//! - `GET    /v1/projects` - Dashboard: owned and shared projects with counts
//! - `POST   /v1/projects` - Create a project owned by the caller
//! - `GET    /v1/projects/:id` - Open a project's board
//! - `DELETE /v1/projects/:id` - Delete a project and all of its tasks (owner only)

use crate::{
    app::CurrentSession,
    error::ApiResult,
};
use axum::{
    extract::Path,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::board::{BoardController, Column, StatusCounts};
use taskboard_shared::dashboard::{self, Dashboard};
use taskboard_shared::models::{NewProject, Project, Task};
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(max = 128, message = "Name must be at most 128 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,
}

/// A project board as one viewer sees it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub project: Project,
    pub is_owner: bool,
    pub counts: StatusCounts,
    pub columns: Vec<Column>,
    pub active_task: Option<Task>,
}

impl From<&BoardController> for BoardView {
    fn from(board: &BoardController) -> Self {
        Self {
            project: board.project().clone(),
            is_owner: board.is_owner(),
            counts: board.counts(),
            columns: board.columns(),
            active_task: board.active_task().cloned(),
        }
    }
}

/// Dashboard of the caller
pub async fn list_projects(
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<Dashboard>> {
    let session = current.session.lock().await;
    let user = session.app.require_user()?;

    Ok(Json(dashboard::load_dashboard(session.app.api(), user).await))
}

/// Create a project
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Blank or oversized name
pub async fn create_project(
    Extension(current): Extension<CurrentSession>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;

    let mut session = current.session.lock().await;
    let api = session.api();
    let project = dashboard::create_project(
        &api,
        NewProject {
            name: req.name,
            description: req.description,
        },
        session.app.notices_mut(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Open a project's board, reloading it from the backend
///
/// # Errors
///
/// - `404 Not Found`: No such project
pub async fn get_board(
    Extension(current): Extension<CurrentSession>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<BoardView>> {
    let mut session = current.session.lock().await;
    let board = session.open_board(&project_id).await?;

    Ok(Json(BoardView::from(board)))
}

/// Delete a project with all of its tasks
///
/// # Errors
///
/// - `403 Forbidden`: The caller does not own the project
/// - `404 Not Found`: No such project
pub async fn delete_project(
    Extension(current): Extension<CurrentSession>,
    Path(project_id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut session = current.session.lock().await;
    let api = session.api();
    let user = session.app.require_user()?.clone();

    dashboard::delete_project(&api, &user, &project_id, session.app.notices_mut()).await?;
    session.close_board(&project_id);

    tracing::info!(project_id = %project_id, user_id = %user.id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}
