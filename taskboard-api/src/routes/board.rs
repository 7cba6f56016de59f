//! Drag and drop on a project board
//!
//! - `POST /v1/projects/:id/board/drag` - Pick a task up
//! - `POST /v1/projects/:id/board/drop` - Drop the task on a status column
//!
//! A drag request may carry the gesture samples observed so far; the task
//! is only picked up once they activate a drag. Dropping updates the task
//! optimistically and rolls it back if the backend refuses.

use crate::{app::CurrentSession, error::ApiResult, sessions::BoardHandle};
use axum::{extract::Path, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::board::{
    Activation, DragSensor, DropOutcome, GestureSample, InputKind, StatusCounts,
};
use taskboard_shared::models::Task;

/// Drag request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragRequest {
    pub task_id: String,

    #[serde(default)]
    pub input: Option<InputKind>,

    /// Offsets from the gesture's start; empty means already activated
    #[serde(default)]
    pub samples: Vec<GestureSample>,
}

/// Drag response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragResponse {
    pub activation: Activation,
    pub active_task: Option<Task>,
}

/// Drop request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropRequest {
    pub task_id: String,

    /// Column id the task was released over
    pub destination: String,
}

/// Drop response
#[derive(Debug, Serialize)]
pub struct DropResponse {
    #[serde(flatten)]
    pub outcome: DropOutcome,

    pub counts: StatusCounts,
}

impl DragRequest {
    fn activation(&self) -> Activation {
        match self.input {
            Some(input) if !self.samples.is_empty() => DragSensor::evaluate(input, &self.samples),
            _ => Activation::Active,
        }
    }
}

/// Pick a task up
///
/// # Errors
///
/// - `403 Forbidden`: The caller does not own the project
pub async fn begin_drag(
    Extension(current): Extension<CurrentSession>,
    Path(project_id): Path<String>,
    Json(req): Json<DragRequest>,
) -> ApiResult<Json<DragResponse>> {
    let mut session = current.session.lock().await;
    let BoardHandle { board, .. } = session.board(&project_id).await?;

    let activation = req.activation();
    match activation {
        Activation::Active => board.begin_drag(&req.task_id)?,
        Activation::Cancelled => board.cancel_drag(),
        Activation::Pending => {}
    }

    Ok(Json(DragResponse {
        activation,
        active_task: board.active_task().cloned(),
    }))
}

/// Drop a task on a status column
///
/// Same-column drops and drops outside a column are ignored without a
/// backend call.
///
/// # Errors
///
/// - `403 Forbidden`: The caller does not own the project
pub async fn drop_task(
    Extension(current): Extension<CurrentSession>,
    Path(project_id): Path<String>,
    Json(req): Json<DropRequest>,
) -> ApiResult<Json<DropResponse>> {
    let mut session = current.session.lock().await;
    let BoardHandle { api, board, notices } = session.board(&project_id).await?;

    let outcome = board
        .complete_drag(&api, &req.task_id, &req.destination, notices)
        .await?;

    Ok(Json(DropResponse {
        outcome,
        counts: board.counts(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(input: Option<InputKind>, samples: Vec<GestureSample>) -> DragRequest {
        DragRequest {
            task_id: "t1".to_string(),
            input,
            samples,
        }
    }

    #[test]
    fn test_drag_without_samples_is_active() {
        assert_eq!(request(None, Vec::new()).activation(), Activation::Active);
    }

    #[test]
    fn test_quick_touch_swipe_never_activates() {
        let samples = vec![GestureSample {
            dx: 12.0,
            dy: 0.0,
            elapsed_ms: 40,
        }];
        assert_eq!(
            request(Some(InputKind::Touch), samples).activation(),
            Activation::Cancelled
        );
    }

    #[test]
    fn test_pointer_drag_activates_past_threshold() {
        let samples = vec![
            GestureSample {
                dx: 2.0,
                dy: 1.0,
                elapsed_ms: 10,
            },
            GestureSample {
                dx: 9.0,
                dy: 0.0,
                elapsed_ms: 30,
            },
        ];
        assert_eq!(
            request(Some(InputKind::Pointer), samples).activation(),
            Activation::Active
        );
    }

    #[test]
    fn test_samples_deserialize() {
        let req: DragRequest = serde_json::from_value(serde_json::json!({
            "taskId": "t1",
            "input": "touch",
            "samples": [{ "dx": 1.0, "dy": 1.0, "elapsedMs": 300 }]
        }))
        .unwrap();
        assert_eq!(req.activation(), Activation::Active);
    }
}
