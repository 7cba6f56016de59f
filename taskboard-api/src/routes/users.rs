//! User directory endpoints
//!
//! - `GET  /v1/users` - Every user in the directory
//! - `POST /v1/assignees/suggest` - `@mention` suggestions for an assignee field

use crate::{app::CurrentSession, error::ApiResult};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::mention::AssigneeField;
use taskboard_shared::models::User;

/// Suggestion request: the assignee field's current text
#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub text: String,
}

/// Suggestion response
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub value: String,
    pub showing: bool,
    pub suggestions: Vec<User>,
}

impl From<&AssigneeField> for SuggestResponse {
    fn from(field: &AssigneeField) -> Self {
        Self {
            value: field.value().to_string(),
            showing: field.is_showing(),
            suggestions: field.suggestions().to_vec(),
        }
    }
}

/// List the user directory
pub async fn list_users(Extension(current): Extension<CurrentSession>) -> ApiResult<Json<Vec<User>>> {
    let api = current.session.lock().await.api();
    Ok(Json(api.all_users().await))
}

/// Suggest assignees for the text typed so far
///
/// Suggestions show after an `@`: every user right after it, then the
/// users whose name or email contains the text following it.
pub async fn suggest_assignees(
    Extension(current): Extension<CurrentSession>,
    Json(req): Json<SuggestRequest>,
) -> ApiResult<Json<SuggestResponse>> {
    let api = current.session.lock().await.api();
    let users = api.all_users().await;

    let mut field = AssigneeField::default();
    field.input(&req.text, &users);

    Ok(Json(SuggestResponse::from(&field)))
}
