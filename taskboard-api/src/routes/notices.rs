//! Pending notices
//!
//! `GET /v1/notices` returns and clears the notices raised by the caller's
//! earlier requests, oldest first.

use crate::{app::CurrentSession, error::ApiResult};
use axum::{Extension, Json};
use taskboard_shared::notice::Notice;

pub async fn drain_notices(Extension(current): Extension<CurrentSession>) -> ApiResult<Json<Vec<Notice>>> {
    let mut session = current.session.lock().await;
    Ok(Json(session.app.drain_notices()))
}
