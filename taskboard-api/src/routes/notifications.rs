//! Notification centre endpoints
//!
//! - `GET  /v1/notifications` - Cached notifications and unread count
//! - `POST /v1/notifications/refresh` - Reload from the backend
//! - `POST /v1/notifications/:id/read` - Mark one read
//! - `POST /v1/notifications/:id/open` - Mark one read and get its project route
//! - `POST /v1/notifications/read-all` - Mark every notification read

use crate::{app::CurrentSession, error::ApiResult};
use axum::{extract::Path, Extension, Json};
use serde::Serialize;
use taskboard_shared::api::MarkAllReport;
use taskboard_shared::navigation::Route;
use taskboard_shared::notifications::NotificationCenter;

/// Open response
#[derive(Debug, Serialize)]
pub struct OpenResponse {
    /// Project the notification points at, if any
    pub redirect: Option<Route>,

    #[serde(flatten)]
    pub center: NotificationCenter,
}

/// Mark-all response
#[derive(Debug, Serialize)]
pub struct MarkAllResponse {
    pub report: MarkAllReport,

    #[serde(flatten)]
    pub center: NotificationCenter,
}

pub async fn list_notifications(
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<NotificationCenter>> {
    let session = current.session.lock().await;
    Ok(Json(session.app.notifications().clone()))
}

pub async fn refresh(
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<NotificationCenter>> {
    let mut session = current.session.lock().await;
    session.app.load_notifications().await;
    Ok(Json(session.app.notifications().clone()))
}

/// Mark one notification read
///
/// # Errors
///
/// - `404 Not Found`: No such notification
pub async fn mark_read(
    Extension(current): Extension<CurrentSession>,
    Path(notification_id): Path<String>,
) -> ApiResult<Json<NotificationCenter>> {
    let mut session = current.session.lock().await;
    session.app.mark_notification_read(&notification_id).await?;
    Ok(Json(session.app.notifications().clone()))
}

pub async fn open(
    Extension(current): Extension<CurrentSession>,
    Path(notification_id): Path<String>,
) -> ApiResult<Json<OpenResponse>> {
    let mut session = current.session.lock().await;
    let redirect = session.app.open_notification(&notification_id).await?;

    Ok(Json(OpenResponse {
        redirect,
        center: session.app.notifications().clone(),
    }))
}

/// Mark every notification read
///
/// If any update fails, nothing is marked locally and the response is a
/// `503` naming how many failed.
pub async fn mark_all_read(
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<MarkAllResponse>> {
    let mut session = current.session.lock().await;
    let report = session.app.mark_all_notifications_read().await?;

    Ok(Json(MarkAllResponse {
        report,
        center: session.app.notifications().clone(),
    }))
}
