//! Route guard
//!
//! `GET /v1/navigation?path=/project/p1` tells the front end whether to
//! render a page, wait for the session check, or redirect. The token is
//! optional here: without one the visitor is anonymous.
//!
//! # Response
//!
//! ```json
//! { "route": "/project/p1", "authState": "anonymous", "action": "redirect", "to": "/sign-in" }
//! ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::navigation::{guard, AuthState, Guard, Route};

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationResponse {
    pub route: Route,
    pub auth_state: AuthState,

    #[serde(flatten)]
    pub guard: Guard,
}

/// Decide what to do with a visit to `path`
///
/// # Errors
///
/// - `404 Not Found`: The path is not an application route
pub async fn check_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NavigationQuery>,
) -> ApiResult<Json<NavigationResponse>> {
    let route = Route::parse(&query.path)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown route: {}", query.path)))?;

    // An expired or unknown token counts as anonymous
    let auth_state = match state.resolve_session(&headers).await {
        Ok(Some(current)) => current.session.lock().await.app.auth_state(),
        Ok(None) | Err(_) => AuthState::Anonymous,
    };

    Ok(Json(NavigationResponse {
        guard: guard(&route, auth_state),
        route,
        auth_state,
    }))
}
