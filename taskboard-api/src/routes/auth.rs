//! Authentication endpoints
//!
//! Accounts live in the hosted backend. Signing in here opens a server-side
//! client session and returns a token naming it.
//!
//! # Endpoints
//!
//! - `POST /v1/auth/register` - Create an account (sign in afterwards)
//! - `POST /v1/auth/login` - Sign in with email and password
//! - `POST /v1/auth/magic-link` - Mail a sign-in/verification link
//! - `POST /v1/auth/verify` - Complete a magic link
//! - `POST /v1/auth/logout` - Sign out and end the client session
//! - `GET  /v1/auth/me` - Re-check the session and return the account

use crate::{
    app::{AppState, CurrentSession, IssuedToken},
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::models::Account;
use taskboard_shared::navigation::{AuthState, Route};
use taskboard_shared::notice::Notice;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Magic link request
#[derive(Debug, Deserialize, Validate)]
pub struct MagicLinkRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Magic link completion, as found in the link's query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub secret: Option<String>,
}

/// Where the client goes next, with the notices raised on the way
#[derive(Debug, Serialize)]
pub struct FlowResponse {
    pub redirect: Route,
    pub notices: Vec<Notice>,
}

/// Response of a successful sign-in
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInResponse {
    /// Bearer token naming the client session (24h)
    pub token: String,

    /// Token expiry (Unix timestamp)
    pub expires_at: i64,

    pub user: Account,

    pub redirect: Route,

    pub notices: Vec<Notice>,
}

impl SignedInResponse {
    fn new(issued: IssuedToken, user: Account, redirect: Route, notices: Vec<Notice>) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
            redirect,
            notices,
        }
    }
}

/// Current session view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: Account,
    pub auth_state: AuthState,
    pub unread_notifications: usize,
}

/// Register a new account
///
/// Registration does not sign the user in; the response redirects to the
/// sign-in page.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<FlowResponse>)> {
    req.validate()?;

    let mut app = state.new_app_session();
    let redirect = app.register(&req.name, &req.email, &req.password).await?;

    tracing::info!(email = %req.email, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(FlowResponse {
            redirect,
            notices: app.drain_notices(),
        }),
    ))
}

/// Sign in with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SignedInResponse>> {
    req.validate()?;

    let mut app = state.new_app_session();
    let redirect = app.login(&req.email, &req.password).await?;

    let user = app.require_user()?.clone();
    let notices = app.drain_notices();
    let issued = state.issue_token(app).await?;

    Ok(Json(SignedInResponse::new(issued, user, redirect, notices)))
}

/// Mail a magic link pointing back at the front end's verify page
pub async fn request_magic_link(
    State(state): State<AppState>,
    Json(req): Json<MagicLinkRequest>,
) -> ApiResult<(StatusCode, Json<Vec<Notice>>)> {
    req.validate()?;

    let mut app = state.new_app_session();
    app.request_magic_link(&req.email, &state.config.verification_url())
        .await?;

    Ok((StatusCode::ACCEPTED, Json(app.drain_notices())))
}

/// Complete a magic link and sign in
///
/// # Errors
///
/// - `400 Bad Request`: The link lacks `userId` or `secret`
/// - `401 Unauthorized`: The link has expired or was already used
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Json<SignedInResponse>> {
    let mut app = state.new_app_session();
    let redirect = app
        .verify_magic_link(req.user_id.as_deref(), req.secret.as_deref())
        .await?;

    let user = app.require_user()?.clone();
    let notices = app.drain_notices();
    let issued = state.issue_token(app).await?;

    Ok(Json(SignedInResponse::new(issued, user, redirect, notices)))
}

/// Sign out and end the client session
///
/// When the backend refuses, the session stays open.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<FlowResponse>> {
    let mut session = current.session.lock().await;
    let redirect = session.app.logout().await?;
    session.teardown();
    let notices = session.app.drain_notices();
    drop(session);

    state.sessions.remove(&current.id).await;
    tracing::info!(session_id = %current.id, "Client session closed");

    Ok(Json(FlowResponse { redirect, notices }))
}

/// Re-check the session against the backend
///
/// A session whose backend session has ended is closed.
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<MeResponse>> {
    let mut session = current.session.lock().await;
    let auth_state = session.app.init().await;

    let Some(user) = session.app.user().cloned() else {
        session.teardown();
        drop(session);
        state.sessions.remove(&current.id).await;
        return Err(ApiError::Unauthorized("Session has ended".to_string()));
    };

    Ok(Json(MeResponse {
        user,
        auth_state,
        unread_notifications: session.app.notifications().unread(),
    }))
}
