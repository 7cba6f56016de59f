//! Health check endpoint
//!
//! # Endpoint
//!
//! ```text
//! GET /health
//! ```
//!
//! # Response
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "backend": "appwrite",
//!   "sessions": 3
//! }
//! ```
//!
//! Status is `degraded` when the backend identifiers are not configured.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Backend implementation in use
    pub backend: String,

    /// Live client sessions
    pub sessions: usize,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let backend = &state.config.backend;
    let status = if backend.missing_identifiers().is_empty() {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: backend.kind.to_string(),
        sessions: state.sessions.len().await,
    }))
}
