//! Error handling for the API server
//!
//! This module provides a unified error type that maps to HTTP responses.
//! All handlers return `Result<T, ApiError>`; library errors convert into it
//! with `?`.
//!
//! # Example
//!
//! ```ignore
//! use taskboard_api::error::ApiResult;
//! use axum::Json;
//! use taskboard_shared::models::Project;
//!
//! async fn handler(api: taskboard_shared::api::Api) -> ApiResult<Json<Project>> {
//!     let project = api.project("p1").await?;
//!     Ok(Json(project))
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::auth::jwt::JwtError;
use taskboard_shared::board::BoardError;
use taskboard_shared::dashboard::DashboardError;
use taskboard_shared::notifications::NotificationError;
use taskboard_shared::remote::RemoteError;
use taskboard_shared::session::{SessionError, VerificationError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503) - the backend did not answer
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert backend errors to API errors
impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Service { code, message, kind } => match code {
                400 => ApiError::BadRequest(message),
                401 => ApiError::Unauthorized(message),
                403 => ApiError::Forbidden(message),
                404 => ApiError::NotFound(message),
                409 => ApiError::Conflict(message),
                503 => ApiError::ServiceUnavailable(message),
                _ => ApiError::InternalError(format!(
                    "Backend error {} ({}): {}",
                    code, kind, message
                )),
            },
            RemoteError::Transport(msg) => {
                tracing::error!(error = %msg, "Backend unreachable");
                ApiError::ServiceUnavailable("Backend service is unreachable".to_string())
            }
            RemoteError::Decode(msg) => {
                ApiError::InternalError(format!("Malformed backend response: {}", msg))
            }
        }
    }
}

/// Convert validator errors to a per-field 422
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(errors)
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::NotOwner => ApiError::Forbidden(err.to_string()),
            BoardError::Validation(msg) => {
                ApiError::ValidationError(vec![ValidationErrorDetail::new("title", msg)])
            }
            BoardError::TaskNotFound(_) => ApiError::NotFound(err.to_string()),
            BoardError::Remote(e) => e.into(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Validation(msg) => {
                ApiError::ValidationError(vec![ValidationErrorDetail::new("name", msg)])
            }
            DashboardError::NotOwner => ApiError::Forbidden(err.to_string()),
            DashboardError::Remote(e) => e.into(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotAuthenticated => ApiError::Unauthorized(err.to_string()),
            SessionError::AccountMissing => ApiError::InternalError(err.to_string()),
            SessionError::Remote(e) => e.into(),
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::InvalidLink => ApiError::BadRequest(err.to_string()),
            VerificationError::LinkExpired => ApiError::Unauthorized(err.to_string()),
            VerificationError::Failed(e) => e.into(),
            VerificationError::SessionMissing => ApiError::Unauthorized(err.to_string()),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound(_) => ApiError::NotFound(err.to_string()),
            NotificationError::PartialFailure { .. } => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            NotificationError::Remote(e) => e.into(),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Project not found".to_string());
        assert_eq!(err.to_string(), "Not found: Project not found");
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail::new("email", "Invalid email format"),
            ValidationErrorDetail::new("password", "Password too short"),
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_remote_status_mapping() {
        let err: ApiError = RemoteError::not_found("document_not_found", "gone").into();
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "gone"));

        let err: ApiError = RemoteError::service(409, "user_already_exists", "taken").into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = RemoteError::unauthorized("who are you").into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = RemoteError::Transport("connection refused".to_string()).into();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));

        let err: ApiError = RemoteError::service(500, "general_unknown", "boom").into();
        assert!(matches!(err, ApiError::InternalError(_)));
    }

    #[test]
    fn test_board_errors() {
        assert!(matches!(ApiError::from(BoardError::NotOwner), ApiError::Forbidden(_)));

        match ApiError::from(BoardError::Validation("Task title is required".to_string())) {
            ApiError::ValidationError(details) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "title");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_internal_error_is_not_exposed() {
        let response = ApiError::InternalError("secret detail".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
