//! Errors returned by the remote data service

use serde::Deserialize;

/// Remote result type alias
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error type for remote calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service answered with an error
    #[error("Remote service error {code} ({kind}): {message}")]
    Service {
        /// HTTP status indication
        code: u16,

        /// Service error type (e.g. "document_not_found")
        kind: String,

        message: String,
    },

    /// The request never got an answer
    #[error("Transport error: {0}")]
    Transport(String),

    /// The answer could not be decoded
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Error body sent by the service
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub code: u16,

    #[serde(default, rename = "type")]
    pub kind: String,
}

impl RemoteError {
    pub fn service(code: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError::Service {
            code,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// 401 raised for calls that need a signed-in account
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::service(401, "general_unauthorized_scope", message)
    }

    pub fn not_found(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::service(404, kind, message)
    }

    /// Status indication, when the service answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Service { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this is the expected failure for anonymous visitors
    pub fn is_unauthorized(&self) -> bool {
        if self.status() == Some(401) {
            return true;
        }
        let text = self.to_string();
        text.contains("401") || text.contains("Unauthorized")
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}
