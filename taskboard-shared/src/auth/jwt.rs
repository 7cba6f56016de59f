//! Client session tokens
//!
//! The API server hands each signed-in client a JWT naming the server-side
//! client session it belongs to. Tokens are signed with HS256 and carry the
//! account id as subject and the client session id as `sid`.
//!
//! # Security
//!
//! - **Algorithm**: HS256 (HMAC with SHA-256)
//! - **Expiration**: 24 hours by default
//! - **Validation**: signature, expiration, not-before and issuer
//! - **Secret**: at least 32 bytes, enforced by the server configuration
//!
//! # Example
//!
//! ```
//! use taskboard_shared::auth::jwt::{create_token, validate_token, Claims};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session_id = Uuid::new_v4();
//! let claims = Claims::new("65a1e9c0d1e2f3a4b5c6", session_id);
//! let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
//!
//! let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
//! assert_eq!(validated.sid, session_id);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer of every token
pub const ISSUER: &str = "taskboard";

/// Default token lifetime
pub fn default_expiration() -> Duration {
    Duration::hours(24)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account id
    pub sub: String,

    /// Client session id
    pub sid: Uuid,

    /// Issuer - always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Claims with the default lifetime
    pub fn new(account_id: impl Into<String>, session_id: Uuid) -> Self {
        Self::with_expiration(account_id, session_id, default_expiration())
    }

    pub fn with_expiration(account_id: impl Into<String>, session_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: account_id.into(),
            sid: session_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Time left before expiry, `None` once expired
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Signs claims into a token
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and returns its claims
///
/// # Errors
///
/// Fails on a bad signature, an expired or not-yet-valid token, or a
/// foreign issuer.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
