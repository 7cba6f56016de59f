//! Account service payloads
//!
//! The account resource lives outside the document collections. These
//! types capture the handful of fields the application reads from it.

use serde::{Deserialize, Serialize};

/// The signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account id, shared with the user directory document
    #[serde(rename = "$id")]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Email address
    pub email: String,

    /// Whether the email address has been verified
    #[serde(default)]
    pub email_verification: bool,
}

/// A session created by the account service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(rename = "$id")]
    pub id: String,

    /// Account the session belongs to
    pub user_id: String,

    /// Expiry as reported by the service
    #[serde(default)]
    pub expire: Option<String>,
}

/// A magic-URL token
///
/// The secret is delivered to the user by the service; it is only echoed
/// back to trusted callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicToken {
    #[serde(rename = "$id")]
    pub id: String,

    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}
