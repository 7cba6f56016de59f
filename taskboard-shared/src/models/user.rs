//! User directory model
//!
//! A denormalized mirror of accounts, written at registration under the
//! same id as the account. Task assignment resolves typed `@mentions`
//! against this directory and maps assignee emails back to user ids.

use serde::{Deserialize, Serialize};

/// Entry of the user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id (same as the account id)
    #[serde(rename = "$id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Optional avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    /// Case-insensitive substring match on name or email
    ///
    /// `term` must already be lower-cased.
    pub fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term) || self.email.to_lowercase().contains(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str) -> User {
        User {
            id: "u1".to_string(),
            name: name.to_string(),
            email: email.to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn test_matches_name_or_email() {
        let ada = user("Ada Lovelace", "ada@example.com");
        assert!(ada.matches("love"));
        assert!(ada.matches("example"));
        assert!(ada.matches(""));
        assert!(!ada.matches("grace"));
    }

    #[test]
    fn test_matches_ignores_case_of_stored_fields() {
        let grace = user("Grace HOPPER", "Grace@Navy.mil");
        assert!(grace.matches("hopper"));
        assert!(grace.matches("grace@navy"));
    }
}
