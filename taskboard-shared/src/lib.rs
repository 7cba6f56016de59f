//! # Taskboard Shared Library
//!
//! Client-side core of Taskboard: typed access to the hosted backend and
//! the state holders a front end drives (session, board, notifications,
//! assignee lookup, dashboard).
//!
//! ## Module Organization
//!
//! - `remote`: backend traits plus the REST and in-memory implementations
//! - `api`: one wrapper per remote operation, with logging and degradation
//! - `models`: project, task, user, notification and account documents
//! - `session`: per-client application state with init/teardown
//! - `board`: status columns, drag gating and optimistic moves
//! - `notifications`: notification centre with unread counter
//! - `mention`: `@mention` assignee lookup
//! - `dashboard`: project summaries with per-status counts
//! - `navigation`: routes and the route guard
//! - `notice`: transient user-facing notices
//! - `mailer`: assignment mail delivery
//! - `auth`: client session tokens
//! - `config`: backend configuration
//! - `ids`: client-side document ids

pub mod api;
pub mod auth;
pub mod board;
pub mod config;
pub mod dashboard;
pub mod ids;
pub mod mailer;
pub mod mention;
pub mod models;
pub mod navigation;
pub mod notice;
pub mod notifications;
pub mod remote;
pub mod session;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
