//! Remote data service boundary
//!
//! All persistence, querying and account management is delegated to a
//! hosted backend. This module defines the capability the rest of the
//! crate needs from it, as two async traits:
//!
//! - [`DocumentStore`]: create/read/update/delete/list over the four
//!   collections, with equality, descending-order and search queries
//! - [`AccountService`]: account creation, email/password sessions, the
//!   current-session lookup and the magic-URL token flow
//!
//! # Implementations
//!
//! - [`AppwriteClient`]: REST client for an Appwrite-compatible endpoint
//! - [`MemoryBackend`]: in-process store with failure injection
//!
//! A [`Connector`] hands out one backend handle per client session, so
//! each signed-in session keeps its own account session.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::models::{Account, MagicToken, SessionInfo};

pub mod appwrite;
pub mod error;
pub mod memory;
pub mod query;

pub use appwrite::{AppwriteClient, AppwriteConnector};
pub use error::{RemoteError, RemoteResult};
pub use memory::{Call, MemoryBackend, Operation};
pub use query::Query;

/// Page size used when listing every document of a query
pub const LIST_PAGE_SIZE: usize = 100;

/// Collections the application reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Projects,
    Tasks,
    Users,
    Notifications,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Projects,
        Collection::Tasks,
        Collection::Users,
        Collection::Notifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Tasks => "tasks",
            Collection::Users => "users",
            Collection::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document operations over the configured collections
///
/// Documents are passed as raw JSON objects; typed decoding happens in the
/// wrapper layer.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a document under a caller-chosen id
    async fn create_document(
        &self,
        collection: Collection,
        document_id: &str,
        data: Value,
    ) -> RemoteResult<Value>;

    /// Fetches one document
    async fn get_document(&self, collection: Collection, document_id: &str) -> RemoteResult<Value>;

    /// Merges `data` into an existing document
    async fn update_document(
        &self,
        collection: Collection,
        document_id: &str,
        data: Value,
    ) -> RemoteResult<Value>;

    /// Deletes one document
    async fn delete_document(&self, collection: Collection, document_id: &str) -> RemoteResult<()>;

    /// Lists one page of the documents matching every query
    ///
    /// Without a [`Query::Limit`] the service returns at most
    /// [`query::DEFAULT_PAGE_SIZE`] documents.
    async fn list_documents(&self, collection: Collection, queries: &[Query]) -> RemoteResult<Vec<Value>>;

    /// Lists every matching document, following `cursorAfter` page by page
    async fn list_all_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> RemoteResult<Vec<Value>> {
        let mut documents = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut page_queries = queries.to_vec();
            page_queries.push(Query::limit(LIST_PAGE_SIZE));
            if let Some(cursor) = &cursor {
                page_queries.push(Query::cursor_after(cursor.clone()));
            }

            let page = self.list_documents(collection, &page_queries).await?;
            let full = page.len() >= LIST_PAGE_SIZE;
            if full {
                let last = page
                    .last()
                    .and_then(|document| document.get("$id"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| RemoteError::Decode("listed document without an $id".to_string()))?;
                cursor = Some(last.to_string());
            }

            documents.extend(page);
            if !full {
                return Ok(documents);
            }
        }
    }
}

/// Account resource of the backend
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Registers a new account
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> RemoteResult<Account>;

    /// Signs in with email and password
    async fn create_email_session(&self, email: &str, password: &str) -> RemoteResult<SessionInfo>;

    /// Signs out of the current session
    async fn delete_current_session(&self) -> RemoteResult<()>;

    /// Returns the account of the current session
    ///
    /// Anonymous callers get an error whose status is 401.
    async fn current_account(&self) -> RemoteResult<Account>;

    /// Starts the magic-URL flow; the service mails a link to `url`
    async fn create_magic_url_token(&self, user_id: &str, email: &str, url: &str) -> RemoteResult<MagicToken>;

    /// Completes the magic-URL flow, creating a session
    async fn complete_magic_url_session(&self, user_id: &str, secret: &str) -> RemoteResult<SessionInfo>;
}

/// Everything a client session needs from the backend
pub trait Backend: DocumentStore + AccountService {}

impl<T: DocumentStore + AccountService> Backend for T {}

/// Hands out backend handles, one per client session
pub trait Connector: Send + Sync {
    fn connect(&self) -> Arc<dyn Backend>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        let names: Vec<&str> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["projects", "tasks", "users", "notifications"]);
    }
}
