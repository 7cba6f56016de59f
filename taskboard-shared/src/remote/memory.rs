//! In-process backend
//!
//! Implements [`DocumentStore`] and [`AccountService`] over plain maps, for
//! tests and for running the API server without a hosted backend
//! (`TASKBOARD_BACKEND=memory`).
//!
//! Handles created by [`MemoryBackend::connect`](Connector::connect) share
//! the stored data but each carries its own account session, mirroring how
//! separate browser sessions see one backend.
//!
//! # Failure Injection
//!
//! [`MemoryBackend::fail_next`] makes the next matching calls fail with a
//! 503, which is how tests exercise rollback and degradation paths.
//! Every call is recorded; [`MemoryBackend::calls`] returns the log.
//!
//! # Example
//!
//! ```
//! use taskboard_shared::remote::{Collection, DocumentStore, MemoryBackend, Operation};
//! use serde_json::json;
//!
//! # async fn example() {
//! let backend = MemoryBackend::new();
//! backend.fail_next(Operation::Update, Collection::Tasks, 1);
//!
//! backend.create_document(Collection::Tasks, "t1", json!({"title": "x"})).await.unwrap();
//! assert!(backend.update_document(Collection::Tasks, "t1", json!({})).await.is_err());
//! # }
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::query;
use super::{
    AccountService, Backend, Collection, Connector, DocumentStore, Query, RemoteError, RemoteResult,
};
use crate::ids::unique_id;
use crate::models::{Account, MagicToken, SessionInfo};

/// Kind of remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Get,
    Update,
    Delete,
    List,
}

/// One recorded document call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub collection: Collection,
    pub document_id: Option<String>,
}

struct StoredAccount {
    account: Account,
    password: String,
}

struct FailureRule {
    operation: Operation,
    collection: Collection,
    remaining: usize,
}

#[derive(Default)]
struct Data {
    documents: HashMap<Collection, Vec<Value>>,
    accounts: Vec<StoredAccount>,
    sessions: HashMap<String, String>,
    magic_secrets: HashMap<String, String>,
    failures: Vec<FailureRule>,
    calls: Vec<Call>,
}

impl Data {
    fn collection(&mut self, collection: Collection) -> &mut Vec<Value> {
        self.documents.entry(collection).or_default()
    }

    fn account_by_email(&self, email: &str) -> Option<&StoredAccount> {
        self.accounts
            .iter()
            .find(|stored| stored.account.email.eq_ignore_ascii_case(email))
    }

    /// Records the call and consumes a matching failure rule, if any
    fn enter(&mut self, operation: Operation, collection: Collection, document_id: Option<&str>) -> RemoteResult<()> {
        self.calls.push(Call {
            operation,
            collection,
            document_id: document_id.map(str::to_string),
        });

        let rule = self
            .failures
            .iter_mut()
            .find(|rule| rule.operation == operation && rule.collection == collection && rule.remaining > 0);

        match rule {
            Some(rule) => {
                rule.remaining -= 1;
                Err(RemoteError::service(
                    503,
                    "general_service_disabled",
                    format!("Injected {:?} failure on {}", operation, collection),
                ))
            }
            None => Ok(()),
        }
    }
}

fn document_id(document: &Value) -> Option<&str> {
    document.get("$id").and_then(Value::as_str)
}

fn document_not_found(document_id: &str) -> RemoteError {
    RemoteError::not_found(
        "document_not_found",
        format!("Document with the requested ID '{}' could not be found.", document_id),
    )
}

fn guest_error() -> RemoteError {
    RemoteError::unauthorized("User (role: guests) missing scope (account)")
}

/// In-process backend handle
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<Mutex<Data>>,
    session: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle over the same data with its own (empty) account session
    pub fn fresh_session(&self) -> Self {
        Self {
            data: self.data.clone(),
            session: Arc::new(Mutex::new(None)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn session_id(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_session(&self, session_id: Option<String>) {
        *self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session_id;
    }

    /// Makes the next `times` matching calls fail
    pub fn fail_next(&self, operation: Operation, collection: Collection, times: usize) {
        self.lock().failures.push(FailureRule {
            operation,
            collection,
            remaining: times,
        });
    }

    /// Every document call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls of one kind
    pub fn count_calls(&self, operation: Operation, collection: Collection) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation && call.collection == collection)
            .count()
    }

    /// Snapshot of a collection's documents
    pub fn documents(&self, collection: Collection) -> Vec<Value> {
        self.lock()
            .documents
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// The magic-URL secret the service would have mailed to `email`
    pub fn magic_secret_for(&self, email: &str) -> Option<(String, String)> {
        let data = self.lock();
        let stored = data.account_by_email(email)?;
        let secret = data.magic_secrets.get(&stored.account.id)?;
        Some((stored.account.id.clone(), secret.clone()))
    }

    /// Removes an account, as an administrator would from the console
    ///
    /// Sessions of the account stay open but resolve to no account.
    pub fn remove_account(&self, user_id: &str) {
        self.lock()
            .accounts
            .retain(|stored| stored.account.id != user_id);
    }

    fn open_session(&self, data: &mut Data, user_id: &str) -> SessionInfo {
        let session_id = unique_id();
        data.sessions.insert(session_id.clone(), user_id.to_string());
        self.set_session(Some(session_id.clone()));

        SessionInfo {
            id: session_id,
            user_id: user_id.to_string(),
            expire: None,
        }
    }
}

impl Connector for MemoryBackend {
    fn connect(&self) -> Arc<dyn Backend> {
        Arc::new(self.fresh_session())
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create_document(
        &self,
        collection: Collection,
        document_id: &str,
        data: Value,
    ) -> RemoteResult<Value> {
        let mut store = self.lock();
        store.enter(Operation::Create, collection, Some(document_id))?;

        let Value::Object(fields) = data else {
            return Err(RemoteError::service(
                400,
                "document_invalid_structure",
                "Document data must be an object",
            ));
        };

        let documents = store.collection(collection);
        if documents.iter().any(|doc| document_id_eq(doc, document_id)) {
            return Err(RemoteError::service(
                409,
                "document_already_exists",
                "Document with the requested ID already exists.",
            ));
        }

        let mut document = Map::new();
        document.insert("$id".to_string(), Value::String(document_id.to_string()));
        document.insert(
            "$collectionId".to_string(),
            Value::String(collection.as_str().to_string()),
        );
        document.extend(fields);

        let document = Value::Object(document);
        documents.push(document.clone());
        Ok(document)
    }

    async fn get_document(&self, collection: Collection, document_id: &str) -> RemoteResult<Value> {
        let mut store = self.lock();
        store.enter(Operation::Get, collection, Some(document_id))?;

        store
            .collection(collection)
            .iter()
            .find(|doc| document_id_eq(doc, document_id))
            .cloned()
            .ok_or_else(|| document_not_found(document_id))
    }

    async fn update_document(
        &self,
        collection: Collection,
        document_id: &str,
        data: Value,
    ) -> RemoteResult<Value> {
        let mut store = self.lock();
        store.enter(Operation::Update, collection, Some(document_id))?;

        let document = store
            .collection(collection)
            .iter_mut()
            .find(|doc| document_id_eq(doc, document_id))
            .ok_or_else(|| document_not_found(document_id))?;

        if let (Value::Object(target), Value::Object(changes)) = (&mut *document, data) {
            for (key, value) in changes {
                target.insert(key, value);
            }
        }

        Ok(document.clone())
    }

    async fn delete_document(&self, collection: Collection, document_id: &str) -> RemoteResult<()> {
        let mut store = self.lock();
        store.enter(Operation::Delete, collection, Some(document_id))?;

        let documents = store.collection(collection);
        let before = documents.len();
        documents.retain(|doc| !document_id_eq(doc, document_id));

        if documents.len() == before {
            return Err(document_not_found(document_id));
        }
        Ok(())
    }

    async fn list_documents(&self, collection: Collection, queries: &[Query]) -> RemoteResult<Vec<Value>> {
        let mut store = self.lock();
        store.enter(Operation::List, collection, None)?;

        let documents = store.collection(collection).clone();
        Ok(query::apply(queries, documents))
    }
}

fn document_id_eq(document: &Value, id: &str) -> bool {
    document_id(document) == Some(id)
}

#[async_trait]
impl AccountService for MemoryBackend {
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> RemoteResult<Account> {
        let mut data = self.lock();

        if data.account_by_email(email).is_some()
            || data.accounts.iter().any(|stored| stored.account.id == user_id)
        {
            return Err(RemoteError::service(
                409,
                "user_already_exists",
                "A user with the same id, email, or phone already exists in this project.",
            ));
        }

        if password.len() < 8 {
            return Err(RemoteError::service(
                400,
                "general_argument_invalid",
                "Invalid `password` param: Password must be at least 8 characters",
            ));
        }

        let account = Account {
            id: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            email_verification: false,
        };

        data.accounts.push(StoredAccount {
            account: account.clone(),
            password: password.to_string(),
        });

        Ok(account)
    }

    async fn create_email_session(&self, email: &str, password: &str) -> RemoteResult<SessionInfo> {
        let mut data = self.lock();

        let user_id = match data.account_by_email(email) {
            Some(stored) if stored.password == password => stored.account.id.clone(),
            _ => {
                return Err(RemoteError::service(
                    401,
                    "user_invalid_credentials",
                    "Invalid credentials. Please check the email and password.",
                ))
            }
        };

        Ok(self.open_session(&mut data, &user_id))
    }

    async fn delete_current_session(&self) -> RemoteResult<()> {
        let session_id = self.session_id().ok_or_else(guest_error)?;
        self.lock().sessions.remove(&session_id);
        self.set_session(None);
        Ok(())
    }

    async fn current_account(&self) -> RemoteResult<Account> {
        let session_id = self.session_id().ok_or_else(guest_error)?;
        let data = self.lock();

        let user_id = data.sessions.get(&session_id).ok_or_else(guest_error)?;
        data.accounts
            .iter()
            .find(|stored| &stored.account.id == user_id)
            .map(|stored| stored.account.clone())
            .ok_or_else(guest_error)
    }

    async fn create_magic_url_token(&self, user_id: &str, email: &str, _url: &str) -> RemoteResult<MagicToken> {
        let mut data = self.lock();

        let account_id = match data.account_by_email(email) {
            Some(stored) => stored.account.id.clone(),
            None => {
                data.accounts.push(StoredAccount {
                    account: Account {
                        id: user_id.to_string(),
                        name: String::new(),
                        email: email.to_string(),
                        email_verification: false,
                    },
                    password: String::new(),
                });
                user_id.to_string()
            }
        };

        let secret = unique_id();
        data.magic_secrets.insert(account_id.clone(), secret.clone());

        Ok(MagicToken {
            id: unique_id(),
            user_id: account_id,
            secret: Some(secret),
        })
    }

    async fn complete_magic_url_session(&self, user_id: &str, secret: &str) -> RemoteResult<SessionInfo> {
        let mut data = self.lock();

        if data.magic_secrets.get(user_id).map(String::as_str) != Some(secret) {
            return Err(RemoteError::service(
                401,
                "user_invalid_token",
                "Invalid token passed in the request.",
            ));
        }
        data.magic_secrets.remove(user_id);

        if let Some(stored) = data
            .accounts
            .iter_mut()
            .find(|stored| stored.account.id == user_id)
        {
            stored.account.email_verification = true;
        }

        Ok(self.open_session(&mut data, user_id))
    }
}
