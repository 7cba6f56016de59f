//! API wrapper layer
//!
//! One method per remote operation. The wrappers shape parameters, stamp
//! timestamps and ids, decode documents into typed models, and log
//! failures. They follow three error patterns:
//!
//! - list/query wrappers degrade to an empty result and log the error
//! - create/update/delete wrappers log and propagate the error
//! - the current-account lookup returns `None`, logging only failures that
//!   are not authorization failures (anonymous visitors are expected)
//!
//! A handful of lookups that callers rely on for correctness (the task
//! listing used by project deletion, the unread listing used by mark-all)
//! propagate instead of degrading.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskboard_shared::api::Api;
//! use taskboard_shared::models::NewProject;
//! use taskboard_shared::remote::MemoryBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Api::with_log_mailer(Arc::new(MemoryBackend::new()));
//! api.sign_in("ada@example.com", "password123").await?;
//!
//! let project = api
//!     .create_project(&NewProject { name: "Launch".into(), description: String::new() })
//!     .await?;
//! let tasks = api.project_tasks(&project.id).await;
//! # Ok(())
//! # }
//! ```

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::mailer::{LogMailer, Mailer};
use crate::remote::{Backend, RemoteResult};

mod account;
mod notifications;
mod projects;
mod tasks;
mod users;

pub use notifications::MarkAllReport;
pub use tasks::clean_assignees;

/// Typed access to the remote service for one client session
#[derive(Clone)]
pub struct Api {
    backend: Arc<dyn Backend>,
    mailer: Arc<dyn Mailer>,
}

impl Api {
    pub fn new(backend: Arc<dyn Backend>, mailer: Arc<dyn Mailer>) -> Self {
        Self { backend, mailer }
    }

    /// Wrapper whose assignment mail only goes to the log
    pub fn with_log_mailer(backend: Arc<dyn Backend>) -> Self {
        Self::new(backend, Arc::new(LogMailer))
    }

    /// The underlying backend handle
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }
}

/// Current time in the layout stored on documents
///
/// Millisecond precision with a `Z` suffix keeps stored timestamps equal
/// in length, so they sort lexically in time order.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Adds fields to a JSON object
fn with_fields(mut data: Value, fields: Vec<(&str, Value)>) -> Value {
    if let Value::Object(map) = &mut data {
        for (key, value) in fields {
            map.insert(key.to_string(), value);
        }
    }
    data
}

fn decode<T: DeserializeOwned>(document: Value) -> RemoteResult<T> {
    Ok(serde_json::from_value(document)?)
}

fn decode_all<T: DeserializeOwned>(documents: Vec<Value>) -> RemoteResult<Vec<T>> {
    documents.into_iter().map(decode).collect()
}
