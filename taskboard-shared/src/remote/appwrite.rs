//! REST client for an Appwrite-compatible backend
//!
//! Each [`AppwriteClient`] carries one account session. The service hands
//! the session back in the `X-Fallback-Cookies` response header; the client
//! keeps the latest value and replays it on every request, the same way a
//! browser without third-party cookies would.
//!
//! # Endpoints
//!
//! ```text
//! POST   /account                                   create account
//! GET    /account                                   current account
//! POST   /account/sessions/email                    email/password session
//! DELETE /account/sessions/current                  sign out
//! POST   /account/tokens/magic-url                  start magic-URL flow
//! PUT    /account/sessions/magic-url                complete magic-URL flow
//! POST   /databases/{db}/collections/{c}/documents  create document
//! GET    /databases/{db}/collections/{c}/documents  list documents
//! GET    /databases/{db}/collections/{c}/documents/{id}
//! PATCH  /databases/{db}/collections/{c}/documents/{id}
//! DELETE /databases/{db}/collections/{c}/documents/{id}
//! ```

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};

use super::error::ErrorBody;
use super::{
    AccountService, Backend, Collection, Connector, DocumentStore, Query, RemoteError, RemoteResult,
};
use crate::config::BackendConfig;
use crate::models::{Account, MagicToken, SessionInfo};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const FALLBACK_COOKIES_HEADER: &str = "X-Fallback-Cookies";

/// Backend handle bound to one account session
pub struct AppwriteClient {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
    fallback_cookies: RwLock<Option<String>>,
}

impl AppwriteClient {
    /// Creates a client with its own connection pool
    pub fn new(config: BackendConfig) -> Self {
        Self::with_http(reqwest::Client::new(), Arc::new(config))
    }

    /// Creates a client sharing an existing connection pool
    pub fn with_http(http: reqwest::Client, config: Arc<BackendConfig>) -> Self {
        Self {
            http,
            config,
            fallback_cookies: RwLock::new(None),
        }
    }

    /// Absolute URL of an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// Path of a collection's documents
    pub fn documents_path(&self, collection: Collection) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.config.database_id,
            self.config.collections.id_of(collection)
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(PROJECT_HEADER, &self.config.project_id);

        if let Some(cookies) = self.session_cookies() {
            builder = builder.header(FALLBACK_COOKIES_HEADER, cookies);
        }

        builder
    }

    fn session_cookies(&self) -> Option<String> {
        self.fallback_cookies
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn store_session_cookies(&self, value: Option<String>) {
        if let Ok(mut guard) = self.fallback_cookies.write() {
            *guard = value;
        }
    }

    /// Sends a request and returns the JSON body
    async fn send(&self, builder: RequestBuilder) -> RemoteResult<Value> {
        let response = builder.send().await?;
        let status = response.status();

        if let Some(cookies) = response
            .headers()
            .get(FALLBACK_COOKIES_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            self.store_session_cookies(Some(cookies.to_string()));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let text = response.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn send_as<T: DeserializeOwned>(&self, builder: RequestBuilder) -> RemoteResult<T> {
        let value = self.send(builder).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Builds the error for a non-success answer
fn error_from_body(status: StatusCode, body: &str) -> RemoteError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => RemoteError::Service {
            code: if parsed.code == 0 { status.as_u16() } else { parsed.code },
            kind: if parsed.kind.is_empty() {
                "general_unknown".to_string()
            } else {
                parsed.kind
            },
            message: parsed.message,
        },
        Err(_) => RemoteError::service(
            status.as_u16(),
            "general_unknown",
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn create_document(
        &self,
        collection: Collection,
        document_id: &str,
        data: Value,
    ) -> RemoteResult<Value> {
        let path = self.documents_path(collection);
        self.send(self.request(Method::POST, &path).json(&json!({
            "documentId": document_id,
            "data": data,
        })))
        .await
    }

    async fn get_document(&self, collection: Collection, document_id: &str) -> RemoteResult<Value> {
        let path = format!("{}/{}", self.documents_path(collection), document_id);
        self.send(self.request(Method::GET, &path)).await
    }

    async fn update_document(
        &self,
        collection: Collection,
        document_id: &str,
        data: Value,
    ) -> RemoteResult<Value> {
        let path = format!("{}/{}", self.documents_path(collection), document_id);
        self.send(self.request(Method::PATCH, &path).json(&json!({ "data": data })))
            .await
    }

    async fn delete_document(&self, collection: Collection, document_id: &str) -> RemoteResult<()> {
        let path = format!("{}/{}", self.documents_path(collection), document_id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn list_documents(&self, collection: Collection, queries: &[Query]) -> RemoteResult<Vec<Value>> {
        let path = self.documents_path(collection);
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|query| ("queries[]", query.to_wire()))
            .collect();

        let body = self
            .send(self.request(Method::GET, &path).query(&params))
            .await?;

        match body.get("documents") {
            Some(Value::Array(documents)) => Ok(documents.clone()),
            _ => Err(RemoteError::Decode(
                "document list without a documents array".to_string(),
            )),
        }
    }
}

#[async_trait]
impl AccountService for AppwriteClient {
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> RemoteResult<Account> {
        self.send_as(self.request(Method::POST, "/account").json(&json!({
            "userId": user_id,
            "email": email,
            "password": password,
            "name": name,
        })))
        .await
    }

    async fn create_email_session(&self, email: &str, password: &str) -> RemoteResult<SessionInfo> {
        self.send_as(
            self.request(Method::POST, "/account/sessions/email")
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn delete_current_session(&self) -> RemoteResult<()> {
        self.send(self.request(Method::DELETE, "/account/sessions/current"))
            .await?;
        self.store_session_cookies(None);
        Ok(())
    }

    async fn current_account(&self) -> RemoteResult<Account> {
        self.send_as(self.request(Method::GET, "/account")).await
    }

    async fn create_magic_url_token(&self, user_id: &str, email: &str, url: &str) -> RemoteResult<MagicToken> {
        self.send_as(self.request(Method::POST, "/account/tokens/magic-url").json(&json!({
            "userId": user_id,
            "email": email,
            "url": url,
        })))
        .await
    }

    async fn complete_magic_url_session(&self, user_id: &str, secret: &str) -> RemoteResult<SessionInfo> {
        self.send_as(
            self.request(Method::PUT, "/account/sessions/magic-url")
                .json(&json!({ "userId": user_id, "secret": secret })),
        )
        .await
    }
}

/// Hands out one [`AppwriteClient`] per client session over a shared pool
#[derive(Clone)]
pub struct AppwriteConnector {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
}

impl AppwriteConnector {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }
}

impl Connector for AppwriteConnector {
    fn connect(&self) -> Arc<dyn Backend> {
        Arc::new(AppwriteClient::with_http(
            self.http.clone(),
            self.config.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectionIds;

    fn client() -> AppwriteClient {
        AppwriteClient::new(BackendConfig {
            endpoint: "https://backend.example.com/v1/".to_string(),
            project_id: "taskboard".to_string(),
            database_id: "main".to_string(),
            collections: CollectionIds {
                projects: "projects-col".to_string(),
                tasks: "tasks-col".to_string(),
                users: "users-col".to_string(),
                notifications: "notifications-col".to_string(),
            },
            ..BackendConfig::default()
        })
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        assert_eq!(
            client().url("/account"),
            "https://backend.example.com/v1/account"
        );
    }

    #[test]
    fn test_documents_path_uses_configured_ids() {
        assert_eq!(
            client().documents_path(Collection::Tasks),
            "/databases/main/collections/tasks-col/documents"
        );
    }

    #[test]
    fn test_error_from_service_body() {
        let err = error_from_body(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"User (role: guests) missing scope (account)","code":401,"type":"general_unauthorized_scope"}"#,
        );
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_error_from_unparseable_body() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_session_cookies_round_trip() {
        let client = client();
        assert!(client.session_cookies().is_none());
        client.store_session_cookies(Some("{\"a_session\":\"x\"}".to_string()));
        assert_eq!(
            client.session_cookies().as_deref(),
            Some("{\"a_session\":\"x\"}")
        );
    }
}
