//! Common test utilities for integration tests
//!
//! Builds the router over an in-memory backend and drives it request by
//! request with `tower::ServiceExt`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, Config, JwtConfig};
use taskboard_shared::config::{BackendConfig, BackendKind};
use taskboard_shared::mailer::LogMailer;
use taskboard_shared::remote::MemoryBackend;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

/// Test context containing all necessary resources
pub struct TestContext {
    pub backend: MemoryBackend,
    pub state: AppState,
    pub app: axum::Router,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                app_url: "http://localhost:3000".to_string(),
            },
            backend: BackendConfig {
                kind: BackendKind::Memory,
                ..BackendConfig::default()
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
        };

        let backend = MemoryBackend::new();
        let state = AppState::new(Arc::new(backend.clone()), Arc::new(LogMailer), config);
        let app = build_router(state.clone());

        Self { backend, state, app }
    }

    /// Sends one request; the body is `Null` when the response has none
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("{} {} returned non-JSON body: {}", method, uri, String::from_utf8_lossy(&bytes))
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }

    pub async fn register(&self, name: &str, email: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": PASSWORD })),
        )
        .await
    }

    pub async fn login(&self, email: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        )
        .await
    }

    /// Registers and signs in, returning the bearer token
    pub async fn signed_in(&self, name: &str, email: &str) -> String {
        let (status, body) = self.register(name, email).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let (status, body) = self.login(email).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        body["token"].as_str().unwrap().to_string()
    }

    /// Creates a project and returns its id
    pub async fn create_project(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .post("/v1/projects", token, json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);
        body["$id"].as_str().unwrap().to_string()
    }

    /// Creates a task and returns its id
    pub async fn create_task(&self, token: &str, project_id: &str, body: Value) -> String {
        let (status, body) = self
            .post(&format!("/v1/projects/{}/tasks", project_id), token, body)
            .await;
        assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);
        body["$id"].as_str().unwrap().to_string()
    }
}

/// Finds the column with `id` in a board view
pub fn column<'a>(board: &'a Value, id: &str) -> &'a Value {
    board["columns"]
        .as_array()
        .unwrap()
        .iter()
        .find(|column| column["id"] == id)
        .unwrap()
}
