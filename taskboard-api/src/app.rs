//! Application state and router builder
//!
//! This module defines the shared application state and provides
//! a function to build the Axum router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskboard_api::{app::AppState, config::Config};
//! use taskboard_shared::mailer::LogMailer;
//! use taskboard_shared::remote::MemoryBackend;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let state = AppState::new(Arc::new(MemoryBackend::new()), Arc::new(LogMailer), config);
//! let app = taskboard_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::sessions::{ClientSession, SessionRegistry, SharedSession};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use taskboard_shared::api::Api;
use taskboard_shared::auth::jwt::{self, Claims};
use taskboard_shared::mailer::Mailer;
use taskboard_shared::remote::Connector;
use taskboard_shared::session::AppSession;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Hands out one backend handle per client session
    pub connector: Arc<dyn Connector>,

    /// Delivers assignment mail
    pub mailer: Arc<dyn Mailer>,

    /// Live client sessions
    pub sessions: SessionRegistry,

    /// Application configuration
    pub config: Arc<Config>,
}

/// Token handed to a client after sign-in
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub session_id: Uuid,
    pub token: String,
    pub expires_at: i64,
}

/// The caller's client session, inserted by [`jwt_auth_layer`]
#[derive(Clone)]
pub struct CurrentSession {
    pub id: Uuid,
    pub account_id: String,
    pub session: SharedSession,
}

impl AppState {
    /// Creates new application state
    pub fn new(connector: Arc<dyn Connector>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        Self {
            connector,
            mailer,
            sessions: SessionRegistry::new(),
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// A fresh, not yet signed-in application session
    pub fn new_app_session(&self) -> AppSession {
        AppSession::new(Api::new(self.connector.connect(), self.mailer.clone()))
    }

    /// Registers a signed-in session and signs a token naming it
    pub async fn issue_token(&self, app: AppSession) -> ApiResult<IssuedToken> {
        let account_id = app.require_user()?.id.clone();
        let session_id = Uuid::new_v4();
        let claims = Claims::new(account_id, session_id);
        let token = jwt::create_token(&claims, self.jwt_secret())?;

        self.sessions
            .insert(session_id, ClientSession::new(app), claims.exp)
            .await;

        tracing::info!(session_id = %session_id, account_id = %claims.sub, "Client session opened");

        Ok(IssuedToken {
            session_id,
            token,
            expires_at: claims.exp,
        })
    }

    /// Resolves the Bearer token in `headers` to a live session
    ///
    /// `Ok(None)` when no Authorization header is present.
    pub async fn resolve_session(&self, headers: &HeaderMap) -> ApiResult<Option<CurrentSession>> {
        let Some(auth_header) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        else {
            return Ok(None);
        };

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

        let claims = jwt::validate_token(token, self.jwt_secret())?;

        let session = self
            .sessions
            .get(&claims.sid)
            .await
            .ok_or_else(|| ApiError::Unauthorized("Session has ended".to_string()))?;

        Ok(Some(CurrentSession {
            id: claims.sid,
            account_id: claims.sub,
            session,
        }))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /auth/                       # register, login, magic-link, verify (public)
///     │   ├── POST /logout             # (authenticated)
///     │   └── GET  /me                 # (authenticated)
///     ├── /navigation?path=            # Route guard (token optional)
///     ├── /projects                    # Dashboard, boards, tasks (authenticated)
///     ├── /users                       # User directory (authenticated)
///     ├── /assignees/suggest           # @mention lookup (authenticated)
///     ├── /notifications               # Notification centre (authenticated)
///     └── /notices                     # Pending notices (authenticated)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/magic-link", post(routes::auth::request_magic_link))
        .route("/verify", post(routes::auth::verify));

    let session_auth_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Everything a signed-in client does
    let protected_routes = Router::new()
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:id",
            get(routes::projects::get_board).delete(routes::projects::delete_project),
        )
        .route("/projects/:id/tasks", post(routes::tasks::create_task))
        .route("/projects/:id/tasks/:task_id", delete(routes::tasks::delete_task))
        .route("/projects/:id/board/drag", post(routes::board::begin_drag))
        .route("/projects/:id/board/drop", post(routes::board::drop_task))
        .route("/users", get(routes::users::list_users))
        .route("/assignees/suggest", post(routes::users::suggest_assignees))
        .route("/notifications", get(routes::notifications::list_notifications))
        .route("/notifications/refresh", post(routes::notifications::refresh))
        .route("/notifications/read-all", post(routes::notifications::mark_all_read))
        .route("/notifications/:id/read", post(routes::notifications::mark_read))
        .route("/notifications/:id/open", post(routes::notifications::open))
        .route("/notices", get(routes::notices::drain_notices))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(session_auth_routes))
        .route("/navigation", get(routes::navigation::check_route))
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the JWT from the Authorization header, resolves
/// its `sid` claim to a live client session, then injects
/// [`CurrentSession`] into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current = state
        .resolve_session(req.headers())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}
