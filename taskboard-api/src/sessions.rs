//! Server-side client sessions
//!
//! Each signed-in client owns one [`ClientSession`]: its own backend handle
//! wrapped in an [`AppSession`], plus the boards it has opened. Sessions live
//! in the [`SessionRegistry`] under the id carried in the client's token
//! (`sid` claim) and are dropped on logout or once the token has expired.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use taskboard_shared::api::Api;
use taskboard_shared::board::BoardController;
use taskboard_shared::notice::Notices;
use taskboard_shared::session::AppSession;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// A client session behind its lock
pub type SharedSession = Arc<Mutex<ClientSession>>;

/// State kept for one client
pub struct ClientSession {
    pub app: AppSession,

    /// Opened boards by project id
    pub boards: HashMap<String, BoardController>,
}

/// Borrowed pieces needed to act on a board
pub struct BoardHandle<'a> {
    pub api: Api,
    pub board: &'a mut BoardController,
    pub notices: &'a mut Notices,
}

impl ClientSession {
    pub fn new(app: AppSession) -> Self {
        Self {
            app,
            boards: HashMap::new(),
        }
    }

    pub fn api(&self) -> Api {
        self.app.api().clone()
    }

    /// Loads a board from the backend, replacing any cached copy
    pub async fn open_board(&mut self, project_id: &str) -> ApiResult<&BoardController> {
        let viewer = self.app.require_user()?.id.clone();
        let board = BoardController::load(self.app.api(), project_id, &viewer).await?;
        self.boards.insert(project_id.to_string(), board);

        self.boards
            .get(project_id)
            .ok_or_else(|| ApiError::NotFound(format!("Project not found: {}", project_id)))
    }

    /// The cached board of `project_id`, loading it on first use
    pub async fn board(&mut self, project_id: &str) -> ApiResult<BoardHandle<'_>> {
        if !self.boards.contains_key(project_id) {
            self.open_board(project_id).await?;
        }

        let api = self.api();
        let ClientSession { app, boards } = self;
        let board = boards
            .get_mut(project_id)
            .ok_or_else(|| ApiError::NotFound(format!("Project not found: {}", project_id)))?;

        Ok(BoardHandle {
            api,
            board,
            notices: app.notices_mut(),
        })
    }

    pub fn close_board(&mut self, project_id: &str) {
        self.boards.remove(project_id);
    }

    /// Clears application state and every opened board
    pub fn teardown(&mut self) {
        self.app.teardown();
        self.boards.clear();
    }
}

struct Entry {
    session: SharedSession,
    expires_at: i64,
}

/// Client sessions by id
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a session until `expires_at` (Unix timestamp)
    ///
    /// Expired sessions are evicted on the way.
    pub async fn insert(&self, id: Uuid, session: ClientSession, expires_at: i64) -> SharedSession {
        let shared = Arc::new(Mutex::new(session));
        let now = Utc::now().timestamp();

        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        if sessions.len() < before {
            tracing::debug!(evicted = before - sessions.len(), "Expired client sessions evicted");
        }

        sessions.insert(
            id,
            Entry {
                session: shared.clone(),
                expires_at,
            },
        );
        shared
    }

    /// Live session by id
    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let sessions = self.inner.read().await;
        sessions
            .get(id)
            .filter(|entry| entry.expires_at > Utc::now().timestamp())
            .map(|entry| entry.session.clone())
    }

    pub async fn remove(&self, id: &Uuid) -> Option<SharedSession> {
        self.inner.write().await.remove(id).map(|entry| entry.session)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
