//! Application session state
//!
//! An [`AppSession`] is the state one signed-in client sees: the current
//! account, whether the session check has finished, the notification
//! centre, and the queue of pending notices. It is an explicit object with
//! [`init`](AppSession::init) and [`teardown`](AppSession::teardown); the
//! API server keeps one per client session.
//!
//! # Lifecycle
//!
//! ```text
//!            init() ── account found ──▶ Authenticated ── logout() ──▶ Anonymous
//! Checking ──┤                               ▲
//!            └─ no account ──▶ Anonymous ── login() / verify_magic_link()
//! ```

use crate::api::{Api, MarkAllReport};
use crate::models::Account;
use crate::navigation::{guard, AuthState, Guard, Route};
use crate::notice::{Notice, Notices};
use crate::notifications::{NotificationCenter, NotificationError};
use crate::remote::RemoteError;

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Not signed in")]
    NotAuthenticated,

    /// A session was created but the account could not be read back
    #[error("Failed to get user after login")]
    AccountMissing,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Magic-link verification errors
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The link lacks the user id or the secret
    #[error("Invalid verification link - missing parameters")]
    InvalidLink,

    /// The service rejected the secret
    #[error("Verification link has expired or is invalid")]
    LinkExpired,

    #[error("Failed to verify email: {0}")]
    Failed(RemoteError),

    /// The link was accepted but no signed-in account came back
    #[error("Verified session could not be loaded")]
    SessionMissing,
}

/// State of one client session
pub struct AppSession {
    api: Api,
    user: Option<Account>,
    auth: AuthState,
    notifications: NotificationCenter,
    notices: Notices,
}

impl AppSession {
    /// A session whose check has not run yet
    pub fn new(api: Api) -> Self {
        Self {
            api,
            user: None,
            auth: AuthState::Checking,
            notifications: NotificationCenter::new(),
            notices: Notices::new(),
        }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn user(&self) -> Option<&Account> {
        self.user.as_ref()
    }

    /// The signed-in account, or an error for anonymous sessions
    pub fn require_user(&self) -> Result<&Account, SessionError> {
        self.user.as_ref().ok_or(SessionError::NotAuthenticated)
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth == AuthState::Authenticated
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Route guard decision for this session
    pub fn guard(&self, route: &Route) -> Guard {
        guard(route, self.auth)
    }

    /// Looks up the current account and loads its notifications
    pub async fn init(&mut self) -> AuthState {
        match self.api.current_user().await {
            Some(account) => self.sign_in_as(account).await,
            None => {
                self.user = None;
                self.auth = AuthState::Anonymous;
            }
        }
        self.auth
    }

    async fn sign_in_as(&mut self, account: Account) {
        tracing::debug!(user_id = %account.id, "Session authenticated");
        self.user = Some(account);
        self.auth = AuthState::Authenticated;
        self.load_notifications().await;
    }

    /// Signs in with email and password
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Route, SessionError> {
        let result = async {
            self.api.sign_in(email, password).await?;
            self.api
                .current_user()
                .await
                .ok_or(SessionError::AccountMissing)
        }
        .await;

        match result {
            Ok(account) => {
                self.sign_in_as(account).await;
                self.notices.success("Successfully signed in!");
                Ok(Route::Dashboard)
            }
            Err(e) => {
                tracing::error!(error = %e, "Login error");
                self.notices
                    .error("Failed to sign in. Please check your credentials.");
                Err(e)
            }
        }
    }

    /// Registers an account; the user signs in afterwards
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Route, SessionError> {
        match self.api.create_user_account(name, email, password).await {
            Ok(_) => {
                self.notices.success("Account created successfully!");
                Ok(Route::SignIn)
            }
            Err(e) => {
                self.notices
                    .error("Failed to create account. Please try again.");
                Err(e.into())
            }
        }
    }

    /// Deletes the current session, then clears local state
    ///
    /// On failure local state is kept.
    pub async fn logout(&mut self) -> Result<Route, SessionError> {
        match self.api.sign_out().await {
            Ok(()) => {
                self.teardown();
                self.notices.success("Signed out successfully");
                Ok(Route::SignIn)
            }
            Err(e) => {
                self.notices.error("Failed to sign out");
                Err(e.into())
            }
        }
    }

    /// Clears user, authentication flag and notifications
    pub fn teardown(&mut self) {
        self.user = None;
        self.auth = AuthState::Anonymous;
        self.notifications.clear();
    }

    /// Sends a magic sign-in/verification link to `email`
    pub async fn request_magic_link(&mut self, email: &str, redirect_url: &str) -> Result<(), SessionError> {
        match self.api.request_magic_link(email, redirect_url).await {
            Ok(_) => {
                self.notices.success("Verification email sent");
                Ok(())
            }
            Err(e) => {
                self.notices
                    .error("Failed to send verification email. Please try again.");
                Err(e.into())
            }
        }
    }

    /// Completes a magic link and initializes the session
    pub async fn verify_magic_link(
        &mut self,
        user_id: Option<&str>,
        secret: Option<&str>,
    ) -> Result<Route, VerificationError> {
        let (Some(user_id), Some(secret)) = (
            user_id.filter(|s| !s.is_empty()),
            secret.filter(|s| !s.is_empty()),
        ) else {
            tracing::error!("Missing userId or secret in verification link");
            self.notices
                .error("Invalid verification link - missing parameters");
            return Err(VerificationError::InvalidLink);
        };

        if let Err(e) = self.api.complete_magic_link(user_id, secret).await {
            if e.status() == Some(401) {
                self.notices.error(
                    "Verification link has expired or is invalid. Please request a new verification email.",
                );
                return Err(VerificationError::LinkExpired);
            }
            self.notices
                .error("Failed to verify your email. Please try again or contact support.");
            return Err(VerificationError::Failed(e));
        }

        if self.init().await != AuthState::Authenticated {
            tracing::error!(user_id = %user_id, "No account after completing magic link");
            self.notices
                .error("Failed to verify your email. Please try again or contact support.");
            return Err(VerificationError::SessionMissing);
        }

        self.notices.success("Email verified successfully!");
        Ok(Route::Dashboard)
    }

    /// Reloads the notification list; anonymous sessions have none
    pub async fn load_notifications(&mut self) {
        if let Some(user) = &self.user {
            self.notifications.load(&self.api, &user.id).await;
        }
    }

    pub async fn mark_notification_read(&mut self, notification_id: &str) -> Result<(), NotificationError> {
        self.notifications
            .mark_read(&self.api, notification_id, &mut self.notices)
            .await
    }

    pub async fn mark_all_notifications_read(&mut self) -> Result<MarkAllReport, NotificationError> {
        let Some(user) = &self.user else {
            return Ok(MarkAllReport {
                attempted: 0,
                failed: 0,
            });
        };

        self.notifications
            .mark_all_read(&self.api, &user.id, &mut self.notices)
            .await
    }

    pub async fn open_notification(&mut self, notification_id: &str) -> Result<Option<Route>, NotificationError> {
        self.notifications
            .open(&self.api, notification_id, &mut self.notices)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewNotification;
    use crate::notice::NoticeLevel;
    use crate::remote::{Collection, MemoryBackend, Operation};
    use std::sync::Arc;

    async fn registered() -> (MemoryBackend, AppSession) {
        let backend = MemoryBackend::new();
        let mut session = AppSession::new(Api::with_log_mailer(Arc::new(backend.clone())));
        session
            .register("Ada", "ada@example.com", "password123")
            .await
            .unwrap();
        session.drain_notices();
        (backend, session)
    }

    #[tokio::test]
    async fn test_init_without_session_is_anonymous() {
        let (_, mut session) = registered().await;
        assert_eq!(session.auth_state(), AuthState::Checking);
        assert_eq!(session.init().await, AuthState::Anonymous);
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_register_does_not_sign_in() {
        let backend = MemoryBackend::new();
        let mut session = AppSession::new(Api::with_log_mailer(Arc::new(backend)));

        let route = session
            .register("Ada", "ada@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(route, Route::SignIn);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_loads_notifications() {
        let (_, mut session) = registered().await;
        session.init().await;

        let user_id = session.api().current_user().await.map(|a| a.id);
        assert!(user_id.is_none());

        session.login("ada@example.com", "password123").await.unwrap();
        let user_id = session.user().unwrap().id.clone();

        session
            .api()
            .create_notification(&NewNotification::task_assigned(
                user_id.as_str(),
                "t1",
                "Write copy",
                "p1",
                "Launch",
            ))
            .await
            .unwrap();
        session.load_notifications().await;

        assert!(session.is_authenticated());
        assert_eq!(session.notifications().unread(), 1);
        assert_eq!(session.guard(&Route::SignIn), Guard::Redirect(Route::Dashboard));
    }

    #[tokio::test]
    async fn test_failed_login_stays_anonymous() {
        let (_, mut session) = registered().await;
        session.init().await;

        assert!(session.login("ada@example.com", "nope").await.is_err());
        assert!(!session.is_authenticated());
        assert_eq!(session.drain_notices()[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_logout_tears_down() {
        let (_, mut session) = registered().await;
        session.login("ada@example.com", "password123").await.unwrap();

        assert_eq!(session.logout().await.unwrap(), Route::SignIn);
        assert!(session.user().is_none());
        assert_eq!(session.auth_state(), AuthState::Anonymous);
        assert_eq!(session.notifications().unread(), 0);
        assert_eq!(
            session.guard(&Route::Dashboard),
            Guard::Redirect(Route::SignIn)
        );
    }

    #[tokio::test]
    async fn test_logout_failure_keeps_state() {
        let (_, mut session) = registered().await;
        session.init().await;

        // no session to delete
        assert!(session.logout().await.is_err());
        assert_eq!(session.drain_notices()[0].message, "Failed to sign out");
    }

    #[tokio::test]
    async fn test_verify_magic_link_outcomes() {
        let (backend, mut session) = registered().await;

        assert!(matches!(
            session.verify_magic_link(None, Some("secret")).await,
            Err(VerificationError::InvalidLink)
        ));

        session
            .request_magic_link("ada@example.com", "http://localhost:3000/verify-email")
            .await
            .unwrap();
        let (user_id, secret) = backend.magic_secret_for("ada@example.com").unwrap();

        assert!(matches!(
            session.verify_magic_link(Some(&user_id), Some("stale")).await,
            Err(VerificationError::LinkExpired)
        ));

        let route = session
            .verify_magic_link(Some(&user_id), Some(&secret))
            .await
            .unwrap();
        assert_eq!(route, Route::Dashboard);
        assert!(session.is_authenticated());
        assert!(session.user().unwrap().email_verification);
    }

    #[tokio::test]
    async fn test_verify_magic_link_without_account_fails() {
        let (backend, mut session) = registered().await;
        session
            .request_magic_link("ada@example.com", "http://localhost:3000/verify-email")
            .await
            .unwrap();
        session.drain_notices();
        let (user_id, secret) = backend.magic_secret_for("ada@example.com").unwrap();

        backend.remove_account(&user_id);

        assert!(matches!(
            session.verify_magic_link(Some(&user_id), Some(&secret)).await,
            Err(VerificationError::SessionMissing)
        ));
        assert!(!session.is_authenticated());

        let notices = session.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(
            notices[0].message,
            "Failed to verify your email. Please try again or contact support."
        );
    }

    #[tokio::test]
    async fn test_mark_all_through_session() {
        let (backend, mut session) = registered().await;
        session.login("ada@example.com", "password123").await.unwrap();
        let user_id = session.user().unwrap().id.clone();

        for task in ["t1", "t2"] {
            session
                .api()
                .create_notification(&NewNotification::task_assigned(
                    user_id.as_str(),
                    task,
                    "a",
                    "p1",
                    "b",
                ))
                .await
                .unwrap();
        }
        session.load_notifications().await;
        assert_eq!(session.notifications().unread(), 2);

        let report = session.mark_all_notifications_read().await.unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(session.notifications().unread(), 0);
        assert_eq!(
            backend.count_calls(Operation::Update, Collection::Notifications),
            2
        );
    }
}
