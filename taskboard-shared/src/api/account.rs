use serde_json::json;

use super::Api;
use crate::ids::unique_id;
use crate::models::{Account, MagicToken, SessionInfo};
use crate::remote::{Collection, RemoteResult};

impl Api {
    /// Registers an account and mirrors it into the user directory
    ///
    /// The directory document uses the account id. A mirror failure is
    /// logged and does not fail registration. No session is created.
    pub async fn create_user_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> RemoteResult<Account> {
        let user_id = unique_id();

        let account = self
            .backend
            .create_account(&user_id, email, password, name)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, email = %email, "Error creating user account");
                e
            })?;

        if let Err(e) = self
            .backend
            .create_document(
                Collection::Users,
                &account.id,
                json!({ "name": name, "email": email }),
            )
            .await
        {
            tracing::error!(
                error = %e,
                user_id = %account.id,
                "Error adding user to the user directory"
            );
        }

        tracing::info!(user_id = %account.id, "User account created");
        Ok(account)
    }

    /// Starts the magic-URL flow for `email`
    pub async fn request_magic_link(&self, email: &str, redirect_url: &str) -> RemoteResult<MagicToken> {
        self.backend
            .create_magic_url_token(&unique_id(), email, redirect_url)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error creating magic URL token");
                e
            })
    }

    /// Completes the magic-URL flow, creating a session
    pub async fn complete_magic_link(&self, user_id: &str, secret: &str) -> RemoteResult<SessionInfo> {
        self.backend
            .complete_magic_url_session(user_id, secret)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %user_id, "Error completing magic URL session");
                e
            })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<SessionInfo> {
        self.backend
            .create_email_session(email, password)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error signing in");
                e
            })
    }

    pub async fn sign_out(&self) -> RemoteResult<()> {
        self.backend.delete_current_session().await.map_err(|e| {
            tracing::error!(error = %e, "Error signing out");
            e
        })
    }

    /// The signed-in account, or `None`
    pub async fn current_user(&self) -> Option<Account> {
        match self.backend.current_account().await {
            Ok(account) => Some(account),
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::error!(error = %e, "Error getting current user");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryBackend, Operation};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_registration_mirrors_user() {
        let backend = MemoryBackend::new();
        let api = Api::with_log_mailer(Arc::new(backend.clone()));

        let account = api
            .create_user_account("Ada", "ada@example.com", "password123")
            .await
            .unwrap();

        let users = backend.documents(Collection::Users);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["$id"], account.id.as_str());
        assert_eq!(users[0]["email"], "ada@example.com");

        // registration does not sign in
        assert!(api.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_mirror_failure_does_not_fail_registration() {
        let backend = MemoryBackend::new();
        backend.fail_next(Operation::Create, Collection::Users, 1);
        let api = Api::with_log_mailer(Arc::new(backend.clone()));

        let result = api
            .create_user_account("Ada", "ada@example.com", "password123")
            .await;

        assert!(result.is_ok());
        assert!(backend.documents(Collection::Users).is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let backend = MemoryBackend::new();
        let api = Api::with_log_mailer(Arc::new(backend.clone()));
        api.create_user_account("Ada", "ada@example.com", "password123")
            .await
            .unwrap();

        assert!(api.sign_in("ada@example.com", "wrong-password").await.is_err());

        api.sign_in("ada@example.com", "password123").await.unwrap();
        assert_eq!(api.current_user().await.unwrap().email, "ada@example.com");

        api.sign_out().await.unwrap();
        assert!(api.current_user().await.is_none());
    }
}
