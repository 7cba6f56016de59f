use super::{decode_all, Api};
use crate::models::User;
use crate::remote::Collection;

impl Api {
    /// The whole user directory
    pub async fn all_users(&self) -> Vec<User> {
        match self
            .backend
            .list_all_documents(Collection::Users, &[])
            .await
            .and_then(decode_all::<User>)
        {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(error = %e, "Error fetching users");
                Vec::new()
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
    async fn test_all_users_degrades_to_empty() {
        let backend = MemoryBackend::new();
        let api = Api::with_log_mailer(Arc::new(backend.clone()));
        api.create_user_account("Ada", "ada@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(api.all_users().await.len(), 1);

        backend.fail_next(Operation::List, Collection::Users, 1);
        assert!(api.all_users().await.is_empty());
    }
}
