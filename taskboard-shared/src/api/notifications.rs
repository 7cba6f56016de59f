use futures::future::join_all;
use serde::Serialize;
use serde_json::json;

use super::{decode, decode_all, now_iso, with_fields, Api};
use crate::ids::unique_id;
use crate::models::{NewNotification, Notification};
use crate::remote::{Collection, Query, RemoteResult};

/// Outcome of a mark-all-read pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkAllReport {
    /// Unread notifications found
    pub attempted: usize,

    /// Updates that failed
    pub failed: usize,
}

impl MarkAllReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

impl Api {
    /// Creates a notification, returning `None` on failure
    pub async fn create_notification(&self, notification: &NewNotification) -> Option<Notification> {
        let result = async {
            let data = with_fields(
                serde_json::to_value(notification)?,
                vec![("createdAt", json!(now_iso()))],
            );
            let document = self
                .backend
                .create_document(Collection::Notifications, &unique_id(), data)
                .await?;
            decode::<Notification>(document)
        }
        .await;

        match result {
            Ok(created) => Some(created),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    user_id = %notification.user_id,
                    "Error creating notification"
                );
                None
            }
        }
    }

    /// Notifications of a user, newest first
    pub async fn user_notifications(&self, user_id: &str) -> Vec<Notification> {
        match self
            .backend
            .list_all_documents(
                Collection::Notifications,
                &[Query::equal("userId", user_id), Query::order_desc("createdAt")],
            )
            .await
            .and_then(decode_all::<Notification>)
        {
            Ok(notifications) => notifications,
            Err(e) => {
                tracing::error!(error = %e, user_id = %user_id, "Error getting user notifications");
                Vec::new()
            }
        }
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> RemoteResult<Notification> {
        let result = async {
            let document = self
                .backend
                .update_document(
                    Collection::Notifications,
                    notification_id,
                    json!({ "isRead": true }),
                )
                .await?;
            decode::<Notification>(document)
        }
        .await;

        if let Err(e) = &result {
            tracing::error!(
                error = %e,
                notification_id = %notification_id,
                "Error marking notification as read"
            );
        }
        result
    }

    /// Unread notifications of a user
    pub async fn unread_notifications(&self, user_id: &str) -> RemoteResult<Vec<Notification>> {
        let result = self
            .backend
            .list_all_documents(
                Collection::Notifications,
                &[Query::equal("userId", user_id), Query::equal("isRead", false)],
            )
            .await
            .and_then(decode_all::<Notification>);

        if let Err(e) = &result {
            tracing::error!(error = %e, user_id = %user_id, "Error getting unread notifications");
        }
        result
    }

    /// Marks every unread notification of a user as read
    ///
    /// Updates are issued concurrently and all of them are awaited before
    /// returning. Fails only when the unread listing fails; individual
    /// update failures are counted in the report.
    pub async fn mark_all_notifications_read(&self, user_id: &str) -> RemoteResult<MarkAllReport> {
        let unread = self.unread_notifications(user_id).await?;

        let updates = unread
            .iter()
            .map(|notification| self.mark_notification_read(&notification.id));
        let results = join_all(updates).await;

        let report = MarkAllReport {
            attempted: results.len(),
            failed: results.iter().filter(|r| r.is_err()).count(),
        };

        if report.is_complete() {
            tracing::debug!(user_id = %user_id, marked = report.attempted, "Notifications marked as read");
        } else {
            tracing::error!(
                user_id = %user_id,
                attempted = report.attempted,
                failed = report.failed,
                "Error marking all notifications as read"
            );
        }

        Ok(report)
    }
}
