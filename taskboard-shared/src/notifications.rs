//! Notification centre
//!
//! Holds the signed-in user's notifications (newest first) and the unread
//! counter shown next to the bell.
//!
//! Marking one notification read updates the backend first and only then
//! the local copy. Marking all read updates every unread notification
//! concurrently and touches local state only if all of them succeeded; on
//! partial failure the caller gets a [`MarkAllReport`] and an error notice.

use serde::Serialize;

use crate::api::{Api, MarkAllReport};
use crate::models::Notification;
use crate::navigation::Route;
use crate::notice::Notices;
use crate::remote::RemoteError;

/// Notification centre errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(String),

    #[error("{failed} of {attempted} notifications could not be marked as read")]
    PartialFailure { attempted: usize, failed: usize },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl From<MarkAllReport> for NotificationError {
    fn from(report: MarkAllReport) -> Self {
        NotificationError::PartialFailure {
            attempted: report.attempted,
            failed: report.failed,
        }
    }
}

/// Notifications of the signed-in user
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
    unread: usize,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn get(&self, notification_id: &str) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == notification_id)
    }

    /// Replaces the list with the user's notifications
    ///
    /// Load failures leave an empty list.
    pub async fn load(&mut self, api: &Api, user_id: &str) {
        self.notifications = api.user_notifications(user_id).await;
        self.unread = self.notifications.iter().filter(|n| !n.is_read).count();
        tracing::debug!(
            user_id = %user_id,
            total = self.notifications.len(),
            unread = self.unread,
            "Notifications loaded"
        );
    }

    /// Marks one notification read
    ///
    /// The counter drops by one, floored at zero, even when the item was
    /// already read. On failure local state is unchanged.
    pub async fn mark_read(
        &mut self,
        api: &Api,
        notification_id: &str,
        notices: &mut Notices,
    ) -> Result<(), NotificationError> {
        if let Err(e) = api.mark_notification_read(notification_id).await {
            notices.error("Failed to mark notification as read");
            return Err(e.into());
        }

        if let Some(notification) = self
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            notification.is_read = true;
        }
        self.unread = self.unread.saturating_sub(1);
        Ok(())
    }

    /// Marks every notification of the user read
    pub async fn mark_all_read(
        &mut self,
        api: &Api,
        user_id: &str,
        notices: &mut Notices,
    ) -> Result<MarkAllReport, NotificationError> {
        let report = match api.mark_all_notifications_read(user_id).await {
            Ok(report) => report,
            Err(e) => {
                notices.error("Failed to mark notifications as read");
                return Err(e.into());
            }
        };

        if !report.is_complete() {
            notices.error(format!(
                "{} of {} notifications could not be marked as read",
                report.failed, report.attempted
            ));
            return Err(report.into());
        }

        for notification in &mut self.notifications {
            notification.is_read = true;
        }
        self.unread = 0;
        Ok(report)
    }

    /// Marks a notification read and returns where it points
    pub async fn open(
        &mut self,
        api: &Api,
        notification_id: &str,
        notices: &mut Notices,
    ) -> Result<Option<Route>, NotificationError> {
        let project_id = self
            .get(notification_id)
            .ok_or_else(|| NotificationError::NotFound(notification_id.to_string()))?
            .project_id
            .clone();

        self.mark_read(api, notification_id, notices).await?;
        Ok(project_id.map(Route::Project))
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
        self.unread = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewNotification;
    use crate::notice::NoticeLevel;
    use crate::remote::{Collection, MemoryBackend, Operation};
    use std::sync::Arc;

    async fn seeded(count: usize) -> (MemoryBackend, Api, NotificationCenter) {
        let backend = MemoryBackend::new();
        let api = Api::with_log_mailer(Arc::new(backend.clone()));
        for i in 0..count {
            api.create_notification(&NewNotification::task_assigned(
                "u1",
                format!("t{}", i),
                "Write copy",
                "p1",
                "Launch",
            ))
            .await
            .unwrap();
        }

        let mut center = NotificationCenter::new();
        center.load(&api, "u1").await;
        (backend, api, center)
    }

    #[tokio::test]
    async fn test_load_counts_unread() {
        let (_, _, center) = seeded(3).await;
        assert_eq!(center.notifications().len(), 3);
        assert_eq!(center.unread(), 3);
    }

    #[tokio::test]
    async fn test_load_failure_leaves_empty_list() {
        let (backend, api, mut center) = seeded(2).await;
        backend.fail_next(Operation::List, Collection::Notifications, 1);

        center.load(&api, "u1").await;
        assert!(center.notifications().is_empty());
        assert_eq!(center.unread(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_decrements_by_one() {
        let (_, api, mut center) = seeded(2).await;
        let mut notices = Notices::new();
        let id = center.notifications()[0].id.clone();

        center.mark_read(&api, &id, &mut notices).await.unwrap();
        assert_eq!(center.unread(), 1);
        assert!(center.get(&id).unwrap().is_read);

        // already read, still decrements
        center.mark_read(&api, &id, &mut notices).await.unwrap();
        assert_eq!(center.unread(), 0);

        center.mark_read(&api, &id, &mut notices).await.unwrap();
        assert_eq!(center.unread(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_failure_keeps_state() {
        let (backend, api, mut center) = seeded(1).await;
        let mut notices = Notices::new();
        let id = center.notifications()[0].id.clone();
        backend.fail_next(Operation::Update, Collection::Notifications, 1);

        assert!(center.mark_read(&api, &id, &mut notices).await.is_err());
        assert_eq!(center.unread(), 1);
        assert!(!center.get(&id).unwrap().is_read);
        assert_eq!(notices.count(NoticeLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let (_, api, mut center) = seeded(3).await;
        let mut notices = Notices::new();

        let report = center.mark_all_read(&api, "u1", &mut notices).await.unwrap();
        assert_eq!(report.attempted, 3);
        assert_eq!(center.unread(), 0);
        assert!(center.notifications().iter().all(|n| n.is_read));
    }

    #[tokio::test]
    async fn test_mark_all_partial_failure_keeps_state() {
        let (backend, api, mut center) = seeded(3).await;
        let mut notices = Notices::new();
        backend.fail_next(Operation::Update, Collection::Notifications, 2);

        let err = center
            .mark_all_read(&api, "u1", &mut notices)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NotificationError::PartialFailure { attempted: 3, failed: 2 }
        ));
        assert_eq!(center.unread(), 3);
        assert!(center.notifications().iter().all(|n| !n.is_read));
        assert_eq!(notices.count(NoticeLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_open_yields_project_route() {
        let (_, api, mut center) = seeded(1).await;
        let mut notices = Notices::new();
        let id = center.notifications()[0].id.clone();

        let route = center.open(&api, &id, &mut notices).await.unwrap();
        assert_eq!(route, Some(Route::Project("p1".to_string())));
        assert_eq!(center.unread(), 0);

        assert!(matches!(
            center.open(&api, "missing", &mut notices).await,
            Err(NotificationError::NotFound(_))
        ));
    }
}
