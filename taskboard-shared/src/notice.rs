//! Transient user-facing notices
//!
//! Operations that the user triggers report their outcome as a [`Notice`]
//! ("Task moved to ongoing", "Failed to update task status"). Notices queue
//! up in a [`Notices`] buffer until the front end drains them.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Pending notices, oldest first
#[derive(Debug, Clone, Default)]
pub struct Notices {
    pending: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.pending.push(Notice {
            level,
            message: message.into(),
            at: Utc::now(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    /// Pending notices without removing them
    pub fn pending(&self) -> &[Notice] {
        &self.pending
    }

    /// Number of pending notices at `level`
    pub fn count(&self, level: NoticeLevel) -> usize {
        self.pending.iter().filter(|n| n.level == level).count()
    }

    /// Removes and returns every pending notice
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue() {
        let mut notices = Notices::new();
        notices.success("Project created");
        notices.error("Failed to delete project");

        assert_eq!(notices.count(NoticeLevel::Error), 1);

        let drained = notices.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "Project created");
        assert!(notices.is_empty());
    }
}
