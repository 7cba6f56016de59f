//! Assignment mail delivery
//!
//! Task assignment "emails" are handed to a [`Mailer`]. The only shipped
//! implementation, [`LogMailer`], writes them to the log.

use async_trait::async_trait;
use serde::Serialize;

/// Mail sent to the assignees of a new task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentMail {
    pub recipients: Vec<String>,
    pub task_title: String,
    pub project_name: String,
}

impl AssignmentMail {
    /// Body line of the mail
    pub fn body(&self) -> String {
        format!(
            "Task \"{}\" in project \"{}\" has been assigned to you.",
            self.task_title, self.project_name
        )
    }
}

/// Mail delivery errors
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Delivers assignment mail
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_task_assignment(&self, mail: &AssignmentMail) -> Result<(), MailError>;
}

/// Mailer that only logs what would be sent
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_task_assignment(&self, mail: &AssignmentMail) -> Result<(), MailError> {
        tracing::info!(
            recipients = %mail.recipients.join(", "),
            task = %mail.task_title,
            project = %mail.project_name,
            "{}",
            mail.body()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body() {
        let mail = AssignmentMail {
            recipients: vec!["ada@example.com".to_string()],
            task_title: "Write copy".to_string(),
            project_name: "Launch".to_string(),
        };
        assert_eq!(
            mail.body(),
            "Task \"Write copy\" in project \"Launch\" has been assigned to you."
        );
    }

    #[tokio::test]
    async fn test_log_mailer_never_fails() {
        let mail = AssignmentMail {
            recipients: vec![],
            task_title: "a".to_string(),
            project_name: "b".to_string(),
        };
        assert!(LogMailer.send_task_assignment(&mail).await.is_ok());
    }
}
