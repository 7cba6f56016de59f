use serde_json::json;
use std::collections::HashMap;

use super::{decode, decode_all, now_iso, with_fields, Api};
use crate::ids::unique_id;
use crate::mailer::AssignmentMail;
use crate::models::{NewNotification, NewTask, Project, Task, TaskStatus};
use crate::remote::{Collection, Query, RemoteResult};

/// Trims assignee entries and drops the blank ones
pub fn clean_assignees(assignees: &[String]) -> Vec<String> {
    assignees
        .iter()
        .map(|email| email.trim())
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect()
}

impl Api {
    /// Creates a task, then notifies and mails its assignees
    ///
    /// Assignees that resolve to a known user get a `task_assigned`
    /// notification. Fan-out failures after the task document exists are
    /// logged and do not fail the call.
    pub async fn create_task(&self, task: &NewTask) -> RemoteResult<Task> {
        let mut task = task.clone();
        task.assignees = clean_assignees(&task.assignees);

        let result = async {
            let now = now_iso();
            let data = with_fields(
                serde_json::to_value(&task)?,
                vec![("createdAt", json!(now)), ("updatedAt", json!(now))],
            );

            let document = self
                .backend
                .create_document(Collection::Tasks, &unique_id(), data)
                .await?;
            decode::<Task>(document)
        }
        .await;

        let created = match result {
            Ok(created) => created,
            Err(e) => {
                tracing::error!(error = %e, project_id = %task.project_id, "Error creating task");
                return Err(e);
            }
        };

        tracing::info!(task_id = %created.id, project_id = %created.project_id, "Task created");

        if !created.assignees.is_empty() {
            self.notify_assignees(&created).await;
            self.send_task_assignment_email(&created.id, &created.project_id, &created.assignees)
                .await;
        }

        Ok(created)
    }

    async fn notify_assignees(&self, task: &Task) {
        let project = match self.project(&task.project_id).await {
            Ok(project) => project,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    task_id = %task.id,
                    "Skipping assignment notifications, project unavailable"
                );
                return;
            }
        };

        let directory: HashMap<String, String> = self
            .all_users()
            .await
            .into_iter()
            .map(|user| (user.email, user.id))
            .collect();

        for email in &task.assignees {
            let Some(user_id) = directory.get(email) else {
                tracing::debug!(email = %email, "Assignee is not a known user");
                continue;
            };

            self.create_notification(&NewNotification::task_assigned(
                user_id.as_str(),
                task.id.as_str(),
                &task.title,
                project.id.as_str(),
                &project.name,
            ))
            .await;
        }
    }

    /// Tasks of a project
    pub async fn project_tasks(&self, project_id: &str) -> Vec<Task> {
        match self
            .backend
            .list_all_documents(Collection::Tasks, &[Query::equal("projectId", project_id)])
            .await
            .and_then(decode_all::<Task>)
        {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::error!(error = %e, project_id = %project_id, "Error getting project tasks");
                Vec::new()
            }
        }
    }

    pub async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> RemoteResult<Task> {
        let result = async {
            let document = self
                .backend
                .update_document(
                    Collection::Tasks,
                    task_id,
                    json!({ "status": status, "updatedAt": now_iso() }),
                )
                .await?;
            decode::<Task>(document)
        }
        .await;

        match &result {
            Ok(_) => tracing::debug!(task_id = %task_id, status = %status, "Task status updated"),
            Err(e) => tracing::error!(error = %e, task_id = %task_id, "Error updating task status"),
        }
        result
    }

    pub async fn delete_task(&self, task_id: &str) -> RemoteResult<()> {
        self.backend
            .delete_document(Collection::Tasks, task_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, task_id = %task_id, "Error deleting task");
                e
            })
    }

    /// Hands the assignment mail for a task to the mailer
    ///
    /// Returns whether the mail went out.
    pub async fn send_task_assignment_email(
        &self,
        task_id: &str,
        project_id: &str,
        assignees: &[String],
    ) -> bool {
        let result = async {
            let task: Task = decode(self.backend.get_document(Collection::Tasks, task_id).await?)?;
            let project: Project =
                decode(self.backend.get_document(Collection::Projects, project_id).await?)?;

            let mail = AssignmentMail {
                recipients: assignees.to_vec(),
                task_title: task.title,
                project_name: project.name,
            };

            self.mailer.send_task_assignment(&mail).await?;
            Ok::<_, anyhow::Error>(())
        }
        .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, task_id = %task_id, "Error sending assignment emails");
                false
            }
        }
    }
}
