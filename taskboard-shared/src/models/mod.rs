//! Document models for Taskboard
//!
//! Each model mirrors a document in one of the backend collections. Field
//! names on the wire follow the backend (camelCase, `$id` for the document
//! id).
//!
//! # Models
//!
//! - `project`: projects owned by one user
//! - `task`: tasks inside a project, with status, priority and assignees
//! - `user`: directory mirror of accounts, used for assignee lookup
//! - `notification`: per-user notifications with a read flag
//! - `account`: the signed-in account as returned by the account service

pub mod account;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;

pub use account::{Account, MagicToken, SessionInfo};
pub use notification::{NewNotification, Notification, NotificationType};
pub use project::{NewProject, Project};
pub use task::{NewTask, Task, TaskPriority, TaskStatus, UnknownVariant};
pub use user::User;
