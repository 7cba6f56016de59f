//! API route handlers
//!
//! This module contains all route handlers organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Registration, sign-in, sign-out and magic links
//! - `projects`: Dashboard and project boards
//! - `tasks`: Task creation and deletion
//! - `board`: Drag and drop between status columns
//! - `users`: User directory and assignee suggestions
//! - `notifications`: Notification centre
//! - `notices`: Pending user-facing notices
//! - `navigation`: Route guard decisions

pub mod auth;
pub mod board;
pub mod health;
pub mod navigation;
pub mod notices;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod users;
