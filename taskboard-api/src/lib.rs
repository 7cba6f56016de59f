//! # Taskboard API Server Library
//!
//! HTTP front of Taskboard. Each signed-in client gets a server-side
//! session holding its application state; handlers drive the shared
//! library's state holders on that session.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and token middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `sessions`: Client session registry
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;
