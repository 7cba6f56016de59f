//! Client authentication
//!
//! Account authentication itself is delegated to the hosted backend. This
//! module only covers the tokens the API server issues to its own clients.
//!
//! # Modules
//!
//! - [`jwt`]: HS256 session tokens naming a server-side client session

pub mod jwt;
