//! Routes and the route guard
//!
//! # Routes
//!
//! ```text
//! /sign-in        sign in form
//! /sign-up        registration form
//! /verify-email   magic-link landing page (always reachable)
//! /               dashboard (protected)
//! /project/<id>   project board (protected)
//! ```
//!
//! Protected routes send anonymous visitors to `/sign-in`, but only once
//! the session check has finished. Signed-in users visiting the sign-in
//! or sign-up pages are sent to the dashboard.

use serde::{Serialize, Serializer};
use std::fmt;

/// An application route
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    SignUp,
    VerifyEmail,
    Dashboard,
    Project(String),
}

impl Route {
    /// Parses a path, ignoring any query string and trailing slash
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Some(Route::Dashboard),
            "/sign-in" => Some(Route::SignIn),
            "/sign-up" => Some(Route::SignUp),
            "/verify-email" => Some(Route::VerifyEmail),
            other => {
                let id = other.strip_prefix("/project/")?;
                if id.is_empty() || id.contains('/') {
                    None
                } else {
                    Some(Route::Project(id.to_string()))
                }
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::SignIn => "/sign-in".to_string(),
            Route::SignUp => "/sign-up".to_string(),
            Route::VerifyEmail => "/verify-email".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Project(id) => format!("/project/{}", id),
        }
    }

    /// Whether the route needs a signed-in user
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Project(_))
    }

    /// Whether the route is one of the sign-in/sign-up forms
    pub fn is_auth_form(&self) -> bool {
        matches!(self, Route::SignIn | Route::SignUp)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path())
    }
}

/// What is known about the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    /// Session check still running
    Checking,
    Anonymous,
    Authenticated,
}

/// Route guard decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "to", rename_all = "lowercase")]
pub enum Guard {
    /// Show the requested page
    Render,

    /// Show a loading state until the session check finishes
    Wait,

    /// Go elsewhere
    Redirect(Route),
}

/// Decides what to do with a visit to `route`
pub fn guard(route: &Route, auth: AuthState) -> Guard {
    match (auth, route.is_protected(), route.is_auth_form()) {
        (AuthState::Checking, true, _) => Guard::Wait,
        (AuthState::Anonymous, true, _) => Guard::Redirect(Route::SignIn),
        (AuthState::Authenticated, _, true) => Guard::Redirect(Route::Dashboard),
        _ => Guard::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/sign-in?verified=true"), Some(Route::SignIn));
        assert_eq!(
            Route::parse("/project/p1/"),
            Some(Route::Project("p1".to_string()))
        );
        assert_eq!(Route::parse("/project/"), None);
        assert_eq!(Route::parse("/settings"), None);
    }

    #[test]
    fn test_path_round_trip() {
        let route = Route::Project("65a1f0".to_string());
        assert_eq!(Route::parse(&route.path()), Some(route));
    }

    #[test]
    fn test_anonymous_visitors_are_sent_to_sign_in() {
        assert_eq!(
            guard(&Route::Dashboard, AuthState::Anonymous),
            Guard::Redirect(Route::SignIn)
        );
        assert_eq!(
            guard(&Route::Project("p1".to_string()), AuthState::Anonymous),
            Guard::Redirect(Route::SignIn)
        );
        assert_eq!(guard(&Route::SignUp, AuthState::Anonymous), Guard::Render);
    }

    #[test]
    fn test_no_redirect_while_checking() {
        assert_eq!(guard(&Route::Dashboard, AuthState::Checking), Guard::Wait);
        assert_eq!(guard(&Route::SignIn, AuthState::Checking), Guard::Render);
    }

    #[test]
    fn test_signed_in_users_skip_auth_forms() {
        assert_eq!(
            guard(&Route::SignIn, AuthState::Authenticated),
            Guard::Redirect(Route::Dashboard)
        );
        assert_eq!(
            guard(&Route::VerifyEmail, AuthState::Authenticated),
            Guard::Render
        );
        assert_eq!(guard(&Route::Dashboard, AuthState::Authenticated), Guard::Render);
    }

    #[test]
    fn test_guard_serializes_target_path() {
        let value = serde_json::to_value(Guard::Redirect(Route::SignIn)).unwrap();
        assert_eq!(value, serde_json::json!({"action": "redirect", "to": "/sign-in"}));
    }
}
