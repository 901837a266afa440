//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                      - Gate: recipe page, login page or loader
//! GET  /health                - Liveness check
//! GET  /health/ready          - Readiness check (database ping)
//!
//! # Recipes (requires auth)
//! POST /draft                 - Apply the "Add Recipe" form (add / remove:N / save)
//! POST /recipes/{id}/delete   - Remove a recipe
//!
//! # Auth
//! POST /auth/login            - Login action
//! POST /auth/register         - Register action
//! POST /auth/logout           - Logout action
//! ```

pub mod auth;
pub mod home;
pub mod recipes;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Query parameters carrying the outcome of a redirected form post.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub error: Option<String>,
    pub invalid: Option<String>,
}

impl PageQuery {
    /// User-facing text for the `error` code.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        let message = match self.error.as_deref()? {
            "credentials" => "Invalid email or password.",
            "exists" => "An account with this email already exists.",
            "weak_password" => "Password must be at least 8 characters.",
            "password_mismatch" => "Passwords do not match.",
            "email" => "Please enter a valid email address.",
            "display_name" => "Please enter a display name.",
            "save" => "Your recipe could not be saved. Please try again.",
            "remove" => "The recipe could not be removed. Please try again.",
            "signout" => "Sign-out failed. Please try again.",
            _ => "Something went wrong. Please try again.",
        };
        Some(message)
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/draft", post(recipes::update_draft))
        .route("/recipes/{id}/delete", post(recipes::delete))
        .nest("/auth", auth_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_codes() {
        let query = PageQuery {
            error: Some("credentials".to_owned()),
            invalid: None,
        };
        assert_eq!(query.error_message(), Some("Invalid email or password."));

        let unknown = PageQuery {
            error: Some("<script>".to_owned()),
            invalid: None,
        };
        assert_eq!(
            unknown.error_message(),
            Some("Something went wrong. Please try again.")
        );

        assert_eq!(PageQuery::default().error_message(), None);
    }
}
