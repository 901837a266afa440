//! Authentication route handlers.
//!
//! Login and registration both end by telling the session gate about the
//! new identity and storing it in the session. Logout asks the gate to sign
//! out and unloads the identity's recipe collection.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, warn};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{Account, CurrentUser};
use crate::services::auth::{AuthError, AuthService};
use crate::services::{SessionGate, SessionIdentity};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub display_name: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    /// Element id the login form is mounted under.
    pub mount: &'static str,
    pub error: Option<&'static str>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let provider = SessionIdentity::new(session.clone());
    provider.begin_login().await?;

    let result = AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await;

    if let Err(e) = provider.end_login().await {
        warn!("Failed to clear login pending: {}", e);
    }

    match result {
        Ok(account) => sign_in(provider, &session, account).await,
        Err(e @ (AuthError::Repository(_) | AuthError::PasswordHash)) => Err(e.into()),
        Err(e) => {
            warn!("Login failed: {}", e);
            Ok(Redirect::to("/?error=credentials").into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Handle registration form submission.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if form.password != form.password_confirm {
        return Ok(Redirect::to("/?error=password_mismatch").into_response());
    }

    let result = AuthService::new(state.pool())
        .register_with_password(&form.email, &form.password, &form.display_name)
        .await;

    match result {
        Ok(account) => sign_in(SessionIdentity::new(session.clone()), &session, account).await,
        Err(e @ (AuthError::Repository(_) | AuthError::PasswordHash)) => Err(e.into()),
        Err(e) => {
            warn!("Registration failed: {}", e);
            let code = match e {
                AuthError::UserAlreadyExists => "exists",
                AuthError::WeakPassword(_) => "weak_password",
                AuthError::InvalidEmail(_) => "email",
                AuthError::InvalidDisplayName(_) => "display_name",
                AuthError::InvalidCredentials
                | AuthError::Repository(_)
                | AuthError::PasswordHash => "register",
            };
            Ok(Redirect::to(&format!("/?error={code}")).into_response())
        }
    }
}

/// Record a successful sign-in through the gate and persist it.
async fn sign_in(
    provider: SessionIdentity,
    session: &Session,
    account: Account,
) -> Result<Response> {
    let mut gate = SessionGate::new(provider);
    let Some(identity) = gate.on_sign_in_success(account.identity()).identity().cloned() else {
        return Ok(Redirect::to("/").into_response());
    };

    // New id on privilege change
    session.cycle_id().await?;

    let user = CurrentUser {
        identity,
        email: account.email,
    };
    set_current_user(session, &user).await?;

    set_sentry_user(&user.identity.uid, Some(user.email.as_str()));
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Response {
    let uid = user.identity.uid.clone();
    let mut gate = SessionGate::resume(
        SessionIdentity::new(session),
        recipe_box_core::GateState::SignedIn(user.identity),
    );

    match gate.sign_out().await {
        Ok(()) => {
            state.collections().deactivate(&uid).await;
            clear_sentry_user();
            Redirect::to("/").into_response()
        }
        Err(e) => {
            error!(uid = %uid, error = %e, "Sign-out failed");
            Redirect::to("/?error=signout").into_response()
        }
    }
}
