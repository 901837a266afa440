//! The landing page.
//!
//! `GET /` asks the session gate who the visitor is and renders the view
//! for the resulting state.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use recipe_box_core::GateState;

use crate::error::Result;
use crate::services::gate::LOGIN_MOUNT;
use crate::services::{SessionGate, SessionIdentity};
use crate::state::AppState;

use super::PageQuery;
use super::auth::LoginTemplate;
use super::recipes::recipe_page;

/// Shown while a login is being verified.
#[derive(Template, WebTemplate)]
#[template(path = "loading.html")]
pub struct LoadingTemplate;

/// Render the view for the visitor's gate state.
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let provider = SessionIdentity::new(session.clone());
    let event = provider.auth_state().await;

    let mut gate = SessionGate::new(provider);
    let view = gate.on_auth_state_changed(event).await.clone();
    tracing::debug!(state = view.name(), "Gate decided view");

    match view {
        GateState::SignedIn(identity) => recipe_page(&state, &session, identity, &query).await,
        GateState::LoginPromptVisible => Ok(LoginTemplate {
            mount: LOGIN_MOUNT.trim_start_matches('#'),
            error: query.error_message(),
        }
        .into_response()),
        GateState::PendingRedirect | GateState::SignedOut => Ok(LoadingTemplate.into_response()),
    }
}
