//! Session gate.
//!
//! Decides which view a visitor gets from the identity provider's auth state:
//!
//! ```text
//!                 auth: Some(identity)
//!   SignedOut ─────────────────────────────▶ SignedIn
//!      │  auth: None, redirect pending           ▲  │
//!      ├──────────────▶ PendingRedirect          │  │ sign_out ok
//!      │  auth: None, no redirect                │  ▼
//!      └──────────────▶ LoginPromptVisible ──────┘
//!                                   sign-in success
//! ```
//!
//! Auth-state errors are logged and leave the state where it was.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use recipe_box_core::{GateState, Identity};

/// Where the login form is mounted on the login page.
pub const LOGIN_MOUNT: &str = "#login-container";

/// Errors reported by an identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// The provider refused the request.
    #[error("identity provider rejected request: {0}")]
    Rejected(String),
}

/// Errors surfaced by the gate.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("sign-out failed: {0}")]
    SignOutFailed(#[source] IdentityError),
}

/// External authority for who is signed in.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Whether a sign-in redirect is in flight for this visitor.
    async fn is_pending_redirect(&self) -> bool;

    /// Show the login form at `mount`.
    async fn start_login(&self, mount: &str);

    /// End the provider session.
    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Auth-state machine for one visitor.
pub struct SessionGate<P> {
    provider: P,
    state: GateState,
}

impl<P: IdentityProvider> SessionGate<P> {
    /// A gate that has not yet heard from the provider.
    pub fn new(provider: P) -> Self {
        Self::resume(provider, GateState::SignedOut)
    }

    /// A gate continuing from a previously observed state.
    pub const fn resume(provider: P, state: GateState) -> Self {
        Self { provider, state }
    }

    pub const fn state(&self) -> &GateState {
        &self.state
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Apply an auth-state change reported by the provider.
    pub async fn on_auth_state_changed(
        &mut self,
        event: Result<Option<Identity>, IdentityError>,
    ) -> &GateState {
        match event {
            Ok(Some(identity)) => {
                info!(uid = %identity.uid, from = self.state.name(), "Auth state: signed in");
                self.state = GateState::SignedIn(identity);
            }
            Ok(None) if self.provider.is_pending_redirect().await => {
                self.state = GateState::PendingRedirect;
            }
            Ok(None) => {
                self.provider.start_login(LOGIN_MOUNT).await;
                self.state = GateState::LoginPromptVisible;
            }
            Err(e) => {
                error!(error = %e, "Auth state listener error");
            }
        }
        &self.state
    }

    /// Record a completed sign-in.
    pub fn on_sign_in_success(&mut self, identity: Identity) -> &GateState {
        info!(uid = %identity.uid, "Sign-in succeeded");
        self.state = GateState::SignedIn(identity);
        &self.state
    }

    /// Sign out through the provider and show the login prompt.
    ///
    /// # Errors
    ///
    /// Returns `GateError::SignOutFailed` if the provider refuses; the state
    /// is left unchanged.
    pub async fn sign_out(&mut self) -> Result<(), GateError> {
        self.provider
            .sign_out()
            .await
            .map_err(GateError::SignOutFailed)?;
        self.state = GateState::LoginPromptVisible;
        Ok(())
    }
}
