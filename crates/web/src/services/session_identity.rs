//! Identity provider backed by the visitor's server-side session.
//!
//! The signed-in user lives under [`session_keys::CURRENT_USER`]; a login in
//! progress is flagged under [`session_keys::LOGIN_PENDING`].

use async_trait::async_trait;
use tower_sessions::Session;
use tracing::{debug, warn};

use recipe_box_core::Identity;

use super::gate::{IdentityError, IdentityProvider};
use crate::models::{CurrentUser, session_keys};

fn unavailable(e: &tower_sessions::session::Error) -> IdentityError {
    IdentityError::Unavailable(e.to_string())
}

/// Identity provider for one request's session.
#[derive(Clone)]
pub struct SessionIdentity {
    session: Session,
}

impl SessionIdentity {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Current auth state: the signed-in identity, if any.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Unavailable` if the session store fails.
    pub async fn auth_state(&self) -> Result<Option<Identity>, IdentityError> {
        self.session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .map(|user| user.map(|u| u.identity))
            .map_err(|e| unavailable(&e))
    }

    /// Flag a login as in flight.
    ///
    /// The flag is saved immediately so other requests on the same session
    /// see it while credentials are checked.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Unavailable` if the session store fails.
    pub async fn begin_login(&self) -> Result<(), IdentityError> {
        self.session
            .insert(session_keys::LOGIN_PENDING, true)
            .await
            .map_err(|e| unavailable(&e))?;
        self.session.save().await.map_err(|e| unavailable(&e))
    }

    /// Clear the in-flight login flag.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Unavailable` if the session store fails.
    pub async fn end_login(&self) -> Result<(), IdentityError> {
        self.session
            .remove::<bool>(session_keys::LOGIN_PENDING)
            .await
            .map(|_| ())
            .map_err(|e| unavailable(&e))
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn is_pending_redirect(&self) -> bool {
        match self.session.get::<bool>(session_keys::LOGIN_PENDING).await {
            Ok(pending) => pending.unwrap_or(false),
            Err(e) => {
                warn!(error = %e, "Could not read login flag; assuming no redirect pending");
                false
            }
        }
    }

    async fn start_login(&self, mount: &str) {
        debug!(mount, "Login form mounted");
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.session.flush().await.map_err(|e| unavailable(&e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use recipe_box_core::{Email, GateState};
    use tower_sessions::session::{Id, Record};
    use tower_sessions::session_store::{self, SessionStore};
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::services::gate::SessionGate;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_empty_session_shows_login() {
        let identity = SessionIdentity::new(session());
        let event = identity.auth_state().await;
        let mut gate = SessionGate::new(identity);
        assert_eq!(
            gate.on_auth_state_changed(event).await,
            &GateState::LoginPromptVisible
        );
    }

    #[tokio::test]
    async fn test_pending_login_shows_loader() {
        let identity = SessionIdentity::new(session());
        identity.begin_login().await.unwrap();
        let mut gate = SessionGate::new(identity.clone());
        assert_eq!(
            gate.on_auth_state_changed(Ok(None)).await,
            &GateState::PendingRedirect
        );

        identity.end_login().await.unwrap();
        assert!(!identity.is_pending_redirect().await);
    }

    #[tokio::test]
    async fn test_sign_out_clears_user() {
        let session = session();
        let user = CurrentUser {
            identity: Identity::new("u1", "Test User"),
            email: Email::parse("test@example.com").unwrap(),
        };
        session
            .insert(session_keys::CURRENT_USER, &user)
            .await
            .unwrap();

        let identity = SessionIdentity::new(session);
        assert_eq!(identity.auth_state().await.unwrap(), Some(user.identity.clone()));

        let mut gate = SessionGate::resume(identity.clone(), GateState::SignedIn(user.identity));
        gate.sign_out().await.unwrap();
        assert_eq!(gate.state(), &GateState::LoginPromptVisible);
        assert_eq!(identity.auth_state().await.unwrap(), None);
    }

    #[derive(Debug, Clone)]
    struct DownStore;

    fn down() -> session_store::Error {
        session_store::Error::Backend("store down".to_owned())
    }

    #[async_trait]
    impl SessionStore for DownStore {
        async fn save(&self, _record: &Record) -> session_store::Result<()> {
            Err(down())
        }

        async fn load(&self, _id: &Id) -> session_store::Result<Option<Record>> {
            Err(down())
        }

        async fn delete(&self, _id: &Id) -> session_store::Result<()> {
            Err(down())
        }
    }

    #[tokio::test]
    async fn test_unreadable_session_is_no_redirect_and_unavailable() {
        let session = Session::new(Some(Id::default()), Arc::new(DownStore), None);
        let identity = SessionIdentity::new(session);

        assert!(!identity.is_pending_redirect().await);
        assert!(matches!(
            identity.auth_state().await,
            Err(IdentityError::Unavailable(_))
        ));

        let event = identity.auth_state().await;
        let mut gate = SessionGate::new(identity);
        assert_eq!(gate.on_auth_state_changed(event).await, &GateState::SignedOut);
    }
}
