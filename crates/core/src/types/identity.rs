//! Authenticated identities and the session gate states.

use serde::{Deserialize, Serialize};

use super::id::Uid;

/// An authenticated user handle issued by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub uid: Uid,
    pub display_name: String,
}

impl Identity {
    #[must_use]
    pub fn new(uid: impl Into<Uid>, display_name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
        }
    }
}

/// Where a browser session stands in the sign-in lifecycle.
///
/// ```text
/// SignedOut ──(no identity, redirect pending)──▶ PendingRedirect
///     │                                              │
///     └──(no identity)──▶ LoginPromptVisible ◀───────┘
///                              │      ▲
///              (identity /     │      │ (sign-out confirmed)
///               login success) ▼      │
///                          SignedIn(identity)
/// ```
///
/// An identity event moves to `SignedIn` from any state. There is no
/// terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "identity", rename_all = "snake_case")]
pub enum GateState {
    /// No auth-state event has been seen yet.
    #[default]
    SignedOut,
    /// A login redirect or popup is in flight; the login form is not shown.
    PendingRedirect,
    /// No identity; the login form is mounted.
    LoginPromptVisible,
    /// An identity is active.
    SignedIn(Identity),
}

impl GateState {
    /// The active identity, if signed in.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SignedOut => "signed_out",
            Self::PendingRedirect => "pending_redirect",
            Self::LoginPromptVisible => "login_prompt_visible",
            Self::SignedIn(_) => "signed_in",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_signed_out() {
        assert_eq!(GateState::default(), GateState::SignedOut);
        assert!(GateState::default().identity().is_none());
    }

    #[test]
    fn test_identity_accessor() {
        let who = Identity::new("u1", "Test User");
        let state = GateState::SignedIn(who.clone());
        assert!(state.is_signed_in());
        assert_eq!(state.identity(), Some(&who));
        assert_eq!(state.name(), "signed_in");
    }

    #[test]
    fn test_serde_shape() {
        let state = GateState::SignedIn(Identity::new("u1", "Test User"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "signed_in");
        assert_eq!(json["identity"]["uid"], "u1");

        let prompt = serde_json::to_value(GateState::LoginPromptVisible).unwrap();
        assert_eq!(prompt["state"], "login_prompt_visible");
    }
}
