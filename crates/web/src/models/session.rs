//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use recipe_box_core::{Email, Identity};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The identity the recipe collection is scoped to.
    pub identity: Identity,
    /// Login email address.
    pub email: Email,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key set while a login submission is being verified.
    pub const LOGIN_PENDING: &str = "login_pending";

    /// Key for the in-progress "Add Recipe" draft.
    pub const RECIPE_DRAFT: &str = "recipe_draft";
}
