//! Account domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use recipe_box_core::{Email, Identity, Uid};

/// A registered account of the email/password identity provider.
#[derive(Debug, Clone)]
pub struct Account {
    /// Opaque identity handle; scopes the account's recipe collection.
    pub uid: Uid,
    /// Login email address.
    pub email: Email,
    /// Name shown in the "Welcome" header.
    pub display_name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The identity handed to the session gate after sign-in.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.uid.clone(), self.display_name.clone())
    }
}
