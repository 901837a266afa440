//! Session middleware configuration and draft persistence.
//!
//! Production uses the `PostgreSQL` store from tower-sessions-sqlx-store;
//! tests pass an in-memory store.

use recipe_box_core::RecipeDraft;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use crate::config::WebConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "rb_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &WebConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The visitor's in-progress draft, or a fresh one.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn load_draft(session: &Session) -> Result<RecipeDraft, tower_sessions::session::Error> {
    Ok(session
        .get::<RecipeDraft>(session_keys::RECIPE_DRAFT)
        .await?
        .unwrap_or_default())
}

/// Store the draft in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_draft(
    session: &Session,
    draft: &RecipeDraft,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::RECIPE_DRAFT, draft).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use recipe_box_core::IngredientField;
    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_draft_survives_session_roundtrip() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert_eq!(load_draft(&session).await.unwrap(), RecipeDraft::new());

        let mut draft = RecipeDraft::new();
        draft.name = "rice".to_owned();
        draft.ingredients.update(0, IngredientField::Name, "rice");
        draft.ingredients.insert();
        save_draft(&session, &draft).await.unwrap();
        assert_eq!(load_draft(&session).await.unwrap(), draft);

        draft.reset();
        save_draft(&session, &draft).await.unwrap();
        assert_eq!(load_draft(&session).await.unwrap(), RecipeDraft::new());
    }
}
