//! Active recipe collections, one per signed-in identity.
//!
//! A collection is loaded once when its identity first needs it and then
//! shared by every request of that identity. Each entry sits behind a
//! mutex so creates and removes for one identity apply one at a time.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::info;

use recipe_box_core::Uid;

use super::recipes::{CollectionError, RecipeCollectionStore};
use crate::store::DocumentStore;

/// Upper bound on concurrently active collections.
const MAX_ACTIVE_COLLECTIONS: u64 = 10_000;

/// A loaded collection shared between requests.
pub type SharedCollection = Arc<Mutex<RecipeCollectionStore>>;

/// Cache of loaded collections keyed by identity.
#[derive(Clone)]
pub struct CollectionRegistry {
    documents: Arc<dyn DocumentStore>,
    active: Cache<Uid, SharedCollection>,
}

impl CollectionRegistry {
    /// Create a registry whose entries are dropped after `idle` without use.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, idle: Duration) -> Self {
        let active = Cache::builder()
            .max_capacity(MAX_ACTIVE_COLLECTIONS)
            .time_to_idle(idle)
            .build();
        Self { documents, active }
    }

    /// The document store collections are read from.
    #[must_use]
    pub fn documents(&self) -> &Arc<dyn DocumentStore> {
        &self.documents
    }

    /// Return the collection for `uid`, loading it on first use.
    ///
    /// Concurrent first calls for the same identity share one load.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::LoadFailed` if the load fails. Nothing is
    /// cached in that case, so the next call tries again.
    pub async fn activate(&self, uid: &Uid) -> Result<SharedCollection, CollectionError> {
        let documents = Arc::clone(&self.documents);
        let owner = uid.clone();

        self.active
            .try_get_with(uid.clone(), async move {
                let mut collection = RecipeCollectionStore::new(documents, owner);
                collection.load().await?;
                info!(uid = %collection.uid(), "Activated recipe collection");
                Ok::<_, CollectionError>(Arc::new(Mutex::new(collection)))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Drop the collection for `uid`. The next [`activate`](Self::activate)
    /// reloads it from the store.
    pub async fn deactivate(&self, uid: &Uid) {
        self.active.invalidate(uid).await;
        info!(uid = %uid, "Deactivated recipe collection");
    }

    /// Whether `uid` currently has a loaded collection.
    #[must_use]
    pub fn is_active(&self, uid: &Uid) -> bool {
        self.active.contains_key(uid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use recipe_box_core::{Ingredient, RecipePayload};

    use super::*;
    use crate::store::MemoryDocumentStore;

    fn registry() -> (Arc<MemoryDocumentStore>, CollectionRegistry) {
        let documents = Arc::new(MemoryDocumentStore::new());
        let registry = CollectionRegistry::new(documents.clone(), Duration::from_secs(60));
        (documents, registry)
    }

    fn toast() -> RecipePayload {
        RecipePayload {
            name: "toast and jam".to_owned(),
            directions: "toast the bread".to_owned(),
            ingredients: vec![Ingredient::new("bread", "1 slice")],
        }
    }

    #[tokio::test]
    async fn test_activate_returns_same_collection() {
        let (_, registry) = registry();
        let uid = Uid::new("u1");

        let first = registry.activate(&uid).await.unwrap();
        first.lock().await.create(toast()).await.unwrap();

        let second = registry.activate(&uid).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.recipes().len(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_forces_reload() {
        let (documents, registry) = registry();
        let uid = Uid::new("u1");

        let first = registry.activate(&uid).await.unwrap();
        registry.deactivate(&uid).await;
        assert!(!registry.is_active(&uid));

        let mut other = RecipeCollectionStore::new(documents, uid.clone());
        other.create(toast()).await.unwrap();

        let second = registry.activate(&uid).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.recipes().len(), 1);
    }

    #[tokio::test]
    async fn test_identities_do_not_share() {
        let (_, registry) = registry();
        let mine = registry.activate(&Uid::new("me")).await.unwrap();
        mine.lock().await.create(toast()).await.unwrap();

        let theirs = registry.activate(&Uid::new("them")).await.unwrap();
        assert!(theirs.lock().await.recipes().is_empty());
    }
}
