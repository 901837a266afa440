//! Recipe collection of one identity.
//!
//! [`RecipeCollectionStore`] mirrors the documents under `users/{uid}/recipes`.
//! The mirror only changes after the document store confirms a write: a
//! failed create adds nothing and a failed delete leaves the entry in place.
//! Order is load order with creates appended; nothing is sorted.

use core::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use recipe_box_core::{Recipe, RecipeId, RecipePayload, Uid};

use crate::store::{CollectionPath, Document, DocumentStore, StoreError};

/// Which write was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Delete => "delete",
        })
    }
}

/// Failures of collection operations. Neither is retried.
#[derive(Debug, Clone, Error)]
pub enum CollectionError {
    /// The identity's recipes could not be fetched.
    #[error("failed to load recipes for {uid}: {source}")]
    LoadFailed { uid: Uid, source: StoreError },

    /// A create or delete was rejected by the document store.
    #[error("failed to {op} recipe: {source}")]
    WriteFailed { op: WriteOp, source: StoreError },
}

/// The persisted recipes of a single identity plus their in-memory mirror.
pub struct RecipeCollectionStore {
    documents: Arc<dyn DocumentStore>,
    uid: Uid,
    collection: CollectionPath,
    mirror: Vec<Recipe>,
}

impl RecipeCollectionStore {
    /// A store for `uid` with an empty mirror. Call [`load`](Self::load) next.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, uid: Uid) -> Self {
        let collection = CollectionPath::user_recipes(&uid);
        Self {
            documents,
            uid,
            collection,
            mirror: Vec::new(),
        }
    }

    #[must_use]
    pub const fn uid(&self) -> &Uid {
        &self.uid
    }

    #[must_use]
    pub const fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// The mirrored recipes in collection order.
    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        &self.mirror
    }

    /// Replace the mirror with every document in the collection.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::LoadFailed` if the listing fails or a
    /// document body is not a recipe. The mirror is left as it was.
    pub async fn load(&mut self) -> Result<&[Recipe], CollectionError> {
        let load_failed = |source| CollectionError::LoadFailed {
            uid: self.uid.clone(),
            source,
        };

        let docs = self.documents.get(&self.collection).await.map_err(load_failed)?;
        let recipes = docs
            .into_iter()
            .map(|doc| decode_recipe(&self.collection, doc))
            .collect::<Result<Vec<_>, _>>()
            .map_err(load_failed)?;

        info!(uid = %self.uid, count = recipes.len(), "Loaded recipes");
        self.mirror = recipes;
        Ok(&self.mirror)
    }

    /// Persist `payload` as a new document and append it to the mirror.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::WriteFailed` if the store rejects the write;
    /// the mirror is unchanged.
    pub async fn create(&mut self, payload: RecipePayload) -> Result<Recipe, CollectionError> {
        let write_failed = |source| CollectionError::WriteFailed {
            op: WriteOp::Create,
            source,
        };

        let body = serde_json::to_value(&payload).map_err(|e| {
            write_failed(StoreError::Malformed {
                path: self.collection.to_string(),
                reason: e.to_string(),
            })
        })?;
        let doc = self.documents.doc(&self.collection);
        self.documents.set(&doc, &body).await.map_err(write_failed)?;

        let recipe = Recipe::from_payload(RecipeId::new(doc.id), payload);
        info!(uid = %self.uid, recipe_id = %recipe.id, "Created recipe");
        self.mirror.push(recipe.clone());
        Ok(recipe)
    }

    /// Delete the document `id` and drop it from the mirror.
    ///
    /// The delete is sent even when `id` is not mirrored.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::WriteFailed` if the store rejects the delete;
    /// the mirror entry stays so the user can retry.
    pub async fn remove(&mut self, id: &RecipeId) -> Result<(), CollectionError> {
        let doc = self.collection.doc_ref(id.as_str());
        self.documents
            .delete(&doc)
            .await
            .map_err(|source| CollectionError::WriteFailed {
                op: WriteOp::Delete,
                source,
            })?;

        let before = self.mirror.len();
        self.mirror.retain(|recipe| &recipe.id != id);
        debug!(
            uid = %self.uid,
            recipe_id = %id,
            mirrored = before != self.mirror.len(),
            "Removed recipe"
        );
        Ok(())
    }
}

fn decode_recipe(collection: &CollectionPath, doc: Document) -> Result<Recipe, StoreError> {
    let payload: RecipePayload =
        serde_json::from_value::<RecipePayload>(doc.body).map_err(|e| StoreError::Malformed {
            path: collection.doc_ref(doc.id.as_str()).path(),
            reason: e.to_string(),
        })?;
    Ok(Recipe::from_payload(RecipeId::new(doc.id), payload))
}

/// Document body for a payload, as the seed command writes it.
///
/// # Errors
///
/// Returns the serialization error, which cannot happen for string fields.
pub fn payload_body(payload: &RecipePayload) -> Result<Value, serde_json::Error> {
    serde_json::to_value(payload)
}
