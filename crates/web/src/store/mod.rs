//! Document store collaborator.
//!
//! Recipes live in a document database addressed by slash-separated
//! collection paths (`users/{uid}/recipes`). Each document has a store-assigned
//! id and a JSON body; the id is never part of the body.
//!
//! The core only needs five capabilities, captured by [`DocumentStore`]:
//!
//! | Operation | Meaning |
//! |---|---|
//! | [`get`](DocumentStore::get) | every document in a collection, in creation order |
//! | [`doc`](DocumentStore::doc) | a handle with a fresh id |
//! | [`set`](DocumentStore::set) | write a body, replacing any existing one |
//! | [`create`](DocumentStore::create) | write a body, failing if the id exists |
//! | [`delete`](DocumentStore::delete) | remove a document; missing documents are fine |
//!
//! # Backends
//!
//! - [`crate::db::documents::PgDocumentStore`] - `PostgreSQL` `documents` table
//! - [`memory::MemoryDocumentStore`] - in-process, used by tests

pub mod memory;

use core::fmt;

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::Value;
use thiserror::Error;

use recipe_box_core::Uid;

pub use memory::MemoryDocumentStore;

/// Length of generated document ids.
pub const DOCUMENT_ID_LENGTH: usize = 20;

/// Errors reported by a document store backend.
///
/// Messages are captured as strings so the error can be cloned into every
/// waiter of a shared collection load.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or rejected the request.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// `create` targeted an id that already exists.
    #[error("document already exists: {0}")]
    AlreadyExists(String),

    /// A stored body could not be decoded.
    #[error("malformed document {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// A slash-separated collection path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Path of the recipe collection owned by `uid`.
    #[must_use]
    pub fn user_recipes(uid: &Uid) -> Self {
        Self(format!("users/{uid}/recipes"))
    }

    /// Wrap an arbitrary path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Handle for an existing document id in this collection.
    #[must_use]
    pub fn doc_ref(&self, id: impl Into<String>) -> DocumentRef {
        DocumentRef {
            collection: self.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub collection: CollectionPath,
    pub id: String,
}

impl DocumentRef {
    /// Full path, `collection/id`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

/// A document read back from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

/// Generate a fresh alphanumeric document id.
#[must_use]
pub fn new_document_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// The document database the recipe collections are stored in.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection`, oldest first.
    async fn get(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError>;

    /// A handle to a new document with a freshly generated id.
    ///
    /// Nothing is written until `set` or `create` is called on it.
    fn doc(&self, collection: &CollectionPath) -> DocumentRef {
        collection.doc_ref(new_document_id())
    }

    /// Write `body` at `doc`, replacing any existing body.
    async fn set(&self, doc: &DocumentRef, body: &Value) -> Result<(), StoreError>;

    /// Write `body` at `doc`, failing with [`StoreError::AlreadyExists`] if present.
    async fn create(&self, doc: &DocumentRef, body: &Value) -> Result<(), StoreError>;

    /// Remove `doc`. Deleting a document that does not exist succeeds.
    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError>;
}
