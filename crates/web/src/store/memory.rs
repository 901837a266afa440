//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{CollectionPath, Document, DocumentRef, DocumentStore, StoreError};

/// Document store kept in memory, preserving insertion order per collection.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<CollectionPath, Vec<Document>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub async fn count(&self, collection: &CollectionPath) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn set(&self, doc: &DocumentRef, body: &Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(doc.collection.clone()).or_default();
        match docs.iter_mut().find(|d| d.id == doc.id) {
            Some(existing) => existing.body = body.clone(),
            None => docs.push(Document {
                id: doc.id.clone(),
                body: body.clone(),
            }),
        }
        Ok(())
    }

    async fn create(&self, doc: &DocumentRef, body: &Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(doc.collection.clone()).or_default();
        if docs.iter().any(|d| d.id == doc.id) {
            return Err(StoreError::AlreadyExists(doc.path()));
        }
        docs.push(Document {
            id: doc.id.clone(),
            body: body.clone(),
        });
        Ok(())
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        if let Some(docs) = self.collections.write().await.get_mut(&doc.collection) {
            docs.retain(|d| d.id != doc.id);
        }
        Ok(())
    }
}
