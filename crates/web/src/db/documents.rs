//! `PostgreSQL` document store.
//!
//! Every collection shares the `documents` table; rows are keyed by
//! `(collection, id)` and listed in creation order.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use crate::store::{CollectionPath, Document, DocumentRef, DocumentStore, StoreError};

/// Document store backed by the `documents` table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for collection listing.
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    body: Value,
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, body
            FROM documents
            WHERE collection = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        debug!(collection = %collection, count = rows.len(), "Listed documents");
        Ok(rows
            .into_iter()
            .map(|r| Document {
                id: r.id,
                body: r.body,
            })
            .collect())
    }

    async fn set(&self, doc: &DocumentRef, body: &Value) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
            ",
        )
        .bind(doc.collection.as_str())
        .bind(&doc.id)
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create(&self, doc: &DocumentRef, body: &Value) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(doc.collection.as_str())
        .bind(&doc.id)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::AlreadyExists(doc.path());
            }
            StoreError::from(e)
        })?;

        Ok(())
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(doc.collection.as_str())
            .bind(&doc.id)
            .execute(&self.pool)
            .await?;

        debug!(path = %doc.path(), rows = result.rows_affected(), "Deleted document");
        Ok(())
    }
}
