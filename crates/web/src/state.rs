//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::WebConfig;
use crate::db::PgDocumentStore;
use crate::services::CollectionRegistry;
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: PgPool,
    collections: CollectionRegistry,
}

impl AppState {
    /// Create application state storing recipes in `PostgreSQL`.
    #[must_use]
    pub fn new(config: WebConfig, pool: PgPool) -> Self {
        let documents = Arc::new(PgDocumentStore::new(pool.clone()));
        Self::with_documents(config, pool, documents)
    }

    /// Create application state with an explicit document store.
    #[must_use]
    pub fn with_documents(
        config: WebConfig,
        pool: PgPool,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        let collections = CollectionRegistry::new(documents, config.collection_idle);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                collections,
            }),
        }
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the registry of loaded recipe collections.
    #[must_use]
    pub fn collections(&self) -> &CollectionRegistry {
        &self.inner.collections
    }
}
