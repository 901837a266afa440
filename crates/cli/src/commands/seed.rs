//! Seed the database with a test account and sample recipes.
//!
//! The account is created if its email is not registered yet and reused
//! otherwise. Recipes are written with `create`, all at once, under fresh
//! document ids, so running the command twice adds a second set.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::info;

use recipe_box_core::{RecipePayload, Uid};
use recipe_box_web::db::{self, PgDocumentStore};
use recipe_box_web::models::Account;
use recipe_box_web::services::auth::AuthService;
use recipe_box_web::services::recipes::payload_body;
use recipe_box_web::store::{CollectionPath, DocumentRef, DocumentStore, StoreError};

use super::migrate::database_url;

/// Contents of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub account: SeedAccount,
    pub recipes: Vec<RecipePayload>,
}

/// The account the recipes belong to.
#[derive(Debug, Deserialize)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Errors while writing seed recipes.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to encode recipe: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to create recipe: {0}")]
    Store(#[from] StoreError),

    #[error("seed task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Seed from the YAML file at `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the database is
/// unreachable, or any recipe fails to be created.
pub async fn run(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(recipes = seed.recipes.len(), "Parsed seed file");

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let account = ensure_account(&AuthService::new(&pool), &seed.account).await?;
    info!(uid = %account.uid, email = %account.email, "Using seed account");

    let documents: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(pool));
    let created = create_recipes(documents, &account.uid, seed.recipes).await?;

    info!("Seeding complete!");
    for doc in &created {
        info!("  Created {}", doc.path());
    }
    Ok(())
}

async fn ensure_account(
    auth: &AuthService<'_>,
    account: &SeedAccount,
) -> Result<Account, Box<dyn std::error::Error>> {
    if let Some(existing) = auth.find_account(&account.email).await? {
        return Ok(existing);
    }
    Ok(auth
        .register_with_password(&account.email, &account.password, &account.display_name)
        .await?)
}

/// Create every recipe in `uid`'s collection concurrently.
///
/// Returns the created documents in input order.
///
/// # Errors
///
/// Returns the first failure. Recipes whose writes already completed stay
/// in the store.
pub async fn create_recipes(
    documents: Arc<dyn DocumentStore>,
    uid: &Uid,
    recipes: Vec<RecipePayload>,
) -> Result<Vec<DocumentRef>, SeedError> {
    let collection = CollectionPath::user_recipes(uid);
    let mut tasks = JoinSet::new();

    for (position, recipe) in recipes.into_iter().enumerate() {
        let documents = Arc::clone(&documents);
        let doc = documents.doc(&collection);
        tasks.spawn(async move {
            let body = payload_body(&recipe)?;
            documents.create(&doc, &body).await?;
            Ok::<_, SeedError>((position, doc))
        });
    }

    let mut created = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        created.push(joined??);
    }
    created.sort_by_key(|(position, _)| *position);
    Ok(created.into_iter().map(|(_, doc)| doc).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use recipe_box_web::services::RecipeCollectionStore;
    use recipe_box_web::store::MemoryDocumentStore;

    use super::*;

    const SEED_FILE: &str = include_str!("../../seed/recipes.yaml");

    #[test]
    fn test_bundled_seed_file_parses() {
        let seed: SeedFile = serde_yaml::from_str(SEED_FILE).unwrap();
        assert_eq!(seed.account.email, "test@example.com");
        assert_eq!(seed.account.display_name, "Test User");

        let names: Vec<&str> = seed.recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["toast and jam", "cereal", "rice"]);
        assert_eq!(seed.recipes[1].ingredients[1].amount, "1/2 cup");
    }

    #[tokio::test]
    async fn test_create_recipes_writes_every_recipe() {
        let seed: SeedFile = serde_yaml::from_str(SEED_FILE).unwrap();
        let documents = Arc::new(MemoryDocumentStore::new());
        let uid = Uid::new("seed-user");

        let created = create_recipes(documents.clone(), &uid, seed.recipes.clone())
            .await
            .unwrap();
        assert_eq!(created.len(), 3);

        let mut collection = RecipeCollectionStore::new(documents, uid);
        let loaded = collection.load().await.unwrap();
        assert_eq!(loaded.len(), 3);
        for recipe in loaded {
            assert!(created.iter().any(|doc| doc.id == recipe.id.as_str()));
            assert!(seed.recipes.contains(&recipe.payload()));
        }
    }
}
