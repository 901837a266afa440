//! Recipe collection store behaviour against a document store.
//!
//! Covers the mirror/store agreement, failure handling, and write
//! serialization through the per-identity registry.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use recipe_box_core::{Ingredient, RecipeDraft, RecipeId, RecipePayload, Uid};
use recipe_box_integration_tests::FlakyStore;
use recipe_box_web::services::{CollectionError, CollectionRegistry, RecipeCollectionStore, WriteOp};
use recipe_box_web::store::{CollectionPath, DocumentStore};

fn payload(name: &str) -> RecipePayload {
    RecipePayload {
        name: name.to_owned(),
        directions: format!("make {name}"),
        ingredients: vec![Ingredient::new("water", "1 cup")],
    }
}

async fn stored_ids(store: &FlakyStore, uid: &Uid) -> Vec<String> {
    store
        .inner
        .get(&CollectionPath::user_recipes(uid))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect()
}

// =============================================================================
// Mirror and store agreement
// =============================================================================

#[tokio::test]
async fn test_mirror_matches_store_after_create_and_remove() {
    let store = Arc::new(FlakyStore::new());
    let uid = Uid::new("u1");
    let mut recipes = RecipeCollectionStore::new(store.clone(), uid.clone());
    recipes.load().await.unwrap();

    let toast = recipes.create(payload("toast")).await.unwrap();
    let rice = recipes.create(payload("rice")).await.unwrap();
    recipes.remove(&toast.id).await.unwrap();

    let mirror: Vec<String> = recipes.recipes().iter().map(|r| r.id.to_string()).collect();
    assert_eq!(mirror, vec![rice.id.to_string()]);
    assert_eq!(stored_ids(&store, &uid).await, mirror);
}

#[tokio::test]
async fn test_fresh_store_sees_earlier_writes() {
    let store = Arc::new(FlakyStore::new());
    let uid = Uid::new("u1");

    let mut first = RecipeCollectionStore::new(store.clone(), uid.clone());
    first.load().await.unwrap();
    let created = first.create(payload("cereal")).await.unwrap();

    let mut second = RecipeCollectionStore::new(store.clone(), uid);
    let loaded = second.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], created);
}

#[tokio::test]
async fn test_collections_are_isolated_per_identity() {
    let store = Arc::new(FlakyStore::new());
    let mut alice = RecipeCollectionStore::new(store.clone(), Uid::new("alice"));
    let mut bob = RecipeCollectionStore::new(store.clone(), Uid::new("bob"));
    alice.load().await.unwrap();
    bob.load().await.unwrap();

    alice.create(payload("toast")).await.unwrap();

    assert_eq!(alice.recipes().len(), 1);
    assert!(bob.recipes().is_empty());
    assert!(stored_ids(&store, &Uid::new("bob")).await.is_empty());
}

#[tokio::test]
async fn test_submitted_draft_is_stored_verbatim() {
    let store = Arc::new(FlakyStore::new());
    let uid = Uid::new("u1");
    let mut recipes = RecipeCollectionStore::new(store.clone(), uid.clone());
    recipes.load().await.unwrap();

    let mut draft = RecipeDraft::new();
    draft.name = "cereal".to_owned();
    draft.directions = "pour cereal into a bowl".to_owned();
    draft.ingredients.update(0, recipe_box_core::IngredientField::Name, "cereal");
    draft.ingredients.update(0, recipe_box_core::IngredientField::Amount, "1 cup");
    assert!(draft.is_submittable());

    let recipe = recipes.create(draft.to_recipe_payload()).await.unwrap();
    assert_eq!(recipe.payload(), draft.to_recipe_payload());

    let docs = store.inner.get(&CollectionPath::user_recipes(&uid)).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert!(docs[0].body.get("id").is_none());
    assert_eq!(docs[0].body["name"], "cereal");
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_failed_create_leaves_mirror_untouched() {
    let store = Arc::new(FlakyStore::new());
    let uid = Uid::new("u1");
    let mut recipes = RecipeCollectionStore::new(store.clone(), uid.clone());
    recipes.load().await.unwrap();
    recipes.create(payload("toast")).await.unwrap();

    store.fail_writes(true);
    let err = recipes.create(payload("rice")).await.unwrap_err();

    assert!(matches!(err, CollectionError::WriteFailed { op: WriteOp::Create, .. }));
    assert_eq!(recipes.recipes().len(), 1);
    assert_eq!(stored_ids(&store, &uid).await.len(), 1);
}

#[tokio::test]
async fn test_failed_remove_keeps_recipe() {
    let store = Arc::new(FlakyStore::new());
    let mut recipes = RecipeCollectionStore::new(store.clone(), Uid::new("u1"));
    recipes.load().await.unwrap();
    let toast = recipes.create(payload("toast")).await.unwrap();

    store.fail_writes(true);
    let err = recipes.remove(&toast.id).await.unwrap_err();

    assert!(matches!(err, CollectionError::WriteFailed { op: WriteOp::Delete, .. }));
    assert_eq!(recipes.recipes()[0].id, toast.id);
}

#[tokio::test]
async fn test_removing_unknown_id_is_a_no_op() {
    let store = Arc::new(FlakyStore::new());
    let mut recipes = RecipeCollectionStore::new(store, Uid::new("u1"));
    recipes.load().await.unwrap();
    recipes.create(payload("toast")).await.unwrap();

    recipes.remove(&RecipeId::new("does-not-exist")).await.unwrap();
    assert_eq!(recipes.recipes().len(), 1);
}

#[tokio::test]
async fn test_load_failure_is_reported_and_not_cached() {
    let store = Arc::new(FlakyStore::new());
    let registry = CollectionRegistry::new(store.clone(), Duration::from_secs(60));
    let uid = Uid::new("u1");

    store.fail_reads(true);
    let err = registry.activate(&uid).await.err().unwrap();
    assert!(matches!(err, CollectionError::LoadFailed { .. }));
    assert!(!registry.is_active(&uid));

    store.fail_reads(false);
    registry.activate(&uid).await.unwrap();
    assert!(registry.is_active(&uid));
}

// =============================================================================
// Registry
// =============================================================================

#[tokio::test]
async fn test_concurrent_creates_for_one_identity_all_land() {
    let store = Arc::new(FlakyStore::new());
    let registry = Arc::new(CollectionRegistry::new(store.clone(), Duration::from_secs(60)));
    let uid = Uid::new("u1");

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let registry = registry.clone();
        let uid = uid.clone();
        tasks.spawn(async move {
            let collection = registry.activate(&uid).await.unwrap();
            let mut guard = collection.lock().await;
            guard.create(payload(&format!("recipe {i}"))).await.unwrap();
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    let collection = registry.activate(&uid).await.unwrap();
    let mirror: Vec<String> = collection
        .lock()
        .await
        .recipes()
        .iter()
        .map(|r| r.id.to_string())
        .collect();
    assert_eq!(mirror.len(), 16);
    assert_eq!(stored_ids(&store, &uid).await, mirror);
}

#[tokio::test]
async fn test_deactivated_collection_reloads_from_store() {
    let store = Arc::new(FlakyStore::new());
    let registry = CollectionRegistry::new(store.clone(), Duration::from_secs(60));
    let uid = Uid::new("u1");

    let collection = registry.activate(&uid).await.unwrap();
    collection.lock().await.create(payload("toast")).await.unwrap();
    registry.deactivate(&uid).await;
    assert!(!registry.is_active(&uid));

    let reloaded = registry.activate(&uid).await.unwrap();
    assert!(!Arc::ptr_eq(&collection, &reloaded));
    assert_eq!(reloaded.lock().await.recipes().len(), 1);
}
