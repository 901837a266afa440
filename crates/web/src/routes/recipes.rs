//! Recipe page and recipe route handlers.
//!
//! The "Add Recipe" form posts every field together with the button that was
//! pressed. The whole form is applied to the session draft first, then the
//! action runs against the updated draft.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tower_sessions::Session;
use tracing::{error, warn};

use recipe_box_core::{Identity, IngredientField, Recipe, RecipeDraft, RecipeId, Uid};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAuth, load_draft, save_draft};
use crate::services::CollectionError;
use crate::state::AppState;

use super::PageQuery;

/// Title of the validation dialog.
pub const MISSING_INPUTS_TITLE: &str = "Missing Inputs!";

/// Body of the validation dialog.
pub const MISSING_INPUTS_TEXT: &str =
    "Please check the recipe inputs and make sure they are all entered!";

// =============================================================================
// Form Types
// =============================================================================

/// What the submitted "Add Recipe" form asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DraftAction {
    /// Only store the edited fields.
    #[default]
    Update,
    /// "Add Ingredient".
    AddIngredient,
    /// The ✗ button on a row.
    RemoveIngredient(usize),
    /// "Save Recipe".
    Save,
}

/// Rejected form input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftFormError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("malformed ingredient field: {0}")]
    BadIngredientField(String),
}

/// A parsed "Add Recipe" form submission.
///
/// Fields: `name`, `directions`, `ingredient-{index}-name`,
/// `ingredient-{index}-amount` and `action` (`save`, `add` or `remove:{index}`).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DraftForm {
    pub name: Option<String>,
    pub directions: Option<String>,
    pub rows: Vec<(usize, IngredientField, String)>,
    pub action: DraftAction,
}

impl DraftForm {
    /// Parse url-encoded pairs. Unrecognised keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DraftFormError` for an unknown action or a malformed
    /// ingredient key.
    pub fn from_fields(fields: Vec<(String, String)>) -> std::result::Result<Self, DraftFormError> {
        let mut form = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                "name" => form.name = Some(value),
                "directions" => form.directions = Some(value),
                "action" => form.action = parse_action(&value)?,
                _ => {
                    if let Some(rest) = key.strip_prefix("ingredient-") {
                        let (index, field) = parse_ingredient_key(rest)
                            .ok_or_else(|| DraftFormError::BadIngredientField(key.clone()))?;
                        form.rows.push((index, field, value));
                    }
                }
            }
        }
        Ok(form)
    }

    /// Copy the submitted field values into `draft`.
    ///
    /// Values for rows the draft does not have are dropped.
    pub fn apply_to(&self, draft: &mut RecipeDraft) {
        if let Some(name) = &self.name {
            draft.name.clone_from(name);
        }
        if let Some(directions) = &self.directions {
            draft.directions.clone_from(directions);
        }
        for (index, field, value) in &self.rows {
            draft.ingredients.update(*index, *field, value.as_str());
        }
    }
}

fn parse_action(value: &str) -> std::result::Result<DraftAction, DraftFormError> {
    let unknown = || DraftFormError::UnknownAction(value.to_owned());
    match value {
        "" | "update" => Ok(DraftAction::Update),
        "add" => Ok(DraftAction::AddIngredient),
        "save" => Ok(DraftAction::Save),
        other => other
            .strip_prefix("remove:")
            .and_then(|index| index.parse().ok())
            .map(DraftAction::RemoveIngredient)
            .ok_or_else(unknown),
    }
}

/// `"{index}-{field}"` to its parts.
fn parse_ingredient_key(rest: &str) -> Option<(usize, IngredientField)> {
    let (index, field) = rest.split_once('-')?;
    Some((index.parse().ok()?, field.parse().ok()?))
}

// =============================================================================
// Templates
// =============================================================================

/// One editable ingredient row.
pub struct RowView {
    pub index: usize,
    pub name: String,
    pub amount: String,
    pub removable: bool,
}

impl RowView {
    pub fn name_class(&self) -> &'static str {
        validity_class(&self.name)
    }

    pub fn amount_class(&self) -> &'static str {
        validity_class(&self.amount)
    }
}

/// Bootstrap feedback class for a required text input.
const fn validity_class(value: &str) -> &'static str {
    if value.is_empty() {
        "is-invalid"
    } else {
        "is-valid"
    }
}

/// Signed-in recipe page.
#[derive(Template, WebTemplate)]
#[template(path = "recipes/index.html")]
pub struct RecipesTemplate {
    pub display_name: String,
    pub draft_name: String,
    pub draft_directions: String,
    pub rows: Vec<RowView>,
    pub recipes: Vec<Recipe>,
    pub missing_inputs: bool,
    pub missing_inputs_title: &'static str,
    pub missing_inputs_text: &'static str,
    pub error: Option<&'static str>,
}

impl RecipesTemplate {
    pub fn name_class(&self) -> &'static str {
        validity_class(&self.draft_name)
    }

    pub fn directions_class(&self) -> &'static str {
        validity_class(&self.draft_directions)
    }

    fn new(identity: Identity, draft: &RecipeDraft, recipes: Vec<Recipe>, query: &PageQuery) -> Self {
        let rows = draft
            .ingredients
            .iter()
            .enumerate()
            .map(|(index, row)| RowView {
                index,
                name: row.name.clone(),
                amount: row.amount.clone(),
                removable: draft.ingredients.is_removable(index),
            })
            .collect();

        Self {
            display_name: identity.display_name,
            draft_name: draft.name.clone(),
            draft_directions: draft.directions.clone(),
            rows,
            recipes,
            missing_inputs: query.invalid.is_some(),
            missing_inputs_title: MISSING_INPUTS_TITLE,
            missing_inputs_text: MISSING_INPUTS_TEXT,
            error: query.error_message(),
        }
    }
}

/// Render the recipe page for a signed-in identity, activating its
/// collection if this is its first request.
///
/// # Errors
///
/// Returns `AppError::Collection` if the collection cannot be loaded.
pub async fn recipe_page(
    state: &AppState,
    session: &Session,
    identity: Identity,
    query: &PageQuery,
) -> Result<Response> {
    let collection = state.collections().activate(&identity.uid).await?;
    let recipes = collection.lock().await.recipes().to_vec();
    let draft = load_draft(session).await?;

    Ok(RecipesTemplate::new(identity, &draft, recipes, query).into_response())
}

// =============================================================================
// Handlers
// =============================================================================

/// Apply an "Add Recipe" form submission.
pub async fn update_draft(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = DraftForm::from_fields(fields).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut draft = load_draft(&session).await?;
    form.apply_to(&mut draft);

    let target = match form.action {
        DraftAction::Update => "/",
        DraftAction::AddIngredient => {
            draft.ingredients.insert();
            "/#ingredients"
        }
        DraftAction::RemoveIngredient(index) => {
            draft.ingredients.remove_at(index);
            "/#ingredients"
        }
        DraftAction::Save if !draft.is_submittable() => "/?invalid=1",
        DraftAction::Save => match save_recipe(&state, &user.identity.uid, &draft).await {
            Ok(recipe) => {
                add_breadcrumb(
                    "recipes",
                    "Saved recipe",
                    Some(&[("recipe_id", recipe.id.as_str())][..]),
                );
                draft.reset();
                "/"
            }
            Err(e) => {
                error!(uid = %user.identity.uid, error = %e, "Failed to save recipe");
                "/?error=save"
            }
        },
    };

    save_draft(&session, &draft).await?;
    Ok(Redirect::to(target).into_response())
}

/// Write `draft` to the identity's collection, loading it first if needed.
async fn save_recipe(
    state: &AppState,
    uid: &Uid,
    draft: &RecipeDraft,
) -> std::result::Result<Recipe, CollectionError> {
    let collection = state.collections().activate(uid).await?;
    let mut recipes = collection.lock().await;
    recipes.create(draft.to_recipe_payload()).await
}

/// Delete one of the signed-in user's recipes.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let uid = &user.identity.uid;
    let id = RecipeId::new(id);
    match remove_recipe(&state, uid, &id).await {
        Ok(()) => {
            add_breadcrumb(
                "recipes",
                "Removed recipe",
                Some(&[("recipe_id", id.as_str())][..]),
            );
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            warn!(uid = %uid, recipe_id = %id, error = %e, "Failed to remove recipe");
            Ok(Redirect::to("/?error=remove").into_response())
        }
    }
}

async fn remove_recipe(
    state: &AppState,
    uid: &Uid,
    id: &RecipeId,
) -> std::result::Result<(), CollectionError> {
    let collection = state.collections().activate(uid).await?;
    let mut recipes = collection.lock().await;
    recipes.remove(id).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_parse_full_form() {
        let form = DraftForm::from_fields(fields(&[
            ("name", "cereal"),
            ("directions", "pour cereal into a bowl"),
            ("ingredient-0-name", "milk"),
            ("ingredient-0-amount", "1/2 cup"),
            ("action", "save"),
            ("csrf", "ignored"),
        ]))
        .unwrap();

        assert_eq!(form.name.as_deref(), Some("cereal"));
        assert_eq!(form.rows.len(), 2);
        assert_eq!(form.rows[1], (0, IngredientField::Amount, "1/2 cup".to_owned()));
        assert_eq!(form.action, DraftAction::Save);
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse_action("add").unwrap(), DraftAction::AddIngredient);
        assert_eq!(parse_action("remove:2").unwrap(), DraftAction::RemoveIngredient(2));
        assert_eq!(parse_action("").unwrap(), DraftAction::Update);
        assert!(parse_action("remove:x").is_err());
        assert!(parse_action("publish").is_err());
    }

    #[test]
    fn test_bad_ingredient_key() {
        let err = DraftForm::from_fields(fields(&[("ingredient-0-colour", "red")])).unwrap_err();
        assert_eq!(err, DraftFormError::BadIngredientField("ingredient-0-colour".to_owned()));
    }

    #[test]
    fn test_apply_ignores_missing_rows() {
        let form = DraftForm::from_fields(fields(&[
            ("name", "toast and jam"),
            ("ingredient-0-name", "bread"),
            ("ingredient-3-name", "jam"),
        ]))
        .unwrap();

        let mut draft = RecipeDraft::new();
        form.apply_to(&mut draft);
        assert_eq!(draft.name, "toast and jam");
        assert_eq!(draft.ingredients.len(), 1);
        assert_eq!(draft.ingredients.get(0).unwrap().name, "bread");
    }

    #[test]
    fn test_template_marks_first_row_fixed() {
        let mut draft = RecipeDraft::new();
        draft.ingredients.insert();
        let page = RecipesTemplate::new(
            Identity::new("u1", "Test User"),
            &draft,
            Vec::new(),
            &PageQuery::default(),
        );
        assert!(!page.rows[0].removable);
        assert!(page.rows[1].removable);
        assert!(!page.missing_inputs);
    }

    #[test]
    fn test_inputs_carry_validity_classes() {
        let mut draft = RecipeDraft::new();
        draft.name = "rice".to_owned();
        draft.ingredients.update(0, IngredientField::Name, "rice");
        let html = RecipesTemplate::new(
            Identity::new("u1", "Test User"),
            &draft,
            Vec::new(),
            &PageQuery::default(),
        )
        .render()
        .unwrap();

        assert!(html.contains(r#"class="form-control is-valid" id="recipe-name""#));
        assert!(html.contains(r#"class="form-control is-invalid" id="recipe-directions""#));
        assert!(html.contains(r#"class="form-control is-valid" name="ingredient-0-name""#));
        assert!(html.contains(r#"class="form-control is-invalid" name="ingredient-0-amount""#));
    }

    #[test]
    fn test_recipe_cards_number_ingredients() {
        let recipe = Recipe {
            id: RecipeId::new("a"),
            name: "toast and jam".to_owned(),
            directions: "toast the bread, spread the jam".to_owned(),
            ingredients: vec![
                recipe_box_core::Ingredient::new("bread", "1 slice"),
                recipe_box_core::Ingredient::new("jam", "1 tbsp"),
            ],
        };
        let html = RecipesTemplate::new(
            Identity::new("u1", "Test User"),
            &RecipeDraft::new(),
            vec![recipe],
            &PageQuery::default(),
        )
        .render()
        .unwrap();

        assert!(html.contains("<td>2</td>"));
        assert!(html.contains("<td>jam</td>"));
    }
}
