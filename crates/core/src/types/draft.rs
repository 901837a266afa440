//! The in-progress recipe behind the "Add Recipe" form.

use serde::{Deserialize, Serialize};

use super::ingredient::IngredientRows;
use super::recipe::RecipePayload;

/// A recipe being composed, not yet persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub directions: String,
    pub ingredients: IngredientRows,
}

impl RecipeDraft {
    /// An empty draft with a single empty ingredient row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the draft may be persisted.
    ///
    /// Requires a name, directions, and every ingredient row complete.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.name.is_empty() && !self.directions.is_empty() && self.ingredients.all_complete()
    }

    /// The document body to write for this draft.
    ///
    /// Incomplete rows are dropped; this only matters if the caller skipped
    /// [`is_submittable`](Self::is_submittable).
    #[must_use]
    pub fn to_recipe_payload(&self) -> RecipePayload {
        RecipePayload {
            name: self.name.clone(),
            directions: self.directions.clone(),
            ingredients: self.ingredients.complete_rows(),
        }
    }

    /// Clear every field back to a fresh draft.
    ///
    /// Call only after the payload was confirmed written.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ingredient::{Ingredient, IngredientField};

    fn cereal_draft() -> RecipeDraft {
        let mut draft = RecipeDraft {
            name: "cereal".to_owned(),
            directions: "pour".to_owned(),
            ..RecipeDraft::default()
        };
        draft.ingredients.update(0, IngredientField::Name, "milk");
        draft.ingredients.update(0, IngredientField::Amount, "1 cup");
        draft.ingredients.insert();
        draft
    }

    #[test]
    fn test_cereal_with_trailing_empty_row() {
        let draft = cereal_draft();
        assert!(!draft.is_submittable());

        let payload = draft.to_recipe_payload();
        assert_eq!(payload.name, "cereal");
        assert_eq!(payload.directions, "pour");
        assert_eq!(payload.ingredients, vec![Ingredient::new("milk", "1 cup")]);
    }

    #[test]
    fn test_submittable_requires_every_part() {
        let mut draft = cereal_draft();
        draft.ingredients.remove_at(1);
        assert!(draft.is_submittable());

        let mut no_name = draft.clone();
        no_name.name.clear();
        assert!(!no_name.is_submittable());

        let mut no_directions = draft.clone();
        no_directions.directions.clear();
        assert!(!no_directions.is_submittable());

        let mut half_row = draft;
        half_row.ingredients.update(0, IngredientField::Amount, "");
        assert!(!half_row.is_submittable());
    }

    #[test]
    fn test_fresh_draft_is_not_submittable() {
        assert!(!RecipeDraft::new().is_submittable());
    }

    #[test]
    fn test_payload_drops_only_incomplete_rows() {
        let mut draft = RecipeDraft::new();
        for (i, (name, amount)) in [("a", "1"), ("b", "2"), ("c", "3")].iter().enumerate() {
            if i > 0 {
                draft.ingredients.insert();
            }
            draft.ingredients.update(i, IngredientField::Name, *name);
            draft.ingredients.update(i, IngredientField::Amount, *amount);
        }
        draft.ingredients.insert();
        draft.ingredients.update(3, IngredientField::Name, "half");

        assert_eq!(draft.to_recipe_payload().ingredients.len(), 3);
    }

    #[test]
    fn test_reset() {
        let mut draft = cereal_draft();
        draft.reset();
        assert_eq!(draft, RecipeDraft::new());
        assert_eq!(draft.ingredients.len(), 1);
    }

    #[test]
    fn test_session_roundtrip_keeps_rows() {
        let draft = cereal_draft();
        let json = serde_json::to_string(&draft).unwrap();
        let back: RecipeDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(back, draft);
    }
}
