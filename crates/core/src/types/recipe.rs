//! Persisted recipe types.

use serde::{Deserialize, Serialize};

use super::id::RecipeId;
use super::ingredient::Ingredient;

/// The stored body of a recipe document.
///
/// This is exactly what is written to the document store; the document id is
/// never embedded in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipePayload {
    pub name: String,
    pub directions: String,
    pub ingredients: Vec<Ingredient>,
}

/// A recipe that exists in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Assigned by the document store on creation; immutable afterwards.
    pub id: RecipeId,
    pub name: String,
    pub directions: String,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Attach a store-assigned id to a payload.
    #[must_use]
    pub fn from_payload(id: RecipeId, payload: RecipePayload) -> Self {
        Self {
            id,
            name: payload.name,
            directions: payload.directions,
            ingredients: payload.ingredients,
        }
    }

    /// The recipe without its id.
    #[must_use]
    pub fn payload(&self) -> RecipePayload {
        RecipePayload {
            name: self.name.clone(),
            directions: self.directions.clone(),
            ingredients: self.ingredients.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_body_has_no_id() {
        let payload = RecipePayload {
            name: "toast and jam".to_owned(),
            directions: "put bread in the toaster".to_owned(),
            ingredients: vec![Ingredient::new("bread", "1 slice")],
        };
        let body = serde_json::to_value(&payload).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["ingredients"][0]["amount"], "1 slice");
    }

    #[test]
    fn test_from_payload_keeps_fields() {
        let payload = RecipePayload {
            name: "rice".to_owned(),
            directions: "boil then simmer".to_owned(),
            ingredients: vec![Ingredient::new("rice", "1 cup"), Ingredient::new("water", "2 cups")],
        };
        let recipe = Recipe::from_payload(RecipeId::new("r1"), payload.clone());
        assert_eq!(recipe.id.as_str(), "r1");
        assert_eq!(recipe.payload(), payload);
    }
}
