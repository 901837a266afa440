//! Core types for Recipe Box.

pub mod draft;
pub mod email;
pub mod id;
pub mod identity;
pub mod ingredient;
pub mod recipe;

pub use draft::RecipeDraft;
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{GateState, Identity};
pub use ingredient::{Ingredient, IngredientField, IngredientRows, UnknownField};
pub use recipe::{Recipe, RecipePayload};
