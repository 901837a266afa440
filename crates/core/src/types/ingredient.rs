//! Ingredient rows of a recipe being composed.
//!
//! [`IngredientRows`] is the editable, index-addressed list behind the
//! ingredient table of the "Add Recipe" form. Row 0 is mandatory, so the list
//! is never empty.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One `(name, amount)` pair.
///
/// Both fields are free text; the empty string means "not entered yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
}

impl Ingredient {
    /// Create an ingredient from its two fields.
    #[must_use]
    pub fn new(name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
        }
    }

    /// A row is complete when both fields are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.amount.is_empty()
    }
}

/// Which half of an ingredient row an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientField {
    Name,
    Amount,
}

impl IngredientField {
    /// The form/wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Amount => "amount",
        }
    }
}

impl fmt::Display for IngredientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a field name is neither `name` nor `amount`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown ingredient field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for IngredientField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "amount" => Ok(Self::Amount),
            other => Err(UnknownField(other.to_owned())),
        }
    }
}

/// Ordered, editable ingredient rows. Always holds at least one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Ingredient>", into = "Vec<Ingredient>")]
pub struct IngredientRows {
    rows: Vec<Ingredient>,
}

impl Default for IngredientRows {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientRows {
    /// A single empty row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: vec![Ingredient::default()],
        }
    }

    /// Append an empty row at the end.
    pub fn insert(&mut self) {
        self.rows.push(Ingredient::default());
    }

    /// Replace one field of the row at `index`.
    ///
    /// Returns `false` (and changes nothing) when `index` is out of range.
    pub fn update(&mut self, index: usize, field: IngredientField, value: impl Into<String>) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        let value = value.into();
        match field {
            IngredientField::Name => row.name = value,
            IngredientField::Amount => row.amount = value,
        }
        true
    }

    /// Remove the row at `index`, shifting later rows down by one.
    ///
    /// Row 0 can never be removed; out-of-range indexes are ignored.
    /// Returns the removed row.
    pub fn remove_at(&mut self, index: usize) -> Option<Ingredient> {
        if index == 0 || index >= self.rows.len() {
            return None;
        }
        Some(self.rows.remove(index))
    }

    /// Whether the row at `index` may be removed by the user.
    #[must_use]
    pub fn is_removable(&self, index: usize) -> bool {
        index != 0 && index < self.rows.len()
    }

    /// True when every row is complete.
    #[must_use]
    pub fn all_complete(&self) -> bool {
        self.rows.iter().all(Ingredient::is_complete)
    }

    /// Clones of the complete rows, in order.
    #[must_use]
    pub fn complete_rows(&self) -> Vec<Ingredient> {
        self.rows
            .iter()
            .filter(|row| row.is_complete())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Ingredient> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ingredient> {
        self.rows.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Ingredient] {
        &self.rows
    }
}

impl<'a> IntoIterator for &'a IngredientRows {
    type Item = &'a Ingredient;
    type IntoIter = std::slice::Iter<'a, Ingredient>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Returned when deserializing an empty row list.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("ingredient rows cannot be empty")]
pub struct EmptyRows;

impl TryFrom<Vec<Ingredient>> for IngredientRows {
    type Error = EmptyRows;

    fn try_from(rows: Vec<Ingredient>) -> Result<Self, Self::Error> {
        if rows.is_empty() {
            return Err(EmptyRows);
        }
        Ok(Self { rows })
    }
}

impl From<IngredientRows> for Vec<Ingredient> {
    fn from(rows: IngredientRows) -> Self {
        rows.rows
    }
}
