//! Recipe model
//!
//! A recipe suggested by photo analysis. Only `name`, `macros` and
//! `micronutrients` feed the day totals; the rest is carried for display.

use serde::{Deserialize, Serialize};

use super::nutrition::{null_as_default, Macros, MicroTable, MicroValues, NutrientTotals};

/// A recipe that can be chosen into a day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecipeRecord")]
pub struct Recipe {
    /// Unique within a day; used for de-duplication and removal
    pub name: String,
    pub macros: Macros,
    pub micronutrients: MicroValues,
    pub ingredients_used: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Recipe as it arrives on the wire. Missing or `null` blocks read as empty.
#[derive(Deserialize)]
struct RecipeRecord {
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    macros: Macros,
    #[serde(default, deserialize_with = "null_as_default")]
    micronutrients: MicroTable,
    #[serde(default, deserialize_with = "null_as_default")]
    ingredients_used: Vec<String>,
    #[serde(default)]
    instructions: Option<String>,
}

impl From<RecipeRecord> for Recipe {
    fn from(record: RecipeRecord) -> Self {
        let mut macros = record.macros;
        macros.sugar += record.micronutrients.sugar;
        Self {
            name: record.name,
            macros,
            micronutrients: record.micronutrients.values,
            ingredients_used: record.ingredients_used,
            instructions: record.instructions,
        }
    }
}

impl Recipe {
    pub fn new(name: impl Into<String>, macros: Macros, micronutrients: MicroValues) -> Self {
        Self {
            name: name.into(),
            macros,
            micronutrients,
            ..Default::default()
        }
    }

    /// Nutrients this recipe contributes to a day
    pub fn nutrients(&self) -> NutrientTotals {
        NutrientTotals::from_parts(&self.macros, &self.micronutrients)
    }
}
