//! Photo analysis result
//!
//! The payload returned by the external analysis service for one photo.

use serde::{Deserialize, Deserializer, Serialize};

use super::nutrition::null_as_default;
use super::Recipe;

/// A food item seen in the photo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, deserialize_with = "amount_text")]
    pub amount: Option<String>,
}

/// Ingredients and recipe suggestions for one photo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipes: Vec<Recipe>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shopping_suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name == name)
    }
}

/// Amounts arrive as text ("1.5L", "dozen") or bare numbers
fn amount_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_payload() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{
                "ingredients": [{"name": "eggs", "amount": "dozen"}, {"name": "tomatoes", "amount": 6}],
                "recipes": [{"name": "Frittata", "macros": {"calories": 580}}],
                "shopping_suggestions": ["pasta"]
            }"#,
        )
        .unwrap();

        assert!(result.error.is_none());
        assert_eq!(result.ingredients[0].amount.as_deref(), Some("dozen"));
        assert_eq!(result.ingredients[1].amount.as_deref(), Some("6"));
        assert_eq!(result.recipe("Frittata").map(|r| r.macros.calories), Some(580.0));
        assert!(result.recipe("Omelette").is_none());
    }

    #[test]
    fn test_null_lists_read_as_empty() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{
                "ingredients": null,
                "recipes": [{"name": "Toast", "macros": null, "ingredients_used": null}],
                "shopping_suggestions": null
            }"#,
        )
        .unwrap();
        assert!(result.ingredients.is_empty());
        assert!(result.shopping_suggestions.is_empty());
        assert_eq!(result.recipe("Toast").map(|r| r.macros.calories), Some(0.0));
    }

    #[test]
    fn test_parse_error_payload() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"error": "Invalid JSON", "raw": "oops"}"#).unwrap();
        assert_eq!(result.error.as_deref(), Some("Invalid JSON"));
        assert!(result.recipes.is_empty());
    }
}
