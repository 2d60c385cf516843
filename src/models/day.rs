//! Day model
//!
//! One calendar day of tracking: photo, analysis, chosen recipes and the
//! nutrient totals derived from them.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{AnalysisResult, NutrientTotals, Recipe};

/// A tracked day.
///
/// `totals` is always the sum over `chosen_recipes`; both are private so
/// every change goes through a method that recomputes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DayRecord")]
pub struct Day {
    pub id: String,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub photo_url: Option<String>,
    pub analysis: Option<AnalysisResult>,
    chosen_recipes: Vec<Recipe>,
    totals: NutrientTotals,
}

/// Stored shape of a day; totals are recomputed on load, never trusted
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(with = "iso_date")]
    date: NaiveDate,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    analysis: Option<AnalysisResult>,
    #[serde(default)]
    chosen_recipes: Vec<Recipe>,
}

impl From<DayRecord> for Day {
    fn from(record: DayRecord) -> Self {
        let mut day = Day::new(record.date);
        if let Some(id) = record.id.filter(|id| !id.is_empty()) {
            day.id = id;
        }
        day.photo_url = record.photo_url;
        day.analysis = record.analysis;
        for recipe in record.chosen_recipes {
            if !day.has_recipe(&recipe.name) {
                day.chosen_recipes.push(recipe);
            }
        }
        day.recompute();
        day
    }
}

impl Day {
    /// An empty day for `date`, keyed by its ISO date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: day_id(date),
            date,
            photo_url: None,
            analysis: None,
            chosen_recipes: Vec::new(),
            totals: NutrientTotals::zero(),
        }
    }

    pub fn chosen_recipes(&self) -> &[Recipe] {
        &self.chosen_recipes
    }

    pub fn totals(&self) -> &NutrientTotals {
        &self.totals
    }

    pub fn has_recipe(&self, name: &str) -> bool {
        self.chosen_recipes.iter().any(|r| r.name == name)
    }

    /// Short weekday label, e.g. "Mon"
    pub fn weekday(&self) -> String {
        self.date.format("%a").to_string()
    }

    /// Short month label, e.g. "Jan"
    pub fn month_short(&self) -> String {
        self.date.format("%b").to_string()
    }

    pub fn day_number(&self) -> u32 {
        self.date.day()
    }

    /// Append a recipe unless one with the same name is already chosen.
    /// Returns whether the recipe was added.
    pub fn add_recipe(&mut self, recipe: Recipe) -> bool {
        if self.has_recipe(&recipe.name) {
            return false;
        }
        self.chosen_recipes.push(recipe);
        self.recompute();
        true
    }

    /// Remove the recipe with this name, returning it
    pub fn remove_recipe(&mut self, name: &str) -> Option<Recipe> {
        let pos = self.chosen_recipes.iter().position(|r| r.name == name)?;
        let removed = self.chosen_recipes.remove(pos);
        self.recompute();
        Some(removed)
    }

    /// Attach a new photo analysis; recipes chosen from an earlier analysis
    /// no longer apply
    pub fn record_analysis(&mut self, photo_url: Option<String>, analysis: AnalysisResult) {
        self.photo_url = photo_url;
        self.analysis = Some(analysis);
        self.chosen_recipes.clear();
        self.recompute();
    }

    /// Drop photo, analysis and recipes, keeping the date
    pub fn reset(&mut self) {
        *self = Day::new(self.date);
    }

    fn recompute(&mut self) {
        self.totals = recompute_totals(&self.chosen_recipes);
    }
}

/// Day id for a calendar date
pub fn day_id(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Sum of macros and micronutrients over `recipes`, from zero
pub fn recompute_totals(recipes: &[Recipe]) -> NutrientTotals {
    recipes.iter().map(Recipe::nutrients).sum()
}

/// ISO-8601 date (de)serialization.
///
/// Writes `YYYY-MM-DD`; reads plain dates and full RFC 3339 timestamps.
pub(crate) mod iso_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
    }

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.naive_utc().date());
        }
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Macros, MicroValues, Micronutrient};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn recipe(name: &str, calories: f64, iron: f64) -> Recipe {
        Recipe::new(
            name,
            Macros {
                calories,
                protein: 10.0,
                ..Default::default()
            },
            MicroValues::zero().with(Micronutrient::Iron, iron),
        )
    }

    #[test]
    fn test_new_day_labels() {
        let day = Day::new(date(2025, 1, 6));
        assert_eq!(day.id, "2025-01-06");
        assert_eq!(day.weekday(), "Mon");
        assert_eq!(day.month_short(), "Jan");
        assert_eq!(day.day_number(), 6);
        assert!(day.totals().is_empty());
    }

    #[test]
    fn test_add_recipe_is_idempotent_on_name() {
        let mut day = Day::new(date(2025, 1, 6));
        assert!(day.add_recipe(recipe("Salad", 300.0, 2.0)));
        let snapshot = day.clone();
        assert!(!day.add_recipe(recipe("Salad", 999.0, 9.0)));
        assert_eq!(day, snapshot);
        assert_eq!(day.totals().calories, 300.0);
    }

    #[test]
    fn test_totals_track_recipes_through_mutations() {
        let mut day = Day::new(date(2025, 1, 6));
        let recipes = [
            recipe("A", 0.1, 0.3),
            recipe("B", 0.2, 0.7),
            recipe("C", 410.5, 1.1),
        ];
        for r in &recipes {
            day.add_recipe(r.clone());
            assert_eq!(*day.totals(), recompute_totals(day.chosen_recipes()));
        }
        for _ in 0..5 {
            day.remove_recipe("B");
            assert_eq!(*day.totals(), recompute_totals(day.chosen_recipes()));
            day.add_recipe(recipes[1].clone());
            assert_eq!(*day.totals(), recompute_totals(day.chosen_recipes()));
        }
        assert_eq!(day.chosen_recipes().len(), 3);
        assert_eq!(day.chosen_recipes()[2].name, "B");
    }

    #[test]
    fn test_remove_missing_recipe() {
        let mut day = Day::new(date(2025, 1, 6));
        day.add_recipe(recipe("A", 100.0, 0.0));
        assert!(day.remove_recipe("Z").is_none());
        assert_eq!(day.chosen_recipes().len(), 1);
    }

    #[test]
    fn test_record_analysis_clears_recipes() {
        let mut day = Day::new(date(2025, 1, 6));
        day.add_recipe(recipe("A", 100.0, 0.0));
        day.record_analysis(Some("blob:photo".into()), AnalysisResult::default());
        assert!(day.chosen_recipes().is_empty());
        assert!(day.totals().is_empty());
        assert_eq!(day.photo_url.as_deref(), Some("blob:photo"));
        assert!(day.analysis.is_some());
    }

    #[test]
    fn test_reset_keeps_date() {
        let mut day = Day::new(date(2025, 1, 6));
        day.record_analysis(Some("blob:photo".into()), AnalysisResult::default());
        day.add_recipe(recipe("A", 100.0, 0.0));
        day.reset();
        assert_eq!(day, Day::new(date(2025, 1, 6)));
    }

    #[test]
    fn test_deserialize_recomputes_stale_totals() {
        let day: Day = serde_json::from_str(
            r#"{
                "id": "2025-01-06",
                "date": "2025-01-06T09:30:00.000Z",
                "chosenRecipes": [{"name": "A", "macros": {"calories": 250}}],
                "totals": {"calories": 99999}
            }"#,
        )
        .unwrap();
        assert_eq!(day.date, date(2025, 1, 6));
        assert_eq!(day.totals().calories, 250.0);
    }

    #[test]
    fn test_serialize_uses_iso_date() {
        let day = Day::new(date(2025, 3, 9));
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["date"], "2025-03-09");
        assert_eq!(json["chosenRecipes"], serde_json::json!([]));
    }

    #[test]
    fn test_iso_date_parse() {
        assert_eq!(iso_date::parse("2025-01-06"), Some(date(2025, 1, 6)));
        assert_eq!(iso_date::parse("2025-01-06T23:00:00+00:00"), Some(date(2025, 1, 6)));
        assert_eq!(iso_date::parse("2025-01-06 garbage"), Some(date(2025, 1, 6)));
        assert_eq!(iso_date::parse("yesterday"), None);
    }
}
