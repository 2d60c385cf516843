//! Nutrient progress
//!
//! Per-day progress views: micronutrient coverage rows, foods that would
//! close the gaps, recipes still available from the analysis, ingredients not
//! yet used, and the macro split.

use serde::Serialize;

use crate::models::{usable, Day, Ingredient, Micronutrient, NutrientGoals, NutrientTotals, Recipe};

/// Coverage status of one micronutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressStatus {
    Low,
    #[serde(rename = "OK")]
    Ok,
    High,
}

impl ProgressStatus {
    /// Status for a raw coverage ratio in percent
    pub fn from_ratio(percent: f64) -> Self {
        if percent >= 120.0 {
            ProgressStatus::High
        } else if percent >= 80.0 {
            ProgressStatus::Ok
        } else {
            ProgressStatus::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientProgress {
    pub nutrient: Micronutrient,
    pub label: &'static str,
    pub unit: &'static str,
    pub current: f64,
    pub target: f64,
    /// Coverage capped at 100
    pub percent: f64,
    pub status: ProgressStatus,
}

impl NutrientProgress {
    pub fn missing(&self) -> f64 {
        (self.target - self.current).max(0.0)
    }
}

/// A food that would help close a micronutrient gap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub food: &'static str,
    pub nutrient: Micronutrient,
    pub label: &'static str,
    pub missing: f64,
    /// `missing / target`, at most 1
    pub importance: f64,
}

/// Share of one macro in the grams of protein, carbs and fat
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroShare {
    pub label: &'static str,
    pub grams: f64,
    pub percent: f64,
}

/// Everything the progress screen shows for one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayProgress {
    pub day_id: String,
    pub micronutrients: Vec<NutrientProgress>,
    pub alternatives: Vec<Alternative>,
    pub available_recipes: Vec<Recipe>,
    pub remaining_ingredients: Vec<Ingredient>,
    pub macro_distribution: Vec<MacroShare>,
}

impl DayProgress {
    pub fn for_day(day: &Day, goals: &NutrientGoals, sort_by: Option<Micronutrient>) -> Self {
        let micronutrients = micro_progress(day.totals(), goals);
        let alternatives = alternatives(&micronutrients);

        Self {
            day_id: day.id.clone(),
            micronutrients,
            alternatives,
            available_recipes: available_recipes(day, sort_by).into_iter().cloned().collect(),
            remaining_ingredients: remaining_ingredients(day).into_iter().cloned().collect(),
            macro_distribution: macro_distribution(day.totals()).to_vec(),
        }
    }
}

/// Foods known to be rich in a nutrient
pub fn nutrient_sources(nutrient: Micronutrient) -> &'static [&'static str] {
    match nutrient {
        Micronutrient::VitaminA => &["carrots", "sweet potato", "spinach"],
        Micronutrient::VitaminB6 => &["chickpeas", "salmon", "bananas"],
        Micronutrient::VitaminB12 => &["eggs", "salmon", "milk"],
        Micronutrient::VitaminC => &["bell peppers", "broccoli", "orange", "kiwi"],
        Micronutrient::VitaminD => &["salmon", "eggs", "fortified milk"],
        Micronutrient::VitaminE => &["almonds", "sunflower seeds", "avocado"],
        Micronutrient::Fiber => &["lentils", "oats", "beans", "raspberries"],
        Micronutrient::Calcium => &["milk", "yogurt", "cheese"],
        Micronutrient::Magnesium => &["pumpkin seeds", "spinach", "almonds"],
        Micronutrient::Iron => &["spinach", "lentils", "red meat"],
        Micronutrient::Zinc => &["pumpkin seeds", "beef", "chickpeas"],
        Micronutrient::Potassium => &["potatoes", "bananas", "beans"],
    }
}

/// One row per micronutrient with a usable goal
pub fn micro_progress(totals: &NutrientTotals, goals: &NutrientGoals) -> Vec<NutrientProgress> {
    Micronutrient::ALL
        .into_iter()
        .filter_map(|nutrient| {
            let target = usable(goals.micro(nutrient))?;
            let current = totals.micros[nutrient];
            let ratio = current / target * 100.0;

            Some(NutrientProgress {
                nutrient,
                label: nutrient.label(),
                unit: nutrient.unit(),
                current,
                target,
                percent: ratio.min(100.0),
                status: ProgressStatus::from_ratio(ratio),
            })
        })
        .collect()
}

/// Food suggestions for every `Low` row, largest gap first
pub fn alternatives(progress: &[NutrientProgress]) -> Vec<Alternative> {
    let mut out: Vec<Alternative> = progress
        .iter()
        .filter(|row| row.status == ProgressStatus::Low)
        .flat_map(|row| {
            let missing = row.missing();
            let importance = (missing / row.target).min(1.0);
            nutrient_sources(row.nutrient).iter().copied().map(move |food| Alternative {
                food,
                nutrient: row.nutrient,
                label: row.label,
                missing,
                importance,
            })
        })
        .collect();

    // stable: equal gaps keep nutrient then source order
    out.sort_by(|a, b| b.missing.total_cmp(&a.missing));
    out
}

/// Analysed recipes not chosen yet, optionally richest in `sort_by` first
pub fn available_recipes(day: &Day, sort_by: Option<Micronutrient>) -> Vec<&Recipe> {
    let Some(analysis) = &day.analysis else {
        return Vec::new();
    };

    let mut recipes: Vec<&Recipe> = analysis
        .recipes
        .iter()
        .filter(|r| !day.has_recipe(&r.name))
        .collect();

    if let Some(nutrient) = sort_by {
        recipes.sort_by(|a, b| b.micronutrients[nutrient].total_cmp(&a.micronutrients[nutrient]));
    }
    recipes
}

/// Lower-cased, trimmed ingredient text before the first digit
pub fn base_ingredient_name(raw: &str) -> String {
    let head = match raw.find(|c: char| c.is_ascii_digit()) {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    head.trim().to_lowercase()
}

/// Analysed ingredients that no chosen recipe uses
pub fn remaining_ingredients(day: &Day) -> Vec<&Ingredient> {
    let Some(analysis) = &day.analysis else {
        return Vec::new();
    };

    let used: Vec<String> = day
        .chosen_recipes()
        .iter()
        .flat_map(|r| r.ingredients_used.iter())
        .map(|s| base_ingredient_name(s))
        .filter(|s| !s.is_empty())
        .collect();

    analysis
        .ingredients
        .iter()
        .filter(|ingredient| {
            let name = ingredient.name.to_lowercase();
            !name.is_empty()
                && !used
                    .iter()
                    .any(|u| name.starts_with(u.as_str()) || u.starts_with(name.as_str()))
        })
        .collect()
}

/// Protein/carbs/fat split by grams
pub fn macro_distribution(totals: &NutrientTotals) -> [MacroShare; 3] {
    let sum = totals.protein + totals.carbs + totals.fat;
    let total = if sum > 0.0 { sum } else { 1.0 };
    let share = |label, grams: f64| MacroShare {
        label,
        grams,
        percent: grams / total * 100.0,
    };

    [
        share("Protein", totals.protein),
        share("Carbs", totals.carbs),
        share("Fat", totals.fat),
    ]
}
