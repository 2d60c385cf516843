//! Day ledger tools
//!
//! Listing, adding, removing and selecting days, and choosing recipes into
//! them.

use serde::Serialize;
use tracing::info;

use super::session::{resolve_index, Session};
use crate::models::{AnalysisResult, Day, NutrientTotals, Recipe};
use crate::scoring::{self, DietScoreResult};

/// Day summary for listing
#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub index: usize,
    pub id: String,
    pub date: String,
    pub weekday: String,
    pub month: String,
    pub day_number: u32,
    pub is_current: bool,
    pub has_photo: bool,
    pub recipe_count: usize,
    pub calories: f64,
}

impl DaySummary {
    fn new(index: usize, day: &Day, is_current: bool) -> Self {
        Self {
            index,
            id: day.id.clone(),
            date: day.date.format("%Y-%m-%d").to_string(),
            weekday: day.weekday(),
            month: day.month_short(),
            day_number: day.day_number(),
            is_current,
            has_photo: day.photo_url.is_some(),
            recipe_count: day.chosen_recipes().len(),
            calories: day.totals().calories,
        }
    }
}

/// Response for list_days
#[derive(Debug, Serialize)]
pub struct ListDaysResponse {
    pub days: Vec<DaySummary>,
    pub current_index: usize,
    pub total: usize,
}

/// Day with analysis, recipes, totals and score
#[derive(Debug, Serialize)]
pub struct DayDetail {
    pub summary: DaySummary,
    pub photo_url: Option<String>,
    pub analysis: Option<AnalysisResult>,
    pub chosen_recipes: Vec<Recipe>,
    pub totals: NutrientTotals,
    pub score: DietScoreResult,
}

/// Response for delete_day
#[derive(Debug, Serialize)]
pub struct DeleteDayResponse {
    pub deleted_id: String,
    pub current_index: usize,
    pub current_id: String,
    pub total: usize,
    pub cancelled_analysis: bool,
}

/// Response for select_day
#[derive(Debug, Serialize)]
pub struct SelectDayResponse {
    pub selected: bool,
    pub current_index: usize,
    pub current_id: String,
}

/// Response for add_recipe and remove_recipe
#[derive(Debug, Serialize)]
pub struct RecipeChangeResponse {
    pub day_id: String,
    pub recipe: String,
    /// false when the recipe was already chosen (add) or not chosen (remove)
    pub changed: bool,
    pub chosen_recipes: Vec<String>,
    pub totals: NutrientTotals,
}

/// Response for record_analysis
#[derive(Debug, Serialize)]
pub struct RecordAnalysisResponse {
    pub day_id: String,
    pub ingredients: usize,
    pub recipes: Vec<String>,
    pub shopping_suggestions: Vec<String>,
}

/// Response for reset_day
#[derive(Debug, Serialize)]
pub struct ResetDayResponse {
    pub day_id: String,
    pub cancelled_analysis: bool,
}

// ============================================================================
// Day Tools
// ============================================================================

pub fn list_days(session: &Session) -> Result<ListDaysResponse, String> {
    Ok(session.read(|ledger| {
        let current = ledger.current_index();
        ListDaysResponse {
            days: ledger
                .days()
                .iter()
                .enumerate()
                .map(|(i, day)| DaySummary::new(i, day, i == current))
                .collect(),
            current_index: current,
            total: ledger.len(),
        }
    }))
}

/// Get a day (the current day when `day_id` is omitted)
pub fn get_day(session: &Session, day_id: Option<&str>) -> Result<DayDetail, String> {
    let goals = session.goals()?;
    session.read(|ledger| {
        let index = resolve_index(ledger, day_id)?;
        let day = &ledger.days()[index];
        Ok(DayDetail {
            summary: DaySummary::new(index, day, index == ledger.current_index()),
            photo_url: day.photo_url.clone(),
            analysis: day.analysis.clone(),
            chosen_recipes: day.chosen_recipes().to_vec(),
            totals: *day.totals(),
            score: scoring::compute(day.totals(), &goals),
        })
    })
}

/// Add an empty day after the last one
pub fn append_day(session: &Session) -> Result<DaySummary, String> {
    let summary = session.mutate(|ledger| {
        let index = ledger.len();
        let current = ledger.current_index();
        let day = ledger.append_day().map_err(|e| e.to_string())?;
        Ok(DaySummary::new(index, day, index == current))
    })?;
    info!(id = %summary.id, "Appended day");
    Ok(summary)
}

pub fn delete_day(session: &Session, day_id: &str) -> Result<DeleteDayResponse, String> {
    let (deleted, cancelled_analysis, current_index, current_id, total) =
        session.mutate(|ledger| {
            let index = resolve_index(ledger, Some(day_id))?;
            let deleted = ledger.delete_day(index).map_err(|e| e.to_string())?;
            // before the save, which may fail
            let cancelled = session.tracker().cancel(&deleted.id);
            Ok((
                deleted,
                cancelled,
                ledger.current_index(),
                ledger.current_day().id.clone(),
                ledger.len(),
            ))
        })?;

    info!(id = %deleted.id, "Deleted day");

    Ok(DeleteDayResponse {
        deleted_id: deleted.id,
        current_index,
        current_id,
        total,
        cancelled_analysis,
    })
}

pub fn select_day(session: &Session, day_id: &str) -> Result<SelectDayResponse, String> {
    session.mutate(|ledger| {
        let index = resolve_index(ledger, Some(day_id))?;
        let selected = ledger.select_day(index);
        Ok(SelectDayResponse {
            selected,
            current_index: ledger.current_index(),
            current_id: ledger.current_day().id.clone(),
        })
    })
}

/// Choose a recipe into a day. Without an explicit `recipe`, the named
/// recipe is taken from the day's analysis.
pub fn add_recipe(
    session: &Session,
    day_id: Option<&str>,
    recipe_name: &str,
    recipe: Option<Recipe>,
) -> Result<RecipeChangeResponse, String> {
    session.mutate(|ledger| {
        let index = resolve_index(ledger, day_id)?;
        let recipe = match recipe {
            Some(recipe) => recipe,
            None => ledger.days()[index]
                .analysis
                .as_ref()
                .and_then(|a| a.recipe(recipe_name))
                .cloned()
                .ok_or_else(|| format!("Recipe not found in day analysis: {}", recipe_name))?,
        };
        let name = recipe.name.clone();
        let changed = ledger.add_recipe(index, recipe).map_err(|e| e.to_string())?;
        Ok(recipe_change(&ledger.days()[index], name, changed))
    })
}

pub fn remove_recipe(
    session: &Session,
    day_id: Option<&str>,
    recipe_name: &str,
) -> Result<RecipeChangeResponse, String> {
    session.mutate(|ledger| {
        let index = resolve_index(ledger, day_id)?;
        let removed = ledger
            .remove_recipe(index, recipe_name)
            .map_err(|e| e.to_string())?;
        Ok(recipe_change(
            &ledger.days()[index],
            recipe_name.to_string(),
            removed.is_some(),
        ))
    })
}

fn recipe_change(day: &Day, recipe: String, changed: bool) -> RecipeChangeResponse {
    RecipeChangeResponse {
        day_id: day.id.clone(),
        recipe,
        changed,
        chosen_recipes: day.chosen_recipes().iter().map(|r| r.name.clone()).collect(),
        totals: *day.totals(),
    }
}

/// Attach an analysis payload to a day. A payload with `error` is rejected.
pub fn record_analysis(
    session: &Session,
    day_id: Option<&str>,
    photo_url: Option<String>,
    analysis: AnalysisResult,
) -> Result<RecordAnalysisResponse, String> {
    session.mutate(|ledger| {
        let index = resolve_index(ledger, day_id)?;
        let response = RecordAnalysisResponse {
            day_id: ledger.days()[index].id.clone(),
            ingredients: analysis.ingredients.len(),
            recipes: analysis.recipes.iter().map(|r| r.name.clone()).collect(),
            shopping_suggestions: analysis.shopping_suggestions.clone(),
        };
        ledger
            .record_analysis(index, photo_url, analysis)
            .map_err(|e| e.to_string())?;
        Ok(response)
    })
}

/// Clear a day back to empty, dropping any analysis still in flight for it
pub fn reset_day(session: &Session, day_id: Option<&str>) -> Result<ResetDayResponse, String> {
    let (id, cancelled_analysis) = session.mutate(|ledger| {
        let index = resolve_index(ledger, day_id)?;
        ledger.reset_day(index).map_err(|e| e.to_string())?;
        let id = ledger.days()[index].id.clone();
        let cancelled = session.tracker().cancel(&id);
        Ok((id, cancelled))
    })?;

    Ok(ResetDayResponse {
        day_id: id,
        cancelled_analysis,
    })
}
