//! Diet scoring and nutrient progress
//!
//! Pure functions over day totals and goals. Nothing here logs or fails.

mod diet_score;
mod progress;

pub use diet_score::{
    calories_score, compute, compute_with_weights, fiber_score, macros_score, micros_score,
    sugar_score, DietScoreResult, ScoreBand, ScoreWeights, SubScores,
};
pub use progress::{
    alternatives, available_recipes, base_ingredient_name, macro_distribution, micro_progress,
    nutrient_sources, remaining_ingredients, Alternative, DayProgress, MacroShare,
    NutrientProgress, ProgressStatus,
};

use serde::Serialize;

use crate::ledger::DayLedger;
use crate::models::NutrientGoals;

/// Days shown in the score history by default
pub const DEFAULT_HISTORY_DAYS: usize = 14;

/// Overall score of one day, for the history chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayScore {
    pub day_id: String,
    pub weekday: String,
    pub score: f64,
    pub band: ScoreBand,
}

/// Scores of the last `limit` days, oldest first
pub fn score_history(ledger: &DayLedger, goals: &NutrientGoals, limit: usize) -> Vec<DayScore> {
    let days = ledger.days();
    let start = days.len().saturating_sub(limit);

    days[start..]
        .iter()
        .map(|day| {
            let result = compute(day.totals(), goals);
            DayScore {
                day_id: day.id.clone(),
                weekday: day.weekday(),
                score: result.overall,
                band: result.band(),
            }
        })
        .collect()
}
