//! Score and progress tools

use serde::Serialize;

use super::session::{resolve_index, Session};
use crate::models::Micronutrient;
use crate::scoring::{self, DayProgress, DayScore, DietScoreResult, ScoreBand};

/// Response for diet_score
#[derive(Debug, Serialize)]
pub struct DietScoreResponse {
    pub day_id: String,
    #[serde(flatten)]
    pub result: DietScoreResult,
    pub band: ScoreBand,
}

/// Response for score_history
#[derive(Debug, Serialize)]
pub struct ScoreHistoryResponse {
    pub days: Vec<DayScore>,
    pub average: Option<f64>,
}

pub fn diet_score(session: &Session, day_id: Option<&str>) -> Result<DietScoreResponse, String> {
    let goals = session.goals()?;
    session.read(|ledger| {
        let day = &ledger.days()[resolve_index(ledger, day_id)?];
        let result = scoring::compute(day.totals(), &goals);
        Ok(DietScoreResponse {
            day_id: day.id.clone(),
            band: result.band(),
            result,
        })
    })
}

pub fn score_history(session: &Session, limit: Option<usize>) -> Result<ScoreHistoryResponse, String> {
    let goals = session.goals()?;
    let limit = limit.unwrap_or(scoring::DEFAULT_HISTORY_DAYS).max(1);
    let days = session.read(|ledger| scoring::score_history(ledger, &goals, limit));

    let average = if days.is_empty() {
        None
    } else {
        Some(days.iter().map(|d| d.score).sum::<f64>() / days.len() as f64)
    };
    Ok(ScoreHistoryResponse { days, average })
}

/// Micronutrient progress, food suggestions, available recipes and unused
/// ingredients for a day. `sort_by` is a micronutrient key such as
/// `vitamin_C_mg`.
pub fn nutrient_progress(
    session: &Session,
    day_id: Option<&str>,
    sort_by: Option<&str>,
) -> Result<DayProgress, String> {
    let sort_by = sort_by
        .map(|key| Micronutrient::from_key(key).ok_or_else(|| format!("Unknown nutrient: {}", key)))
        .transpose()?;
    let goals = session.goals()?;

    session.read(|ledger| {
        let day = &ledger.days()[resolve_index(ledger, day_id)?];
        Ok(DayProgress::for_day(day, &goals, sort_by))
    })
}
