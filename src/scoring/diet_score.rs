//! Diet score
//!
//! Five sub-scores in [0, 100] combined into one overall score. A sub-score
//! is `None` when its inputs are missing, so an empty day reads as "no data"
//! rather than as a bad day.

use serde::{Deserialize, Serialize};

use crate::models::{usable, Micronutrient, NutrientGoals, NutrientTotals};

/// Target share of macro energy, in percent
const PROTEIN_TARGET_PCT: f64 = 20.0;
const CARBS_TARGET_PCT: f64 = 50.0;
const FAT_TARGET_PCT: f64 = 30.0;

/// Weight of each sub-score in the overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub calories: f64,
    pub macros: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub micros: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            calories: 0.20,
            macros: 0.25,
            fiber: 0.20,
            sugar: 0.15,
            micros: 0.20,
        }
    }
}

/// Sub-scores; `None` serializes as `null`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub calories: Option<f64>,
    pub macros: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub micros: Option<f64>,
}

impl SubScores {
    fn weighted(&self, weights: &ScoreWeights) -> [(Option<f64>, f64); 5] {
        [
            (self.calories, weights.calories),
            (self.macros, weights.macros),
            (self.fiber, weights.fiber),
            (self.sugar, weights.sugar),
            (self.micros, weights.micros),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DietScoreResult {
    pub overall: f64,
    pub subscores: SubScores,
}

impl DietScoreResult {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.overall)
    }
}

/// Coarse rating of an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        let rounded = score.round();
        if rounded >= 80.0 {
            ScoreBand::Good
        } else if rounded >= 60.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
        }
    }
}

/// Closeness of calories to the goal: 100 at the goal, 50 at ±50 %, 0 at
/// zero or double
pub fn calories_score(totals: &NutrientTotals, goals: &NutrientGoals) -> Option<f64> {
    let goal = usable(goals.calories)?;
    if totals.calories <= 0.0 {
        return None;
    }
    let deviation = (totals.calories - goal).abs() / goal;
    Some(clamp_score(100.0 * (1.0 - deviation)))
}

/// Protein/carbs/fat energy split against 20/50/30
pub fn macros_score(totals: &NutrientTotals) -> Option<f64> {
    let energy = totals.macro_energy();
    if energy <= 0.0 {
        return None;
    }

    let protein_pct = totals.protein * 4.0 * 100.0 / energy;
    let carbs_pct = totals.carbs * 4.0 * 100.0 / energy;
    let fat_pct = totals.fat * 9.0 * 100.0 / energy;

    let deviation = (protein_pct - PROTEIN_TARGET_PCT).abs() / PROTEIN_TARGET_PCT
        + (carbs_pct - CARBS_TARGET_PCT).abs() / CARBS_TARGET_PCT
        + (fat_pct - FAT_TARGET_PCT).abs() / FAT_TARGET_PCT;

    Some(clamp_score(100.0 * (1.0 - deviation / 3.0)))
}

/// Fiber against its goal; exceeding the goal is not penalised
pub fn fiber_score(totals: &NutrientTotals, goals: &NutrientGoals) -> Option<f64> {
    let goal = usable(goals.micro(Micronutrient::Fiber))?;
    Some(clamp_score(totals.fiber() / goal * 100.0))
}

/// Share of calories from sugar: 100 up to 5 %, 60 at 10 %, 0 from 20 %
pub fn sugar_score(totals: &NutrientTotals) -> Option<f64> {
    if totals.sugar <= 0.0 || totals.calories <= 0.0 {
        return None;
    }

    let fraction = totals.sugar * 4.0 / totals.calories;
    let score = if fraction <= 0.05 {
        100.0
    } else if fraction <= 0.10 {
        100.0 - (fraction - 0.05) / 0.05 * 40.0
    } else if fraction <= 0.20 {
        60.0 - (fraction - 0.10) / 0.10 * 60.0
    } else {
        0.0
    };
    Some(clamp_score(score))
}

/// Mean goal coverage (capped at 100 % each) over micronutrients with a goal
pub fn micros_score(totals: &NutrientTotals, goals: &NutrientGoals) -> Option<f64> {
    let coverages: Vec<f64> = Micronutrient::ALL
        .into_iter()
        .filter_map(|m| {
            let goal = usable(goals.micro(m))?;
            Some((totals.micros[m] / goal).clamp(0.0, 1.0))
        })
        .collect();

    if coverages.is_empty() {
        return None;
    }
    Some(coverages.iter().sum::<f64>() / coverages.len() as f64 * 100.0)
}

/// Score a day's totals against goals with the default weights
pub fn compute(totals: &NutrientTotals, goals: &NutrientGoals) -> DietScoreResult {
    compute_with_weights(totals, goals, &ScoreWeights::default())
}

/// Score a day's totals. The overall score is the weighted mean of the
/// sub-scores that could be computed, renormalised by their weights; 0 when
/// none could.
pub fn compute_with_weights(
    totals: &NutrientTotals,
    goals: &NutrientGoals,
    weights: &ScoreWeights,
) -> DietScoreResult {
    let subscores = SubScores {
        calories: calories_score(totals, goals),
        macros: macros_score(totals),
        fiber: fiber_score(totals, goals),
        sugar: sugar_score(totals),
        micros: micros_score(totals, goals),
    };

    let (total, weight_sum) = subscores
        .weighted(weights)
        .into_iter()
        .filter_map(|(score, weight)| score.map(|s| (s * weight, weight)))
        .fold((0.0, 0.0), |(t, w), (s, weight)| (t + s, w + weight));

    let overall = if weight_sum > 0.0 {
        clamp_score(total / weight_sum)
    } else {
        0.0
    };

    DietScoreResult { overall, subscores }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}
