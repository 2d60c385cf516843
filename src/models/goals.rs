//! Nutrient goals
//!
//! Daily targets per user. Every goal is optional; an absent goal disables
//! the sub-scores and progress rows that depend on it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::nutrition::Micronutrient;

/// Optional goal per micronutrient
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct MicroGoals([Option<f64>; 12]);

impl MicroGoals {
    pub fn get(&self, nutrient: Micronutrient) -> Option<f64> {
        self.0[nutrient as usize]
    }

    pub fn set(&mut self, nutrient: Micronutrient, goal: Option<f64>) {
        self.0[nutrient as usize] = goal;
    }
}

impl From<BTreeMap<String, f64>> for MicroGoals {
    fn from(map: BTreeMap<String, f64>) -> Self {
        let mut goals = MicroGoals::default();
        for (key, value) in map {
            if let Some(nutrient) = Micronutrient::from_key(&key) {
                goals.set(nutrient, Some(value));
            }
        }
        goals
    }
}

impl From<MicroGoals> for BTreeMap<String, f64> {
    fn from(goals: MicroGoals) -> Self {
        Micronutrient::ALL
            .into_iter()
            .filter_map(|m| goals.get(m).map(|g| (m.key().to_string(), g)))
            .collect()
    }
}

/// Daily nutrient targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientGoals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub micros: MicroGoals,
}

impl NutrientGoals {
    /// Built-in defaults, used when neither the profile nor the configured
    /// defaults file supplies a goal
    pub fn builtin() -> Self {
        let mut micros = MicroGoals::default();
        for m in Micronutrient::ALL {
            micros.set(m, Some(builtin_micro_goal(m)));
        }

        Self {
            calories: Some(2500.0),
            protein: Some(150.0),
            carbs: Some(250.0),
            fat: Some(70.0),
            sugar: None,
            micros,
        }
    }

    pub fn micro(&self, nutrient: Micronutrient) -> Option<f64> {
        self.micros.get(nutrient)
    }

    pub fn with_micro(mut self, nutrient: Micronutrient, goal: f64) -> Self {
        self.micros.set(nutrient, Some(goal));
        self
    }

    /// Fill every absent or non-positive goal from `defaults`
    pub fn with_fallback(&self, defaults: &NutrientGoals) -> NutrientGoals {
        let mut micros = MicroGoals::default();
        for m in Micronutrient::ALL {
            micros.set(m, usable(self.micro(m)).or(usable(defaults.micro(m))));
        }

        NutrientGoals {
            calories: usable(self.calories).or(usable(defaults.calories)),
            protein: usable(self.protein).or(usable(defaults.protein)),
            carbs: usable(self.carbs).or(usable(defaults.carbs)),
            fat: usable(self.fat).or(usable(defaults.fat)),
            sugar: usable(self.sugar).or(usable(defaults.sugar)),
            micros,
        }
    }
}

fn builtin_micro_goal(nutrient: Micronutrient) -> f64 {
    match nutrient {
        Micronutrient::VitaminA => 0.9,
        Micronutrient::VitaminB6 => 1.3,
        Micronutrient::VitaminB12 => 0.0024,
        Micronutrient::VitaminC => 90.0,
        Micronutrient::VitaminD => 0.015,
        Micronutrient::VitaminE => 15.0,
        Micronutrient::Fiber => 25.0,
        Micronutrient::Calcium => 1000.0,
        Micronutrient::Magnesium => 400.0,
        Micronutrient::Iron => 8.0,
        Micronutrient::Zinc => 11.0,
        Micronutrient::Potassium => 4700.0,
    }
}

/// A goal that can be divided by: finite and strictly positive
pub fn usable(goal: Option<f64>) -> Option<f64> {
    goal.filter(|g| g.is_finite() && *g > 0.0)
}

/// Nutrient targets as entered on the profile screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileNutrients {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fats: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    /// Micronutrient goals keyed by storage key; other keys are kept but unused
    #[serde(flatten)]
    pub other: BTreeMap<String, f64>,
}

/// Stored user profile, the source of nutrient goals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_goal: Option<f64>,
    #[serde(default)]
    pub nutrients: ProfileNutrients,
}

impl UserProfile {
    /// Goals from this profile, falling back to `defaults` field by field
    pub fn goals(&self, defaults: &NutrientGoals) -> NutrientGoals {
        let mut micros = MicroGoals::default();
        for m in Micronutrient::ALL {
            micros.set(m, self.nutrients.other.get(m.key()).copied());
        }

        NutrientGoals {
            calories: self.calories_goal,
            protein: self.nutrients.protein,
            carbs: self.nutrients.carbs,
            fat: self.nutrients.fats,
            sugar: self.nutrients.sugar,
            micros,
        }
        .with_fallback(defaults)
    }

    /// Overwrite the goals present in `goals`, leaving the rest untouched
    pub fn apply_goals(&mut self, goals: &NutrientGoals) {
        if goals.calories.is_some() {
            self.calories_goal = goals.calories;
        }
        if goals.protein.is_some() {
            self.nutrients.protein = goals.protein;
        }
        if goals.carbs.is_some() {
            self.nutrients.carbs = goals.carbs;
        }
        if goals.fat.is_some() {
            self.nutrients.fats = goals.fat;
        }
        if goals.sugar.is_some() {
            self.nutrients.sugar = goals.sugar;
        }
        for m in Micronutrient::ALL {
            if let Some(goal) = goals.micro(m) {
                self.nutrients.other.insert(m.key().to_string(), goal);
            }
        }
    }
}
