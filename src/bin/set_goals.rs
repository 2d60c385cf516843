//! Utility to set nutrient goals on the stored profile
//! Usage: cargo run --bin set_goals -- calories=2200 protein=140 iron_mg=18

use std::sync::Arc;

use fridgenutri::config::AppConfig;
use fridgenutri::db::Database;
use fridgenutri::models::{Micronutrient, NutrientGoals};
use fridgenutri::store::{LedgerStore, SqliteKvStore};

fn parse_goals(args: &[String]) -> Result<NutrientGoals, String> {
    let mut goals = NutrientGoals::default();
    for arg in args {
        let (key, raw) = arg
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got {}", arg))?;
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("Not a number for {}: {}", key, raw))?;

        match key {
            "calories" => goals.calories = Some(value),
            "protein" => goals.protein = Some(value),
            "carbs" => goals.carbs = Some(value),
            "fat" | "fats" => goals.fat = Some(value),
            "sugar" => goals.sugar = Some(value),
            other => {
                let nutrient = Micronutrient::from_key(other)
                    .ok_or_else(|| format!("Unknown goal: {}", other))?;
                goals = goals.with_micro(nutrient, value);
            }
        }
    }
    Ok(goals)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let update = parse_goals(&args)?;

    let config = AppConfig::from_env()?;
    println!("Database path: {}", config.database_path.display());

    let database = Database::open(&config.database_path)?;
    let store = LedgerStore::new(Arc::new(SqliteKvStore::new(database)));

    let mut profile = store.load_profile()?;
    profile.apply_goals(&update);
    store.save_profile(&profile)?;

    let goals = profile.goals(&config.goal_defaults);
    println!("Goals in effect:");
    println!("  Calories: {:?}", goals.calories);
    println!("  Protein:  {:?}", goals.protein);
    println!("  Carbs:    {:?}", goals.carbs);
    println!("  Fat:      {:?}", goals.fat);
    println!("  Sugar:    {:?}", goals.sugar);
    for m in Micronutrient::ALL {
        if let Some(goal) = goals.micro(m) {
            println!("  {:<12} {} {}", m.label(), goal, m.unit());
        }
    }

    Ok(())
}
