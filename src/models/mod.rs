//! Data models
//!
//! Plain data carried by the ledger, the score engine and the store.

mod analysis;
mod day;
mod goals;
mod nutrition;
mod recipe;

pub use analysis::{AnalysisResult, Ingredient};
pub use day::{day_id, recompute_totals, Day};
pub use goals::{usable, MicroGoals, NutrientGoals, ProfileNutrients, UserProfile};
pub use nutrition::{parse_amount, Macros, MicroTable, MicroValues, Micronutrient, NutrientTotals};
pub use recipe::Recipe;
