//! Goal tools
//!
//! Nutrient goals live on the stored user profile; anything the profile
//! leaves unset comes from the configured defaults.

use serde::Serialize;
use tracing::info;

use super::session::Session;
use crate::models::{NutrientGoals, UserProfile};

/// Response for get_goals and set_goals
#[derive(Debug, Serialize)]
pub struct GoalsResponse {
    /// Goals in effect
    pub goals: NutrientGoals,
    /// Goals set on the profile
    pub profile: UserProfile,
}

pub fn get_goals(session: &Session) -> Result<GoalsResponse, String> {
    let profile = session.profile()?;
    Ok(GoalsResponse {
        goals: profile.goals(session.goal_defaults()),
        profile,
    })
}

/// Store the goals present in `update`; absent goals keep their value
pub fn set_goals(
    session: &Session,
    update: &NutrientGoals,
    display_name: Option<String>,
) -> Result<GoalsResponse, String> {
    let mut profile = session.profile()?;
    profile.apply_goals(update);
    if display_name.is_some() {
        profile.display_name = display_name;
    }

    session
        .store()
        .save_profile(&profile)
        .map_err(|e| format!("Failed to save profile: {}", e))?;
    info!("Updated nutrient goals");

    Ok(GoalsResponse {
        goals: profile.goals(session.goal_defaults()),
        profile,
    })
}
