//! FridgeNutri MCP Server Implementation
//!
//! Implements the MCP server with all FridgeNutri tools.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::analysis::AnalysisService;
use crate::models::{AnalysisResult, Micronutrient, NutrientGoals, Recipe};
use crate::tools::status::StatusTracker;
use crate::tools::{days, goals, photo, scores, Session};

/// FridgeNutri MCP Service
#[derive(Clone)]
pub struct FridgeNutriService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    session: Arc<Session>,
    analysis: Arc<dyn AnalysisService>,
    tool_router: ToolRouter<FridgeNutriService>,
}

impl FridgeNutriService {
    pub fn new(
        database_path: PathBuf,
        analysis_url: String,
        session: Arc<Session>,
        analysis: Arc<dyn AnalysisService>,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, analysis_url))),
            session,
            analysis,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(result: Result<T, String>) -> Result<CallToolResult, McpError> {
    let value = result.map_err(|e| McpError::internal_error(e, None))?;
    let json = serde_json::to_string_pretty(&value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DayParams {
    /// Day id (YYYY-MM-DD); the current day when omitted
    pub day_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DayIdParams {
    /// Day id (YYYY-MM-DD)
    pub day_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddRecipeParams {
    pub day_id: Option<String>,
    /// Name of a recipe from the day's analysis
    pub recipe_name: String,
    /// Full recipe object, used instead of looking the name up in the analysis
    pub recipe: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveRecipeParams {
    pub day_id: Option<String>,
    pub recipe_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecordAnalysisParams {
    pub day_id: Option<String>,
    pub photo_url: Option<String>,
    /// Analysis payload: ingredients, recipes, shopping_suggestions
    pub analysis: serde_json::Value,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzePhotoParams {
    pub day_id: Option<String>,
    /// Path to a photo on the server's filesystem
    pub image_path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScoreHistoryParams {
    /// Number of most recent days (default 14)
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NutrientProgressParams {
    pub day_id: Option<String>,
    /// Micronutrient key to order available recipes by, e.g. "iron_mg"
    pub sort_by: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetGoalsParams {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub sugar: Option<f64>,
    /// Micronutrient goals keyed like "vitamin_C_mg" or "fiber_g"
    pub micronutrients: Option<BTreeMap<String, f64>>,
    pub display_name: Option<String>,
}

impl SetGoalsParams {
    fn goals(&self) -> Result<NutrientGoals, String> {
        let mut goals = NutrientGoals {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            sugar: self.sugar,
            ..Default::default()
        };
        for (key, value) in self.micronutrients.iter().flatten() {
            let nutrient =
                Micronutrient::from_key(key).ok_or_else(|| format!("Unknown nutrient: {}", key))?;
            goals = goals.with_micro(nutrient, *value);
        }
        Ok(goals)
    }
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl FridgeNutriService {
    // --- Status ---

    #[tool(description = "Get the current status of the FridgeNutri service including build info, database status, tracked days, and process information")]
    async fn fridgenutri_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.session);
        to_json(Ok(status))
    }

    #[tool(description = "Get a short guide to the FridgeNutri workflow. Call this when unsure how the tools fit together.")]
    fn usage_notes(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::USAGE_NOTES;
        Ok(CallToolResult::success(vec![Content::text(USAGE_NOTES)]))
    }

    // --- Days ---

    #[tool(description = "List all tracked days in order with the current day marked")]
    fn list_days(&self) -> Result<CallToolResult, McpError> {
        to_json(days::list_days(&self.session))
    }

    #[tool(description = "Get a day with its photo analysis, chosen recipes, nutrient totals and diet score")]
    fn get_day(&self, Parameters(p): Parameters<DayParams>) -> Result<CallToolResult, McpError> {
        to_json(days::get_day(&self.session, p.day_id.as_deref()))
    }

    #[tool(description = "Add an empty day dated one day after the last day")]
    fn append_day(&self) -> Result<CallToolResult, McpError> {
        to_json(days::append_day(&self.session))
    }

    #[tool(description = "Delete a day. The last remaining day cannot be deleted.")]
    fn delete_day(&self, Parameters(p): Parameters<DayIdParams>) -> Result<CallToolResult, McpError> {
        to_json(days::delete_day(&self.session, &p.day_id))
    }

    #[tool(description = "Make a day the current day")]
    fn select_day(&self, Parameters(p): Parameters<DayIdParams>) -> Result<CallToolResult, McpError> {
        to_json(days::select_day(&self.session, &p.day_id))
    }

    #[tool(description = "Choose a recipe into a day. Recipes already chosen are not added twice.")]
    fn add_recipe(&self, Parameters(p): Parameters<AddRecipeParams>) -> Result<CallToolResult, McpError> {
        let recipe = p
            .recipe
            .map(serde_json::from_value::<Recipe>)
            .transpose()
            .map_err(|e| McpError::invalid_params(format!("Invalid recipe: {}", e), None))?;
        to_json(days::add_recipe(&self.session, p.day_id.as_deref(), &p.recipe_name, recipe))
    }

    #[tool(description = "Remove a chosen recipe from a day by name")]
    fn remove_recipe(&self, Parameters(p): Parameters<RemoveRecipeParams>) -> Result<CallToolResult, McpError> {
        to_json(days::remove_recipe(&self.session, p.day_id.as_deref(), &p.recipe_name))
    }

    #[tool(description = "Attach an analysis payload to a day, replacing any earlier analysis and clearing chosen recipes")]
    fn record_analysis(&self, Parameters(p): Parameters<RecordAnalysisParams>) -> Result<CallToolResult, McpError> {
        let analysis: AnalysisResult = serde_json::from_value(p.analysis)
            .map_err(|e| McpError::invalid_params(format!("Invalid analysis: {}", e), None))?;
        to_json(days::record_analysis(&self.session, p.day_id.as_deref(), p.photo_url, analysis))
    }

    #[tool(description = "Clear a day's photo, analysis and recipes, keeping its date. Cancels any analysis in flight for the day.")]
    fn reset_day(&self, Parameters(p): Parameters<DayParams>) -> Result<CallToolResult, McpError> {
        to_json(days::reset_day(&self.session, p.day_id.as_deref()))
    }

    #[tool(description = "Send a fridge photo for analysis and record the ingredients and suggested recipes on the day")]
    async fn analyze_photo(&self, Parameters(p): Parameters<AnalyzePhotoParams>) -> Result<CallToolResult, McpError> {
        let result = photo::analyze_photo(
            &self.session,
            self.analysis.as_ref(),
            p.day_id.as_deref(),
            &p.image_path,
        )
        .await;
        to_json(result)
    }

    // --- Scores ---

    #[tool(description = "Score a day from 0 to 100 on calories, macro balance, fiber, sugar and micronutrients")]
    fn diet_score(&self, Parameters(p): Parameters<DayParams>) -> Result<CallToolResult, McpError> {
        to_json(scores::diet_score(&self.session, p.day_id.as_deref()))
    }

    #[tool(description = "Overall diet scores of the most recent days, oldest first")]
    fn score_history(&self, Parameters(p): Parameters<ScoreHistoryParams>) -> Result<CallToolResult, McpError> {
        to_json(scores::score_history(&self.session, p.limit))
    }

    #[tool(description = "Micronutrient progress for a day with foods that close the gaps, recipes still available, unused ingredients and the macro split")]
    fn nutrient_progress(&self, Parameters(p): Parameters<NutrientProgressParams>) -> Result<CallToolResult, McpError> {
        to_json(scores::nutrient_progress(&self.session, p.day_id.as_deref(), p.sort_by.as_deref()))
    }

    // --- Goals ---

    #[tool(description = "Get the nutrient goals in effect and those set on the profile")]
    fn get_goals(&self) -> Result<CallToolResult, McpError> {
        to_json(goals::get_goals(&self.session))
    }

    #[tool(description = "Set nutrient goals. Only the goals given are changed.")]
    fn set_goals(&self, Parameters(p): Parameters<SetGoalsParams>) -> Result<CallToolResult, McpError> {
        let update = p.goals().map_err(|e| McpError::invalid_params(e, None))?;
        to_json(goals::set_goals(&self.session, &update, p.display_name))
    }
}

#[tool_handler]
impl ServerHandler for FridgeNutriService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fridgenutri".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("FridgeNutri".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "FridgeNutri - Day-by-day nutrition tracking from fridge photos. \
                 Call usage_notes first if unsure. \
                 Days: list_days/get_day/append_day/delete_day/select_day/reset_day. \
                 Photos: analyze_photo, or record_analysis with a payload. \
                 Recipes: add_recipe/remove_recipe. \
                 Scores: diet_score, score_history, nutrient_progress. \
                 Goals: get_goals/set_goals. Days default to the current day when day_id is omitted."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::analysis::AnalysisOutcome;
    use crate::tools::session::test_support::session;

    struct CannedService;

    #[async_trait]
    impl AnalysisService for CannedService {
        async fn analyze(&self, _image: Vec<u8>, _file_name: &str) -> AnalysisOutcome<AnalysisResult> {
            Ok(serde_json::from_str(
                r#"{
                    "ingredients": [{"name": "Spinach", "amount": "200g"}],
                    "recipes": [{
                        "name": "Spinach Omelette",
                        "ingredients_used": ["spinach 100g", "eggs 3"],
                        "macros": {"calories": 350, "protein": 24, "carbs": 6, "fat": 25},
                        "micronutrients": {"iron_mg": 4.1, "vitamin_A_mg": "0.5"}
                    }],
                    "shopping_suggestions": ["feta"]
                }"#,
            )?)
        }
    }

    fn service() -> FridgeNutriService {
        FridgeNutriService::new(
            PathBuf::from("/nonexistent/fridgenutri.db"),
            "http://localhost:8000/analyze".into(),
            Arc::new(session(3)),
            Arc::new(CannedService),
        )
    }

    fn text(result: CallToolResult) -> serde_json::Value {
        let value = serde_json::to_value(&result).unwrap();
        let text = value["content"][0]["text"].as_str().unwrap().to_string();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_photo_to_score_flow() {
        let service = service();
        let path = std::env::temp_dir().join(format!("fridgenutri-mcp-{}.jpg", std::process::id()));
        std::fs::write(&path, [0xff, 0xd8]).unwrap();

        let analysed = text(
            service
                .analyze_photo(Parameters(AnalyzePhotoParams {
                    day_id: None,
                    image_path: path.to_string_lossy().into_owned(),
                }))
                .await
                .unwrap(),
        );
        assert_eq!(analysed["applied"], true);

        let added = text(
            service
                .add_recipe(Parameters(AddRecipeParams {
                    day_id: None,
                    recipe_name: "Spinach Omelette".into(),
                    recipe: None,
                }))
                .unwrap(),
        );
        assert_eq!(added["totals"]["calories"], 350.0);

        let score = text(service.diet_score(Parameters(DayParams { day_id: None })).unwrap());
        assert!(score["overall"].as_f64().unwrap() > 0.0);
        assert!(score["subscores"]["sugar"].is_null());

        let progress = text(
            service
                .nutrient_progress(Parameters(NutrientProgressParams {
                    day_id: None,
                    sort_by: None,
                }))
                .unwrap(),
        );
        assert_eq!(progress["remaining_ingredients"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_errors_surface_as_tool_errors() {
        let service = service();
        for id in ["2025-01-07", "2025-01-08"] {
            service.delete_day(Parameters(DayIdParams { day_id: id.into() })).unwrap();
        }
        assert!(service
            .delete_day(Parameters(DayIdParams { day_id: "2025-01-06".into() }))
            .is_err());

        let bad = SetGoalsParams {
            calories: None,
            protein: None,
            carbs: None,
            fat: None,
            sugar: None,
            micronutrients: Some(BTreeMap::from([("vitamin_K_mg".to_string(), 1.0)])),
            display_name: None,
        };
        assert!(service.set_goals(Parameters(bad)).is_err());
    }

    #[tokio::test]
    async fn test_status() {
        let service = service();
        let status = text(service.fridgenutri_status().await.unwrap());
        assert_eq!(status["days_tracked"], 3);
        assert_eq!(status["analysis_url"], "http://localhost:8000/analyze");
    }

    #[test]
    fn test_usage_notes() {
        let value = serde_json::to_value(service().usage_notes().unwrap()).unwrap();
        let notes = value["content"][0]["text"].as_str().unwrap();
        assert!(notes.contains("analyze_photo"));
        assert!(notes.contains("diet_score"));
    }

    #[test]
    fn test_server_info() {
        let info = service().get_info();
        assert_eq!(info.server_info.name, "fridgenutri");
    }
}
