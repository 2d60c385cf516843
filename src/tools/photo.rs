//! Photo analysis tool
//!
//! Sends a photo to the analysis service and records the result on the day
//! it was taken for. The day is fixed when the request is issued; the
//! response is dropped if that day was reset, deleted or re-analysed while
//! the request was in flight.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use super::session::{resolve_index, Session};
use crate::analysis::{AnalysisError, AnalysisService};
use crate::models::Ingredient;

/// Response for analyze_photo
#[derive(Debug, Serialize)]
pub struct AnalyzePhotoResponse {
    pub day_id: String,
    /// false when the result arrived for a day that has moved on
    pub applied: bool,
    pub ingredients: Vec<Ingredient>,
    pub recipes: Vec<String>,
    pub shopping_suggestions: Vec<String>,
}

pub async fn analyze_photo(
    session: &Session,
    service: &dyn AnalysisService,
    day_id: Option<&str>,
    image_path: &str,
) -> Result<AnalyzePhotoResponse, String> {
    let image = tokio::fs::read(image_path)
        .await
        .map_err(|e| AnalysisError::from(e).to_string())?;
    let file_name = Path::new(image_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo.jpg")
        .to_string();

    let target = session.read(|ledger| {
        let index = resolve_index(ledger, day_id)?;
        Ok::<_, String>(ledger.days()[index].id.clone())
    })?;
    let ticket = session.tracker().begin(&target);

    let outcome = service.analyze(image, &file_name).await;

    if !session.tracker().finish(&ticket) {
        info!(day = %target, "Discarding analysis for a day that changed");
        return Ok(AnalyzePhotoResponse {
            day_id: target,
            applied: false,
            ingredients: Vec::new(),
            recipes: Vec::new(),
            shopping_suggestions: Vec::new(),
        });
    }

    let result = outcome.map_err(|e| {
        warn!(day = %target, error = %e, "Photo analysis failed");
        e.to_string()
    })?;

    let response = AnalyzePhotoResponse {
        day_id: target.clone(),
        applied: true,
        ingredients: result.ingredients.clone(),
        recipes: result.recipes.iter().map(|r| r.name.clone()).collect(),
        shopping_suggestions: result.shopping_suggestions.clone(),
    };

    session.mutate(|ledger| {
        let index = ledger
            .position(&target)
            .ok_or_else(|| format!("Day not found: {}", target))?;
        ledger
            .record_analysis(index, Some(image_path.to_string()), result)
            .map_err(|e| e.to_string())
    })?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::analysis::AnalysisOutcome;
    use crate::models::{AnalysisResult, Macros, MicroValues, Recipe};
    use crate::tools::days;
    use crate::tools::session::test_support::session;

    struct FixedService {
        result: AnalysisResult,
    }

    #[async_trait]
    impl AnalysisService for FixedService {
        async fn analyze(&self, _image: Vec<u8>, _file_name: &str) -> AnalysisOutcome<AnalysisResult> {
            crate::analysis::check_payload(self.result.clone())
        }
    }

    /// Waits for a signal before answering
    struct GatedService {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl AnalysisService for GatedService {
        async fn analyze(&self, _image: Vec<u8>, _file_name: &str) -> AnalysisOutcome<AnalysisResult> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(sample())
        }
    }

    fn sample() -> AnalysisResult {
        AnalysisResult {
            ingredients: vec![Ingredient {
                name: "Eggs".into(),
                amount: Some("6".into()),
            }],
            recipes: vec![Recipe::new("Omelette", Macros::default(), MicroValues::zero())],
            ..Default::default()
        }
    }

    fn photo() -> String {
        let path = std::env::temp_dir().join(format!("fridgenutri-photo-{}.jpg", std::process::id()));
        std::fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_analyze_photo_records_result() {
        let session = session(2);
        let service = FixedService { result: sample() };
        let path = photo();

        let response = analyze_photo(&session, &service, Some("2025-01-07"), &path).await.unwrap();
        assert!(response.applied);
        assert_eq!(response.recipes, vec!["Omelette"]);

        let day = days::get_day(&session, Some("2025-01-07")).unwrap();
        assert_eq!(day.photo_url.as_deref(), Some(path.as_str()));
        assert_eq!(day.analysis.unwrap().ingredients.len(), 1);
        assert!(days::get_day(&session, None).unwrap().analysis.is_none());
    }

    #[tokio::test]
    async fn test_service_error_leaves_day_unchanged() {
        let session = session(1);
        let service = FixedService {
            result: AnalysisResult {
                error: Some("no food found".into()),
                ..Default::default()
            },
        };

        let err = analyze_photo(&session, &service, None, &photo()).await.unwrap_err();
        assert!(err.contains("no food found"));
        assert!(days::get_day(&session, None).unwrap().analysis.is_none());
        assert_eq!(session.tracker().pending(), 0);
    }

    #[tokio::test]
    async fn test_missing_image() {
        let session = session(1);
        let service = FixedService { result: sample() };
        let err = analyze_photo(&session, &service, None, "/nonexistent/fridge.jpg")
            .await
            .unwrap_err();
        assert!(err.contains("Could not read image"));
    }

    #[tokio::test]
    async fn test_reset_while_in_flight_discards_response() {
        let session = session(1);
        let service = GatedService {
            started: Notify::new(),
            release: Notify::new(),
        };
        let path = photo();

        let request = analyze_photo(&session, &service, None, &path);
        let interfere = async {
            service.started.notified().await;
            days::reset_day(&session, None).unwrap();
            service.release.notify_one();
        };
        let (response, ()) = tokio::join!(request, interfere);

        let response = response.unwrap();
        assert!(!response.applied);
        assert!(days::get_day(&session, None).unwrap().analysis.is_none());
    }
}
