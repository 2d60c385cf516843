use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, warn};

use super::{check_payload, AnalysisError, AnalysisOutcome, AnalysisService};
use crate::models::AnalysisResult;

/// Multipart upload to the analysis endpoint
#[derive(Clone)]
pub struct HttpAnalysisService {
    client: Client,
    url: String,
}

impl HttpAnalysisService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AnalysisOutcome<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, image: Vec<u8>, file_name: &str) -> AnalysisOutcome<AnalysisResult> {
        let size = image.len();
        let part = Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str(image_mime(file_name))?;
        let form = Form::new().part("file", part);

        debug!(url = %self.url, file = %file_name, bytes = size, "Sending photo for analysis");
        let response = self.client.post(&self.url).multipart(form).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Analysis service rejected photo");
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let result: AnalysisResult = serde_json::from_str(&text)?;
        let result = check_payload(result)?;
        info!(
            ingredients = result.ingredients.len(),
            recipes = result.recipes.len(),
            "Photo analysed"
        );
        Ok(result)
    }
}

/// Content type for an image file name
pub fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
