//! Photo analysis
//!
//! Client for the external service that turns a fridge photo into
//! ingredients and recipe suggestions, plus the bookkeeping that keeps a late
//! response from landing on a day that has since moved on.

mod http;
mod tracker;

pub use http::{image_mime, HttpAnalysisService};
pub use tracker::{AnalysisTicket, AnalysisTracker};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::AnalysisResult;

/// Analysis error types. None of these touch the ledger.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Analysis service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Analysis response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Analysis service reported an error: {0}")]
    Service(String),

    #[error("Could not read image: {0}")]
    Image(#[from] std::io::Error),
}

/// Result type for analysis operations
pub type AnalysisOutcome<T> = Result<T, AnalysisError>;

/// Something that can analyse a photo
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, image: Vec<u8>, file_name: &str) -> AnalysisOutcome<AnalysisResult>;
}

/// Reject a decoded payload that carries an `error` field
pub fn check_payload(result: AnalysisResult) -> AnalysisOutcome<AnalysisResult> {
    match result.error {
        Some(error) => Err(AnalysisError::Service(error)),
        None => Ok(result),
    }
}
