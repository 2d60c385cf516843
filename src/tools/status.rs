//! FridgeNutri Status Tool
//!
//! Provides runtime status information about the FridgeNutri service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use super::session::Session;
use crate::build_info::BuildInfo;

/// Usage notes returned alongside the status
pub const USAGE_NOTES: &str = r#"
# FridgeNutri

Tracks what you eat day by day from photos of your fridge.

1. `analyze_photo` with an image path sends the photo for analysis and stores
   the ingredients and suggested recipes on the day (current day by default).
2. `add_recipe` chooses one of the suggested recipes into the day; the day's
   nutrient totals are the sum of its chosen recipes.
3. `diet_score` rates the day from 0 to 100 against your goals;
   `nutrient_progress` shows which micronutrients are low and foods that help.

Days are addressed by id (`YYYY-MM-DD`). At least one day always exists.
"#;

/// Runtime status information
#[derive(Debug, Clone, Serialize)]
pub struct FridgeNutriStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Ledger information
    pub days_tracked: usize,
    pub current_day: String,
    pub pending_analyses: usize,
    pub analysis_url: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    analysis_url: String,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, analysis_url: String) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            analysis_url,
        }
    }

    /// Get the current status
    pub fn get_status(&self, session: &Session) -> FridgeNutriStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        let (days_tracked, current_day) =
            session.read(|ledger| (ledger.len(), ledger.current_day().id.clone()));

        FridgeNutriStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            build_profile: build_info.profile,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            days_tracked,
            current_day,
            pending_analyses: session.tracker().pending(),
            analysis_url: self.analysis_url.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
