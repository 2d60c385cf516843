//! Runtime configuration
//!
//! Read from `FRIDGENUTRI_*` environment variables with defaults for a
//! local setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::ledger::DayLedger;
use crate::models::NutrientGoals;

pub const DATABASE_PATH_ENV: &str = "FRIDGENUTRI_DATABASE_PATH";
pub const ANALYSIS_URL_ENV: &str = "FRIDGENUTRI_ANALYSIS_URL";
pub const ANALYSIS_TIMEOUT_ENV: &str = "FRIDGENUTRI_ANALYSIS_TIMEOUT_SECS";
pub const INITIAL_DAYS_ENV: &str = "FRIDGENUTRI_INITIAL_DAYS";
pub const GOAL_DEFAULTS_ENV: &str = "FRIDGENUTRI_GOAL_DEFAULTS";

pub const DEFAULT_ANALYSIS_URL: &str = "http://localhost:8000/analyze";
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 60;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Could not read goal defaults from {path}: {source}")]
    GoalDefaultsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid goal defaults in {path}: {source}")]
    GoalDefaultsJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub analysis_url: String,
    pub analysis_timeout: Duration,
    pub initial_days: usize,
    /// Goals used wherever the profile has none
    pub goal_defaults: NutrientGoals,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            analysis_url: DEFAULT_ANALYSIS_URL.to_string(),
            analysis_timeout: Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS),
            initial_days: DayLedger::DEFAULT_DAYS,
            goal_defaults: NutrientGoals::builtin(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; unset and blank variables take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = AppConfig::default();

        if let Some(path) = get(DATABASE_PATH_ENV) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(url) = get(ANALYSIS_URL_ENV) {
            config.analysis_url = url.trim().to_string();
        }
        if let Some(raw) = get(ANALYSIS_TIMEOUT_ENV) {
            config.analysis_timeout = Duration::from_secs(positive(ANALYSIS_TIMEOUT_ENV, &raw)? as u64);
        }
        if let Some(raw) = get(INITIAL_DAYS_ENV) {
            config.initial_days = positive(INITIAL_DAYS_ENV, &raw)?;
        }
        if let Some(path) = get(GOAL_DEFAULTS_ENV) {
            config.goal_defaults = load_goal_defaults(Path::new(&path))?;
        }

        Ok(config)
    }
}

fn positive(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        }),
    }
}

/// Goals from a JSON file; goals the file leaves out keep the built-in value
pub fn load_goal_defaults(path: &Path) -> Result<NutrientGoals, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::GoalDefaultsIo {
        path: path.to_path_buf(),
        source,
    })?;
    let goals: NutrientGoals =
        serde_json::from_str(&raw).map_err(|source| ConfigError::GoalDefaultsJson {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(goals.with_fallback(&NutrientGoals::builtin()))
}

/// `<project>/data/fridgenutri.db`, found from the executable location
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("fridgenutri.db");
    path
}
