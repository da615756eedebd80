//! Host configuration from environment.

use std::env;
use std::path::PathBuf;

use saferoute_core::DEFAULT_SAMPLE_SPACING_M;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding risk_grid.json, intersections.json and scoring_config.json
    pub artifact_dir: PathBuf,
    pub sample_spacing_m: f64,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            artifact_dir: lookup("SAFEROUTE_ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/artifacts")),
            sample_spacing_m: lookup("SAFEROUTE_SAMPLE_SPACING_M")
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(DEFAULT_SAMPLE_SPACING_M),
            log_json: lookup("SAFEROUTE_LOG_JSON")
                .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}
