//! Error types for artifact loading and scoring.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Failure to load the precomputed risk artifacts.
///
/// Fatal to scoring: the store keeps the failure and every later scoring
/// request reports [`ScoringError::Unavailable`].
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("artifact not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid grid cell key {key:?}")]
    InvalidCellKey { key: String },

    #[error("duplicate grid cell key {key:?}")]
    DuplicateCell { key: String },

    #[error("duplicate intersection id {id:?}")]
    DuplicateIntersection { id: String },

    #[error("grid step {grid} does not match scoring config step {config}")]
    GridStepMismatch { grid: f64, config: f64 },

    #[error("invalid scoring config: {0}")]
    InvalidConfig(String),
}

/// Failure to score a route.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Artifacts have not been loaded yet. Retry after `load` completes.
    #[error("risk artifacts are not loaded")]
    NotReady,

    /// Artifacts could not be loaded. Not retryable.
    #[error("scoring unavailable: {0}")]
    Unavailable(#[from] Arc<ArtifactLoadError>),
}

impl ScoringError {
    /// Whether retrying the request can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoringError::NotReady)
    }
}
