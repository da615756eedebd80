//! Load-once store for the precomputed risk artifacts.
//!
//! The store is constructed by the host and shared (usually behind an `Arc`)
//! with every request. `load` reads the grid, the intersection table and the
//! scoring config exactly once; nothing is visible until all three parsed and
//! validated.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ArtifactLoadError, ScoringError};
use crate::grid::{RiskGrid, RiskGridFile};
use crate::models::{IntersectionPoint, ScoringConfig};
use crate::scoring::RiskScorer;

pub const RISK_GRID_FILE: &str = "risk_grid.json";
pub const INTERSECTIONS_FILE: &str = "intersections.json";
pub const SCORING_CONFIG_FILE: &str = "scoring_config.json";

/// Grid steps closer than this are considered equal.
const GRID_STEP_TOLERANCE: f64 = 1e-12;

/// Locations of the three artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub risk_grid: PathBuf,
    pub intersections: PathBuf,
    pub scoring_config: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside one directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            risk_grid: dir.join(RISK_GRID_FILE),
            intersections: dir.join(INTERSECTIONS_FILE),
            scoring_config: dir.join(SCORING_CONFIG_FILE),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::from_dir("data/artifacts")
    }
}

/// Validated, immutable artifact set.
#[derive(Debug, Clone)]
pub struct Artifacts {
    grid: RiskGrid,
    intersections: Vec<IntersectionPoint>,
    config: ScoringConfig,
    loaded_at: DateTime<Utc>,
}

impl Artifacts {
    /// Assemble an artifact set, checking it is internally consistent.
    pub fn from_parts(
        grid: RiskGrid,
        intersections: Vec<IntersectionPoint>,
        config: ScoringConfig,
    ) -> Result<Self, ArtifactLoadError> {
        config.validate()?;
        if (grid.step() - config.grid_step).abs() > GRID_STEP_TOLERANCE {
            return Err(ArtifactLoadError::GridStepMismatch {
                grid: grid.step(),
                config: config.grid_step,
            });
        }
        let mut ids = HashSet::with_capacity(intersections.len());
        for intersection in &intersections {
            if !ids.insert(intersection.id.as_str()) {
                return Err(ArtifactLoadError::DuplicateIntersection {
                    id: intersection.id.clone(),
                });
            }
        }
        Ok(Self {
            grid,
            intersections,
            config,
            loaded_at: Utc::now(),
        })
    }

    pub fn from_paths(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let grid_file: RiskGridFile = read_json(&paths.risk_grid)?;
        let intersections: Vec<IntersectionPoint> = read_json(&paths.intersections)?;
        let config: ScoringConfig = read_json(&paths.scoring_config)?;
        Self::from_parts(RiskGrid::from_file(grid_file)?, intersections, config)
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ArtifactLoadError> {
        Self::from_paths(&ArtifactPaths::from_dir(dir))
    }

    pub fn grid(&self) -> &RiskGrid {
        &self.grid
    }

    pub fn intersections(&self) -> &[IntersectionPoint] {
        &self.intersections
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ArtifactLoadError::Missing {
            path: path.to_path_buf(),
        },
        _ => ArtifactLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Snapshot of the store for health checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StoreStatus {
    NotLoaded,
    Ready {
        loaded_at: DateTime<Utc>,
        cell_count: usize,
        intersection_count: usize,
        grid_step: f64,
    },
    /// The one load attempt failed; the store will not retry.
    Failed { error: String },
}

type LoadOutcome = Result<Artifacts, Arc<ArtifactLoadError>>;

/// Owned artifact store with a one-time load lifecycle.
#[derive(Debug)]
pub struct ArtifactStore {
    source: ArtifactPaths,
    outcome: OnceLock<LoadOutcome>,
    load_guard: Mutex<()>,
}

impl ArtifactStore {
    /// Unloaded store reading from `source` on first `load`.
    pub fn new(source: ArtifactPaths) -> Self {
        Self {
            source,
            outcome: OnceLock::new(),
            load_guard: Mutex::new(()),
        }
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(ArtifactPaths::from_dir(dir))
    }

    /// Store that is ready immediately with already-built artifacts.
    pub fn preloaded(artifacts: Artifacts) -> Self {
        Self {
            source: ArtifactPaths::default(),
            outcome: OnceLock::from(Ok(artifacts)),
            load_guard: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &ArtifactPaths {
        &self.source
    }

    /// Load the artifacts on first call.
    ///
    /// Concurrent first callers serialize on the load guard; the first one
    /// reads the files and every caller, then and later, gets that outcome.
    /// A failure is final: the files are never read again.
    pub fn load(&self) -> Result<&Artifacts, Arc<ArtifactLoadError>> {
        if let Some(outcome) = self.outcome.get() {
            return outcome.as_ref().map_err(Arc::clone);
        }

        let _guard = self
            .load_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let outcome = self.outcome.get_or_init(|| self.read_artifacts());
        outcome.as_ref().map_err(Arc::clone)
    }

    fn read_artifacts(&self) -> LoadOutcome {
        let started = Instant::now();
        match Artifacts::from_paths(&self.source) {
            Ok(artifacts) => {
                tracing::info!(
                    cells = artifacts.grid().len(),
                    intersections = artifacts.intersections().len(),
                    grid_step = artifacts.grid().step(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Risk artifacts loaded"
                );
                Ok(artifacts)
            }
            Err(err) => {
                tracing::error!(
                    "Failed to load risk artifacts from {}: {}",
                    self.source.risk_grid.display(),
                    err
                );
                Err(Arc::new(err))
            }
        }
    }

    /// Loaded artifacts.
    ///
    /// [`ScoringError::NotReady`] before any load attempt finished,
    /// [`ScoringError::Unavailable`] once a load has failed.
    pub fn artifacts(&self) -> Result<&Artifacts, ScoringError> {
        match self.outcome.get() {
            None => Err(ScoringError::NotReady),
            Some(Ok(artifacts)) => Ok(artifacts),
            Some(Err(err)) => Err(ScoringError::Unavailable(Arc::clone(err))),
        }
    }

    /// Load on demand, mapping a load failure to [`ScoringError::Unavailable`].
    pub fn ensure_loaded(&self) -> Result<&Artifacts, ScoringError> {
        Ok(self.load()?)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.outcome.get(), Some(Ok(_)))
    }

    pub fn status(&self) -> StoreStatus {
        match self.outcome.get() {
            None => StoreStatus::NotLoaded,
            Some(Ok(artifacts)) => StoreStatus::Ready {
                loaded_at: artifacts.loaded_at(),
                cell_count: artifacts.grid().len(),
                intersection_count: artifacts.intersections().len(),
                grid_step: artifacts.grid().step(),
            },
            Some(Err(err)) => StoreStatus::Failed {
                error: err.to_string(),
            },
        }
    }

    /// Scorer bound to the loaded artifacts. Fails fast when not loaded.
    pub fn scorer(&self) -> Result<RiskScorer<'_>, ScoringError> {
        Ok(RiskScorer::new(self.artifacts()?))
    }
}
