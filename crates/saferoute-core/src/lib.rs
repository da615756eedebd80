pub mod artifacts;
pub mod error;
pub mod grid;
pub mod intersections;
pub mod models;
pub mod ranking;
pub mod reasons;
pub mod sampling;
pub mod scoring;
pub mod segments;
pub mod spatial;

pub use artifacts::{ArtifactPaths, ArtifactStore, Artifacts, StoreStatus};
pub use error::{ArtifactLoadError, ScoringError};
pub use grid::{CellKey, RiskGrid};
pub use intersections::find_nearby_intersections;
pub use models::{
    CandidateRoute, GridCell, IntersectionPoint, LngLat, Normalization, RiskTier, Route, Sample,
    ScoringConfig, ScoringWeights,
};
pub use ranking::{rank_routes, RankMode};
pub use reasons::{explain, Reason, ReasonCode, RouteMetrics};
pub use sampling::{sample_polyline, SamplePoint, DEFAULT_SAMPLE_SPACING_M};
pub use scoring::{normalize_score, RiskScorer, ScoringOutput};
pub use segments::{segmentize, RouteSegment, MAX_SEGMENTS};
