//! Core data models for route risk scoring.

use serde::{Deserialize, Serialize};

use crate::error::ArtifactLoadError;
use crate::reasons::{Reason, RouteMetrics};
use crate::segments::RouteSegment;

/// Route-level score at which a route becomes medium risk.
pub const ROUTE_TIER_MEDIUM_AT: f64 = 40.0;
/// Route-level score at which a route becomes high risk.
pub const ROUTE_TIER_HIGH_AT: f64 = 70.0;
/// Per-sample risk (0-100) at which a segment becomes medium risk.
///
/// Tuned separately from the route thresholds; keep them distinct.
pub const SEGMENT_TIER_MEDIUM_AT: f64 = 35.0;
/// Per-sample risk (0-100) at which a segment becomes high risk.
pub const SEGMENT_TIER_HIGH_AT: f64 = 65.0;

/// A `[lng, lat]` coordinate pair, GeoJSON order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat(pub f64, pub f64);

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self(lng, lat)
    }

    pub fn lng(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

/// Discretized risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Tier for a normalized route score (40/70 thresholds).
    pub fn from_route_score(score: f64) -> Self {
        if score < ROUTE_TIER_MEDIUM_AT {
            RiskTier::Low
        } else if score < ROUTE_TIER_HIGH_AT {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    /// Tier for a per-sample or per-segment risk on the 0-100 scale (35/65 thresholds).
    pub fn from_segment_risk(risk: f64) -> Self {
        if risk < SEGMENT_TIER_MEDIUM_AT {
            RiskTier::Low
        } else if risk < SEGMENT_TIER_HIGH_AT {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

/// Precomputed features of one risk grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub crash_density: f64,
    /// Grids built without crime data omit this column.
    #[serde(default)]
    pub crime_density: f64,
    pub road_class_penalty: f64,
    pub bike_lane_penalty: f64,
    #[serde(default)]
    pub bike_coverage: f64,
}

impl GridCell {
    /// Features assumed for points outside the grid.
    ///
    /// Unknown road class and missing bike infrastructure, so unmapped areas
    /// never score as safe.
    pub const OUT_OF_COVERAGE: GridCell = GridCell {
        crash_density: 0.0,
        crime_density: 0.0,
        road_class_penalty: 0.5,
        bike_lane_penalty: 0.8,
        bike_coverage: 0.0,
    };
}

impl Default for GridCell {
    fn default() -> Self {
        Self::OUT_OF_COVERAGE
    }
}

/// Street intersection with precomputed complexity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionPoint {
    pub id: String,
    pub lng: f64,
    pub lat: f64,
    pub complexity: f64,
    #[serde(default)]
    pub crash_cluster: f64,
}

/// Per-factor weights of the risk formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub crash_density: f64,
    #[serde(default)]
    pub crime_density: f64,
    pub road_class_penalty: f64,
    pub bike_lane_penalty: f64,
    pub continuity_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            crash_density: 0.35,
            crime_density: 0.15,
            road_class_penalty: 0.22,
            bike_lane_penalty: 0.22,
            continuity_penalty: 0.06,
        }
    }
}

/// Raw score bounds mapped onto 0-100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Normalization {
    pub route_raw_min: f64,
    pub route_raw_max: f64,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            route_raw_min: 0.05,
            route_raw_max: 2.50,
        }
    }
}

/// Scoring constants exported alongside the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Grid cell size in degrees. Must match the grid's own step.
    pub grid_step: f64,
    pub weights: ScoringWeights,
    pub intersection_lambda: f64,
    pub normalization: Normalization,
    /// Intersection search radius in degrees (~30 m at the default).
    pub intersection_search_radius_deg: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            grid_step: 0.002,
            weights: ScoringWeights::default(),
            intersection_lambda: 0.08,
            normalization: Normalization::default(),
            intersection_search_radius_deg: 0.0003,
        }
    }
}

impl ScoringConfig {
    /// Reject configs that would produce meaningless scores.
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        let w = &self.weights;
        let named = [
            ("gridStep", self.grid_step),
            ("weights.crashDensity", w.crash_density),
            ("weights.crimeDensity", w.crime_density),
            ("weights.roadClassPenalty", w.road_class_penalty),
            ("weights.bikeLanePenalty", w.bike_lane_penalty),
            ("weights.continuityPenalty", w.continuity_penalty),
            ("intersectionLambda", self.intersection_lambda),
            ("normalization.routeRawMin", self.normalization.route_raw_min),
            ("normalization.routeRawMax", self.normalization.route_raw_max),
            ("intersectionSearchRadiusDeg", self.intersection_search_radius_deg),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(ArtifactLoadError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.grid_step <= 0.0 {
            return Err(ArtifactLoadError::InvalidConfig(format!(
                "gridStep must be positive, got {}",
                self.grid_step
            )));
        }
        if self.intersection_search_radius_deg < 0.0 {
            return Err(ArtifactLoadError::InvalidConfig(
                "intersectionSearchRadiusDeg must not be negative".to_string(),
            ));
        }
        if self.normalization.route_raw_max <= self.normalization.route_raw_min {
            return Err(ArtifactLoadError::InvalidConfig(format!(
                "normalization range [{}, {}] is empty",
                self.normalization.route_raw_min, self.normalization.route_raw_max
            )));
        }
        Ok(())
    }
}

/// A representative point along a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub lat: f64,
    pub lng: f64,
    /// Index of the polyline vertex this sample was taken from.
    pub vertex_index: usize,
    pub cell: GridCell,
    /// Weighted per-sample risk, nominally 0-1.
    pub risk: f64,
}

/// A route alternative as returned by the upstream route provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRoute {
    pub id: String,
    pub coordinates: Vec<LngLat>,
    pub duration_s: f64,
    pub distance_m: f64,
}

/// A candidate route with its risk assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub coordinates: Vec<LngLat>,
    pub duration_s: f64,
    pub distance_m: f64,
    /// Normalized risk score, 1-99.
    pub score: u8,
    pub tier: RiskTier,
    /// Top reasons, most severe first.
    pub reasons: Vec<String>,
    pub reason_details: Vec<Reason>,
    pub segments: Vec<RouteSegment>,
    pub metrics: RouteMetrics,
}
