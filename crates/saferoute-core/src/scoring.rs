//! Route risk aggregation.
//!
//! Per-sample risk is a weighted sum of the cell features. The route's raw
//! score adds a saturating penalty for abrupt bike-infrastructure loss and an
//! unbounded penalty for complex intersections, then is rescaled to 1-99.

use serde::{Deserialize, Serialize};

use crate::artifacts::Artifacts;
use crate::intersections::find_nearby_intersections;
use crate::models::{
    CandidateRoute, GridCell, IntersectionPoint, LngLat, Normalization, RiskTier, Route, Sample,
    ScoringWeights,
};
use crate::reasons::{explain, route_metrics, top_reasons};
use crate::sampling::{sample_polyline, DEFAULT_SAMPLE_SPACING_M};
use crate::segments::segmentize;

/// Bike lane penalty increase between adjacent samples that counts as a break.
pub const CONTINUITY_BREAK_DELTA: f64 = 0.3;
/// Break count at which the continuity penalty saturates.
pub const CONTINUITY_BREAKS_FOR_MAX: usize = 5;
/// Absorbs float noise in penalty deltas (0.8 - 0.5 is not exactly 0.3).
const DELTA_EPSILON: f64 = 1e-9;

pub const MIN_NORMALIZED_SCORE: f64 = 1.0;
pub const MAX_NORMALIZED_SCORE: f64 = 99.0;

/// Everything the aggregator derived for one polyline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringOutput {
    pub samples: Vec<Sample>,
    pub intersections: Vec<IntersectionPoint>,
    pub continuity_breaks: usize,
    pub continuity_penalty: f64,
    pub intersection_penalty: f64,
    pub mean_sample_risk: f64,
    pub raw_score: f64,
    pub normalized_score: u8,
    pub tier: RiskTier,
    /// Samples that fell outside the grid and used the pessimistic default.
    pub coverage_gaps: usize,
}

/// Weighted risk of one cell.
pub fn sample_risk(cell: &GridCell, weights: &ScoringWeights) -> f64 {
    weights.crash_density * cell.crash_density
        + weights.crime_density * cell.crime_density
        + weights.road_class_penalty * cell.road_class_penalty
        + weights.bike_lane_penalty * cell.bike_lane_penalty
}

/// Number of abrupt bike infrastructure losses between adjacent samples.
pub fn count_continuity_breaks(samples: &[Sample]) -> usize {
    samples
        .windows(2)
        .filter(|pair| {
            pair[1].cell.bike_lane_penalty - pair[0].cell.bike_lane_penalty
                > CONTINUITY_BREAK_DELTA + DELTA_EPSILON
        })
        .count()
}

/// Saturating penalty in [0, 1] for a break count.
pub fn continuity_penalty(breaks: usize) -> f64 {
    (breaks as f64 / CONTINUITY_BREAKS_FOR_MAX as f64).min(1.0)
}

/// Rescale a raw score onto [1, 99].
///
/// Never returns 0 or 100. A non-finite raw score is treated as maximal risk.
pub fn normalize_score(raw: f64, normalization: &Normalization) -> u8 {
    if raw.is_nan() {
        return MAX_NORMALIZED_SCORE as u8;
    }
    let span = normalization.route_raw_max - normalization.route_raw_min;
    let scaled = (raw - normalization.route_raw_min) / span * 100.0;
    let clamped = if scaled.is_nan() {
        MAX_NORMALIZED_SCORE
    } else {
        scaled.clamp(MIN_NORMALIZED_SCORE, MAX_NORMALIZED_SCORE)
    };
    clamped.round() as u8
}

/// Scores polylines against one loaded artifact set.
///
/// Holds only shared references, so any number of scorers can run in
/// parallel over the same artifacts.
#[derive(Debug, Clone, Copy)]
pub struct RiskScorer<'a> {
    artifacts: &'a Artifacts,
    sample_spacing_m: f64,
}

impl<'a> RiskScorer<'a> {
    pub fn new(artifacts: &'a Artifacts) -> Self {
        Self {
            artifacts,
            sample_spacing_m: DEFAULT_SAMPLE_SPACING_M,
        }
    }

    pub fn with_sample_spacing(mut self, spacing_m: f64) -> Self {
        self.sample_spacing_m = spacing_m;
        self
    }

    pub fn sample_spacing_m(&self) -> f64 {
        self.sample_spacing_m
    }

    /// Sample, resolve and aggregate a `[lng, lat]` polyline.
    pub fn score_polyline(&self, coordinates: &[LngLat]) -> ScoringOutput {
        let config = self.artifacts.config();
        let grid = self.artifacts.grid();
        let points = sample_polyline(coordinates, self.sample_spacing_m);

        let mut coverage_gaps = 0;
        let samples: Vec<Sample> = points
            .iter()
            .map(|point| {
                let cell = match grid.lookup(point.lat, point.lng) {
                    Some(cell) => *cell,
                    None => {
                        coverage_gaps += 1;
                        GridCell::OUT_OF_COVERAGE
                    }
                };
                Sample {
                    lat: point.lat,
                    lng: point.lng,
                    vertex_index: point.vertex_index,
                    cell,
                    risk: sample_risk(&cell, &config.weights),
                }
            })
            .collect();

        let intersections: Vec<IntersectionPoint> = find_nearby_intersections(
            &points,
            self.artifacts.intersections(),
            config.intersection_search_radius_deg,
        )
        .into_iter()
        .cloned()
        .collect();

        let continuity_breaks = count_continuity_breaks(&samples);
        let continuity_penalty = continuity_penalty(continuity_breaks);
        let complexity_sum: f64 = intersections.iter().map(|i| i.complexity).sum();
        let intersection_penalty = config.intersection_lambda * complexity_sum;
        let mean_sample_risk = if samples.is_empty() {
            0.0
        } else {
            samples.iter().map(|s| s.risk).sum::<f64>() / samples.len() as f64
        };

        let raw_score = mean_sample_risk
            + config.weights.continuity_penalty * continuity_penalty
            + intersection_penalty;
        let normalized_score = normalize_score(raw_score, &config.normalization);
        let tier = RiskTier::from_route_score(normalized_score as f64);

        if coverage_gaps > 0 {
            tracing::debug!(
                coverage_gaps,
                samples = samples.len(),
                "Route samples outside risk grid coverage"
            );
        }

        ScoringOutput {
            samples,
            intersections,
            continuity_breaks,
            continuity_penalty,
            intersection_penalty,
            mean_sample_risk,
            raw_score,
            normalized_score,
            tier,
            coverage_gaps,
        }
    }

    /// Full assessment of one candidate: score, reasons and map segments.
    pub fn score_route(&self, candidate: &CandidateRoute) -> Route {
        let output = self.score_polyline(&candidate.coordinates);
        let metrics = route_metrics(&output);
        let reason_details = explain(&metrics);
        let segments = segmentize(&output.samples, &candidate.coordinates);

        tracing::debug!(
            route_id = %candidate.id,
            score = output.normalized_score,
            tier = output.tier.as_str(),
            samples = output.samples.len(),
            intersections = output.intersections.len(),
            segments = segments.len(),
            "Scored route"
        );

        Route {
            id: candidate.id.clone(),
            coordinates: candidate.coordinates.clone(),
            duration_s: candidate.duration_s,
            distance_m: candidate.distance_m,
            score: output.normalized_score,
            tier: output.tier,
            reasons: top_reasons(&reason_details),
            reason_details,
            segments,
            metrics,
        }
    }

    /// Score every candidate in a batch, preserving order.
    pub fn score_routes(&self, candidates: &[CandidateRoute]) -> Vec<Route> {
        candidates.iter().map(|c| self.score_route(c)).collect()
    }
}
