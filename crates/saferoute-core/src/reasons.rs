//! Human-readable explanations of a route's score.

use serde::{Deserialize, Serialize};

use crate::models::{IntersectionPoint, RiskTier, Sample};
use crate::scoring::ScoringOutput;

/// Reasons surfaced as plain strings on a route.
pub const MAX_SURFACED_REASONS: usize = 4;

/// Per-sample feature thresholds.
const HIGH_CRASH_DENSITY: f64 = 0.5;
const HIGH_CRIME_DENSITY: f64 = 0.5;
const MAJOR_ROAD_PENALTY: f64 = 0.75;
const NO_BIKE_LANE_PENALTY: f64 = 0.7;

/// Intersections at or above either value count as severe.
const SEVERE_COMPLEXITY: f64 = 0.7;
const SEVERE_CRASH_CLUSTER: f64 = 0.5;

/// (medium, high) trigger levels.
const CRASH_PCT_LEVELS: (f64, f64) = (15.0, 50.0);
const CRIME_PCT_LEVELS: (f64, f64) = (15.0, 50.0);
const MAJOR_ROAD_PCT_LEVELS: (f64, f64) = (25.0, 60.0);
const NO_BIKE_LANE_PCT_LEVELS: (f64, f64) = (30.0, 70.0);
const SEVERE_INTERSECTION_LEVELS: (usize, usize) = (1, 3);
const CONTINUITY_BREAK_LEVELS: (usize, usize) = (2, 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    CrashHotspots,
    HighCrime,
    MajorRoads,
    NoBikeInfrastructure,
    ComplexIntersections,
    BikeLaneGaps,
    RelativelySafe,
}

/// One ranked explanation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    pub code: ReasonCode,
    pub severity: RiskTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub message: String,
}

/// Aggregate metrics the reasons are derived from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetrics {
    pub sample_count: usize,
    pub coverage_gaps: usize,
    pub high_crash_pct: f64,
    pub high_crime_pct: f64,
    pub major_road_pct: f64,
    pub no_bike_lane_pct: f64,
    pub nearby_intersections: usize,
    pub severe_intersections: usize,
    pub continuity_breaks: usize,
    pub mean_sample_risk: f64,
    pub raw_score: f64,
}

fn pct_of<F>(samples: &[Sample], predicate: F) -> f64
where
    F: Fn(&Sample) -> bool,
{
    if samples.is_empty() {
        return 0.0;
    }
    let hits = samples.iter().filter(|s| predicate(s)).count();
    hits as f64 * 100.0 / samples.len() as f64
}

pub fn is_severe_intersection(intersection: &IntersectionPoint) -> bool {
    intersection.complexity >= SEVERE_COMPLEXITY
        || intersection.crash_cluster >= SEVERE_CRASH_CLUSTER
}

pub fn route_metrics(output: &ScoringOutput) -> RouteMetrics {
    let samples = &output.samples;
    RouteMetrics {
        sample_count: samples.len(),
        coverage_gaps: output.coverage_gaps,
        high_crash_pct: pct_of(samples, |s| s.cell.crash_density > HIGH_CRASH_DENSITY),
        high_crime_pct: pct_of(samples, |s| s.cell.crime_density > HIGH_CRIME_DENSITY),
        major_road_pct: pct_of(samples, |s| s.cell.road_class_penalty >= MAJOR_ROAD_PENALTY),
        no_bike_lane_pct: pct_of(samples, |s| {
            s.cell.bike_lane_penalty >= NO_BIKE_LANE_PENALTY
        }),
        nearby_intersections: output.intersections.len(),
        severe_intersections: output
            .intersections
            .iter()
            .filter(|i| is_severe_intersection(i))
            .count(),
        continuity_breaks: output.continuity_breaks,
        mean_sample_risk: output.mean_sample_risk,
        raw_score: output.raw_score,
    }
}

fn pct_severity(pct: f64, (medium, high): (f64, f64)) -> Option<RiskTier> {
    if pct > high {
        Some(RiskTier::High)
    } else if pct > medium {
        Some(RiskTier::Medium)
    } else {
        None
    }
}

fn count_severity(count: usize, (medium, high): (usize, usize)) -> Option<RiskTier> {
    if count >= high {
        Some(RiskTier::High)
    } else if count >= medium {
        Some(RiskTier::Medium)
    } else {
        None
    }
}

fn pct_reason(code: ReasonCode, severity: RiskTier, pct: f64, what: &str) -> Reason {
    let rounded = (pct * 10.0).round() / 10.0;
    Reason {
        code,
        severity,
        value: Some(rounded),
        unit: Some("%".to_string()),
        message: format!("{:.0}% of the route {}", pct, what),
    }
}

fn count_reason(code: ReasonCode, severity: RiskTier, count: usize, unit: &str, message: String) -> Reason {
    Reason {
        code,
        severity,
        value: Some(count as f64),
        unit: Some(unit.to_string()),
        message,
    }
}

/// Ranked reasons, most severe first. Never empty.
pub fn explain(metrics: &RouteMetrics) -> Vec<Reason> {
    let mut reasons = Vec::new();

    if let Some(severity) = pct_severity(metrics.high_crash_pct, CRASH_PCT_LEVELS) {
        reasons.push(pct_reason(
            ReasonCode::CrashHotspots,
            severity,
            metrics.high_crash_pct,
            "passes through cyclist crash hotspots",
        ));
    }
    if let Some(severity) = pct_severity(metrics.high_crime_pct, CRIME_PCT_LEVELS) {
        reasons.push(pct_reason(
            ReasonCode::HighCrime,
            severity,
            metrics.high_crime_pct,
            "passes through high-crime blocks",
        ));
    }
    if let Some(severity) = pct_severity(metrics.major_road_pct, MAJOR_ROAD_PCT_LEVELS) {
        reasons.push(pct_reason(
            ReasonCode::MajorRoads,
            severity,
            metrics.major_road_pct,
            "runs along major arterial roads",
        ));
    }
    if let Some(severity) = pct_severity(metrics.no_bike_lane_pct, NO_BIKE_LANE_PCT_LEVELS) {
        reasons.push(pct_reason(
            ReasonCode::NoBikeInfrastructure,
            severity,
            metrics.no_bike_lane_pct,
            "has no protected or painted bike lane",
        ));
    }
    if let Some(severity) =
        count_severity(metrics.severe_intersections, SEVERE_INTERSECTION_LEVELS)
    {
        let n = metrics.severe_intersections;
        reasons.push(count_reason(
            ReasonCode::ComplexIntersections,
            severity,
            n,
            "intersections",
            format!(
                "Crosses {} complex intersection{}",
                n,
                if n == 1 { "" } else { "s" }
            ),
        ));
    }
    if let Some(severity) = count_severity(metrics.continuity_breaks, CONTINUITY_BREAK_LEVELS) {
        reasons.push(count_reason(
            ReasonCode::BikeLaneGaps,
            severity,
            metrics.continuity_breaks,
            "breaks",
            format!(
                "Bike lane drops out {} times along the way",
                metrics.continuity_breaks
            ),
        ));
    }

    if reasons.is_empty() {
        reasons.push(Reason {
            code: ReasonCode::RelativelySafe,
            severity: RiskTier::Low,
            value: None,
            unit: None,
            message: "Relatively safe route with no major risk factors".to_string(),
        });
    }

    // Stable: equal severities keep their fixed factor order.
    reasons.sort_by(|a, b| b.severity.cmp(&a.severity));
    reasons
}

/// Messages of the top reasons for display.
pub fn top_reasons(reasons: &[Reason]) -> Vec<String> {
    reasons
        .iter()
        .take(MAX_SURFACED_REASONS)
        .map(|r| r.message.clone())
        .collect()
}
