//! Tier-colored map segments along a scored route.
//!
//! Consecutive samples sharing a tier form one segment. Each segment's line
//! runs from its first sample's vertex to the first vertex of the next
//! segment, so neighbouring segments meet without gaps. Long or volatile
//! routes are merged down to [`MAX_SEGMENTS`].

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::models::{GridCell, LngLat, RiskTier, Sample};

pub const MAX_SEGMENTS: usize = 12;
pub const MAX_SEGMENT_REASONS: usize = 3;

const SEGMENT_CRASH_DENSITY: f64 = 0.4;
const SEGMENT_CRIME_DENSITY: f64 = 0.4;
const SEGMENT_ROAD_PENALTY: f64 = 0.7;
const SEGMENT_BIKE_PENALTY: f64 = 0.7;

/// Contiguous same-tier stretch of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub geometry: Vec<LngLat>,
    /// Mean per-sample risk on the 0-100 scale.
    pub avg_risk: f64,
    pub tier: RiskTier,
    pub reasons: Vec<String>,
    pub sample_count: usize,
    pub start_vertex: usize,
    /// Inclusive. For all but the last segment this is the join vertex, the
    /// vertex of the next segment's first sample, so it is drawn by both.
    pub end_vertex: usize,
}

/// Per-sample risk on the 0-100 scale used for segment tiers.
pub fn segment_risk(sample: &Sample) -> f64 {
    (sample.risk * 100.0).clamp(1.0, 99.0)
}

fn sample_tier(sample: &Sample) -> RiskTier {
    RiskTier::from_segment_risk(segment_risk(sample))
}

/// Split scored samples into map segments of at most [`MAX_SEGMENTS`].
///
/// Returns nothing for routes with fewer than two vertices, since no segment
/// could be drawn.
pub fn segmentize(samples: &[Sample], coordinates: &[LngLat]) -> Vec<RouteSegment> {
    if samples.is_empty() || coordinates.len() < 2 {
        return Vec::new();
    }

    let runs = tier_runs(samples);
    let mut segments = Vec::with_capacity(runs.len());
    for (i, run) in runs.iter().enumerate() {
        let start_vertex = samples[run.start].vertex_index;
        let end_vertex = match runs.get(i + 1) {
            Some(next) => samples[next.start].vertex_index,
            None => samples[run.end - 1].vertex_index,
        };
        segments.push(build_segment(&samples[run.clone()], coordinates, start_vertex, end_vertex));
    }

    let built = segments.len();
    let segments = enforce_segment_cap(segments, MAX_SEGMENTS);
    if segments.len() < built {
        tracing::debug!(
            built,
            merged = segments.len(),
            "Merged route segments down to cap"
        );
    }
    segments
}

fn tier_runs(samples: &[Sample]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..samples.len() {
        if sample_tier(&samples[i]) != sample_tier(&samples[i - 1]) {
            runs.push(start..i);
            start = i;
        }
    }
    runs.push(start..samples.len());
    runs
}

fn build_segment(
    run: &[Sample],
    coordinates: &[LngLat],
    start_vertex: usize,
    end_vertex: usize,
) -> RouteSegment {
    let count = run.len() as f64;
    let avg_risk = run.iter().map(segment_risk).sum::<f64>() / count;

    let mut features = GridCell {
        crash_density: 0.0,
        crime_density: 0.0,
        road_class_penalty: 0.0,
        bike_lane_penalty: 0.0,
        bike_coverage: 0.0,
    };
    for sample in run {
        features.crash_density += sample.cell.crash_density / count;
        features.crime_density += sample.cell.crime_density / count;
        features.road_class_penalty += sample.cell.road_class_penalty / count;
        features.bike_lane_penalty += sample.cell.bike_lane_penalty / count;
        features.bike_coverage += sample.cell.bike_coverage / count;
    }

    let (geometry, start_vertex, end_vertex) = slice_geometry(coordinates, start_vertex, end_vertex);
    RouteSegment {
        geometry,
        avg_risk,
        tier: RiskTier::from_segment_risk(avg_risk),
        reasons: segment_reasons(&features),
        sample_count: run.len(),
        start_vertex,
        end_vertex,
    }
}

/// Slice `[start, end]` out of the polyline, widening single points to a line.
///
/// Requires at least two coordinates.
fn slice_geometry(
    coordinates: &[LngLat],
    start: usize,
    end: usize,
) -> (Vec<LngLat>, usize, usize) {
    let last = coordinates.len() - 1;
    let mut start = start.min(end).min(last);
    let mut end = end.max(start).min(last);
    if start == end {
        if start > 0 {
            start -= 1;
        } else {
            end += 1;
        }
    }
    (coordinates[start..=end].to_vec(), start, end)
}

fn segment_reasons(features: &GridCell) -> Vec<String> {
    let checks = [
        (features.crash_density > SEGMENT_CRASH_DENSITY, "Crash hotspot"),
        (features.crime_density > SEGMENT_CRIME_DENSITY, "Elevated crime"),
        (features.road_class_penalty >= SEGMENT_ROAD_PENALTY, "Busy road"),
        (features.bike_lane_penalty >= SEGMENT_BIKE_PENALTY, "No bike lane"),
    ];
    checks
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, label)| label.to_string())
        .take(MAX_SEGMENT_REASONS)
        .collect()
}

fn merge_segments(first: RouteSegment, second: RouteSegment) -> RouteSegment {
    let sample_count = first.sample_count + second.sample_count;
    let avg_risk = (first.avg_risk * first.sample_count as f64
        + second.avg_risk * second.sample_count as f64)
        / sample_count.max(1) as f64;

    // Geometries are contiguous vertex ranges; drop whatever `second` repeats
    // of `first`, which is at least the shared join vertex.
    let overlap = (first.end_vertex + 1).saturating_sub(second.start_vertex);
    let end_vertex = first.end_vertex.max(second.end_vertex);
    let mut geometry = first.geometry;
    geometry.extend(second.geometry.into_iter().skip(overlap));

    let mut reasons = first.reasons;
    for reason in second.reasons {
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }
    reasons.truncate(MAX_SEGMENT_REASONS);

    RouteSegment {
        geometry,
        avg_risk,
        tier: RiskTier::from_segment_risk(avg_risk),
        reasons,
        sample_count,
        start_vertex: first.start_vertex,
        end_vertex,
    }
}

/// Merge runs of adjacent segments that share a tier.
fn coalesce_same_tier(segments: Vec<RouteSegment>) -> Vec<RouteSegment> {
    let mut out: Vec<RouteSegment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match out.pop() {
            Some(prev) if prev.tier == segment.tier => out.push(merge_segments(prev, segment)),
            Some(prev) => {
                out.push(prev);
                out.push(segment);
            }
            None => out.push(segment),
        }
    }
    out
}

/// Merge neighbours pairwise, in order: (0, 1), (2, 3), ...
fn merge_pairs(segments: Vec<RouteSegment>) -> Vec<RouteSegment> {
    let mut out = Vec::with_capacity(segments.len().div_ceil(2));
    let mut iter = segments.into_iter();
    while let Some(first) = iter.next() {
        match iter.next() {
            Some(second) => out.push(merge_segments(first, second)),
            None => out.push(first),
        }
    }
    out
}

/// Reduce to at most `cap` segments while preserving order and geometry.
///
/// Same-tier neighbours are folded first; if that is not enough, neighbours
/// are merged pairwise (tiers recomputed from the averaged risk) and the
/// same-tier fold repeats.
pub fn enforce_segment_cap(segments: Vec<RouteSegment>, cap: usize) -> Vec<RouteSegment> {
    let cap = cap.max(1);
    let mut segments = segments;
    while segments.len() > cap {
        segments = coalesce_same_tier(segments);
        if segments.len() <= cap {
            break;
        }
        segments = merge_pairs(segments);
    }
    segments
}
