//! End-to-end scoring tests against on-disk artifacts.

mod common;

use saferoute_core::{
    rank_routes, ArtifactStore, CandidateRoute, LngLat, RankMode, ReasonCode, RiskTier,
    MAX_SEGMENTS,
};

fn hotspot_route(id: &str) -> CandidateRoute {
    CandidateRoute {
        id: id.to_string(),
        coordinates: vec![
            LngLat::new(0.0002, 0.0005),
            LngLat::new(0.0010, 0.0010),
            LngLat::new(0.0018, 0.0015),
        ],
        duration_s: 300.0,
        distance_m: 150.0,
    }
}

/// Straight line well outside the grid, in unmapped territory.
fn unmapped_route(id: &str, duration_s: f64) -> CandidateRoute {
    CandidateRoute {
        id: id.to_string(),
        coordinates: (0..10)
            .map(|i| LngLat::new(-0.05 - i as f64 * 0.0005, -0.05))
            .collect(),
        duration_s,
        distance_m: 380.0,
    }
}

#[test]
fn crash_hotspot_route_is_high_risk() {
    let dir = common::hotspot_artifacts();
    let store = ArtifactStore::from_dir(&dir);
    store.load().expect("load artifacts");
    let scorer = store.scorer().expect("ready");

    let route = scorer.score_route(&hotspot_route("upstream-0"));

    assert_eq!(route.tier, RiskTier::High);
    assert!(route.score >= 70 && route.score <= 99);
    assert_eq!(route.metrics.coverage_gaps, 0);
    assert_eq!(route.metrics.nearby_intersections, 1);
    assert_eq!(route.reason_details[0].code, ReasonCode::CrashHotspots);
    assert_eq!(route.reason_details[0].severity, RiskTier::High);
    assert!(route.reasons.len() <= 4);
    assert!(!route.segments.is_empty());
    assert!(route.segments.iter().all(|s| s.geometry.len() >= 2));
}

#[test]
fn unmapped_route_is_never_scored_as_safe() {
    let dir = common::hotspot_artifacts();
    let store = ArtifactStore::from_dir(&dir);
    store.load().expect("load artifacts");

    let route = store
        .scorer()
        .expect("ready")
        .score_route(&unmapped_route("unmapped", 600.0));

    assert_eq!(route.metrics.coverage_gaps, route.metrics.sample_count);
    // Default road 0.5 and bike 0.8 penalties: 0.22 * 1.3 = 0.286 raw on a 0-0.4 scale.
    assert_eq!(route.tier, RiskTier::High);
    assert!(route
        .reason_details
        .iter()
        .any(|r| r.code == ReasonCode::NoBikeInfrastructure));
}

#[test]
fn scored_batch_ranks_by_mode() {
    let dir = common::hotspot_artifacts();
    let store = ArtifactStore::from_dir(&dir);
    store.load().expect("load artifacts");
    let scorer = store.scorer().expect("ready");

    let candidates = vec![hotspot_route("quick"), unmapped_route("slow", 1200.0)];
    let scored = scorer.score_routes(&candidates);
    assert_eq!(scored.len(), 2);
    assert!(scored[0].score > scored[1].score);

    let fastest = rank_routes(scored.clone(), RankMode::Fastest);
    assert_eq!(fastest[0].duration_s, 300.0);
    assert_eq!(fastest[0].id, "route-0");

    let safer = rank_routes(scored, RankMode::Safer);
    assert_eq!(safer[0].duration_s, 1200.0);
    assert_eq!(safer[1].id, "route-1");
}

#[test]
fn long_volatile_route_respects_segment_cap() {
    let dir = common::hotspot_artifacts();
    let store = ArtifactStore::from_dir(&dir);
    store.load().expect("load artifacts");

    // Zig-zag in and out of the hotspot cell every vertex, ~110 m apart.
    let coordinates: Vec<LngLat> = (0..60)
        .map(|i| {
            let lat = if i % 2 == 0 { 0.0010 } else { 0.0030 };
            LngLat::new(0.0001 + i as f64 * 0.00002, lat)
        })
        .collect();
    let candidate = CandidateRoute {
        id: "zigzag".to_string(),
        coordinates,
        duration_s: 900.0,
        distance_m: 6_600.0,
    };

    let route = store.scorer().expect("ready").score_route(&candidate);
    assert!(route.segments.len() <= MAX_SEGMENTS);
    assert!(route.segments.iter().all(|s| s.geometry.len() >= 2));
    assert!(route.metrics.coverage_gaps > 0);
}

#[test]
fn routes_round_trip_through_json() {
    let dir = common::hotspot_artifacts();
    let store = ArtifactStore::from_dir(&dir);
    store.load().expect("load artifacts");

    let route = store
        .scorer()
        .expect("ready")
        .score_route(&hotspot_route("upstream-0"));
    let json = serde_json::to_value(&route).expect("serialize");
    assert_eq!(json["tier"], "high");
    assert!(json["segments"][0]["geometry"][0].is_array());

    let back: saferoute_core::Route = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back.score, route.score);
    assert_eq!(back.segments.len(), route.segments.len());
}
