//! Ordering of scored route alternatives by rider preference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Route;

/// How much the rider trades travel time for safety.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMode {
    Fastest,
    Safer,
    #[default]
    Balanced,
}

impl RankMode {
    /// `(time_weight, risk_weight)` of the blended score.
    pub fn weights(&self) -> (f64, f64) {
        match self {
            RankMode::Fastest => (0.8, 0.2),
            RankMode::Safer => (0.2, 0.8),
            RankMode::Balanced => (0.5, 0.5),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankMode::Fastest => "fastest",
            RankMode::Safer => "safer",
            RankMode::Balanced => "balanced",
        }
    }
}

impl fmt::Display for RankMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rank mode {0:?} (expected fastest, safer or balanced)")]
pub struct ParseRankModeError(String);

impl FromStr for RankMode {
    type Err = ParseRankModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fastest" => Ok(RankMode::Fastest),
            "safer" | "safest" => Ok(RankMode::Safer),
            "balanced" => Ok(RankMode::Balanced),
            _ => Err(ParseRankModeError(s.to_string())),
        }
    }
}

/// Min-max normalize into [0, 1]. A flat batch maps to all zeros.
fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|v| {
            if span > 0.0 && span.is_finite() {
                (v - min) / span
            } else {
                0.0
            }
        })
        .collect()
}

/// Stable position id assigned after ranking.
pub fn position_id(position: usize) -> String {
    format!("route-{position}")
}

/// Sort a batch by blended time/risk score, best first, and relabel by position.
///
/// A single route is returned untouched, original id included.
pub fn rank_routes(routes: Vec<Route>, mode: RankMode) -> Vec<Route> {
    if routes.len() <= 1 {
        return routes;
    }

    let durations: Vec<f64> = routes.iter().map(|r| r.duration_s).collect();
    let risks: Vec<f64> = routes.iter().map(|r| r.score as f64).collect();
    let time_norm = normalize(&durations);
    let risk_norm = normalize(&risks);
    let (time_weight, risk_weight) = mode.weights();

    let mut blended: Vec<(f64, Route)> = routes
        .into_iter()
        .enumerate()
        .map(|(i, route)| (time_weight * time_norm[i] + risk_weight * risk_norm[i], route))
        .collect();
    blended.sort_by(|a, b| a.0.total_cmp(&b.0));

    blended
        .into_iter()
        .enumerate()
        .map(|(position, (_, mut route))| {
            route.id = position_id(position);
            route
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskTier;
    use crate::reasons::RouteMetrics;

    fn route(id: &str, score: u8, duration_s: f64) -> Route {
        Route {
            id: id.to_string(),
            coordinates: Vec::new(),
            duration_s,
            distance_m: duration_s * 4.0,
            score,
            tier: RiskTier::from_route_score(score as f64),
            reasons: Vec::new(),
            reason_details: Vec::new(),
            segments: Vec::new(),
            metrics: RouteMetrics::default(),
        }
    }

    fn distances(routes: &[Route]) -> Vec<f64> {
        routes.iter().map(|r| r.distance_m).collect()
    }

    #[test]
    fn safer_prefers_low_risk() {
        let a = route("a", 80, 600.0);
        let b = route("b", 20, 1200.0);
        let ranked = rank_routes(vec![a, b], RankMode::Safer);
        assert_eq!(distances(&ranked), vec![4800.0, 2400.0]);
        assert_eq!(ranked[0].id, "route-0");
        assert_eq!(ranked[1].id, "route-1");
    }

    #[test]
    fn fastest_prefers_short_duration() {
        let a = route("a", 80, 600.0);
        let b = route("b", 20, 1200.0);
        let ranked = rank_routes(vec![a, b], RankMode::Fastest);
        assert_eq!(distances(&ranked), vec![2400.0, 4800.0]);
    }

    #[test]
    fn balanced_ties_keep_input_order() {
        let a = route("a", 80, 600.0);
        let b = route("b", 20, 1200.0);
        let ranked = rank_routes(vec![a, b], RankMode::Balanced);
        assert_eq!(distances(&ranked), vec![2400.0, 4800.0]);
    }

    #[test]
    fn single_route_is_unchanged() {
        let only = route("upstream-7", 42, 900.0);
        let ranked = rank_routes(vec![only.clone()], RankMode::Safer);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "upstream-7");
        assert_eq!(ranked[0].score, only.score);
    }

    #[test]
    fn identical_durations_rank_by_risk() {
        let ranked = rank_routes(
            vec![route("a", 60, 600.0), route("b", 30, 600.0), route("c", 90, 600.0)],
            RankMode::Fastest,
        );
        let scores: Vec<u8> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![30, 60, 90]);
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("safer".parse::<RankMode>(), Ok(RankMode::Safer));
        assert_eq!("Fastest".parse::<RankMode>(), Ok(RankMode::Fastest));
        assert_eq!("balanced".parse::<RankMode>(), Ok(RankMode::Balanced));
        assert!("scenic".parse::<RankMode>().is_err());
    }
}
