//! Subcommand handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use saferoute_core::{rank_routes, ArtifactStore, CandidateRoute, RankMode, Route, StoreStatus};

/// Route batch as handed over by the routing provider.
///
/// Either a bare array of candidates or an object with a `routes` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RouteBatch {
    Bare(Vec<CandidateRoute>),
    Wrapped { routes: Vec<CandidateRoute> },
}

impl RouteBatch {
    pub fn into_routes(self) -> Vec<CandidateRoute> {
        match self {
            RouteBatch::Bare(routes) | RouteBatch::Wrapped { routes } => routes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub mode: RankMode,
    pub routes: Vec<Route>,
}

pub fn read_batch(path: &Path) -> Result<Vec<CandidateRoute>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading route batch {}", path.display()))?;
    let batch: RouteBatch = serde_json::from_str(&raw)
        .with_context(|| format!("parsing route batch {}", path.display()))?;
    Ok(batch.into_routes())
}

pub fn check(store: &ArtifactStore) -> Result<StoreStatus> {
    store
        .load()
        .with_context(|| format!("loading artifacts from {}", store.source().risk_grid.display()))?;
    Ok(store.status())
}

pub fn score(
    store: &ArtifactStore,
    candidates: &[CandidateRoute],
    mode: RankMode,
    sample_spacing_m: f64,
) -> Result<ScoreResponse> {
    store.load().context("loading artifacts")?;
    let scorer = store.scorer()?.with_sample_spacing(sample_spacing_m);

    let scored = scorer.score_routes(candidates);
    tracing::info!(routes = scored.len(), mode = %mode, "Scored route batch");

    Ok(ScoreResponse {
        mode,
        routes: rank_routes(scored, mode),
    })
}

pub fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
