//! Artifact fixtures written to a throwaway directory.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Unique artifact directory, removed when dropped.
pub struct TempArtifactDir(PathBuf);

impl Deref for TempArtifactDir {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for TempArtifactDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempArtifactDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

pub fn temp_artifact_dir() -> TempArtifactDir {
    let dir = std::env::temp_dir().join(format!("saferoute-test-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    TempArtifactDir(dir)
}

pub fn scoring_config(route_raw_max: f64) -> Value {
    json!({
        "gridStep": 0.002,
        "weights": {
            "crashDensity": 0.35,
            "crimeDensity": 0.15,
            "roadClassPenalty": 0.22,
            "bikeLanePenalty": 0.22,
            "continuityPenalty": 0.06
        },
        "intersectionLambda": 0.08,
        "normalization": { "routeRawMin": 0.0, "routeRawMax": route_raw_max },
        "intersectionSearchRadiusDeg": 0.0003
    })
}

/// One crash hotspot cell at key "0,0" with no other risk factors.
pub fn hotspot_grid() -> Value {
    json!({
        "gridStep": 0.002,
        "cells": {
            "0,0": {
                "crashDensity": 1.0,
                "crimeDensity": 0.0,
                "roadClassPenalty": 0.0,
                "bikeLanePenalty": 0.0,
                "bikeCoverage": 1.0
            }
        }
    })
}

pub fn intersections() -> Value {
    json!([
        { "id": "i_1", "lng": 0.0010, "lat": 0.0010, "complexity": 0.45, "crashCluster": 0.1 },
        { "id": "i_2", "lng": 0.0500, "lat": 0.0500, "complexity": 0.9, "crashCluster": 0.8 }
    ])
}

pub fn write_artifacts(grid: &Value, intersections: &Value, config: &Value) -> TempArtifactDir {
    let dir = temp_artifact_dir();
    fs::write(dir.join("risk_grid.json"), grid.to_string()).expect("write grid");
    fs::write(dir.join("intersections.json"), intersections.to_string())
        .expect("write intersections");
    fs::write(dir.join("scoring_config.json"), config.to_string()).expect("write config");
    dir
}

pub fn hotspot_artifacts() -> TempArtifactDir {
    write_artifacts(&hotspot_grid(), &intersections(), &scoring_config(0.4))
}
