//! Fixed-step risk grid and cell resolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ArtifactLoadError;
use crate::models::GridCell;

/// Integer grid coordinates `(floor(lat / step), floor(lng / step))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub lat_index: i64,
    pub lng_index: i64,
}

impl CellKey {
    pub fn new(lat_index: i64, lng_index: i64) -> Self {
        Self {
            lat_index,
            lng_index,
        }
    }

    /// Key of the cell containing a point. `None` for non-finite input.
    pub fn for_point(lat: f64, lng: f64, step: f64) -> Option<Self> {
        let lat_index = (lat / step).floor();
        let lng_index = (lng / step).floor();
        if !lat_index.is_finite() || !lng_index.is_finite() {
            return None;
        }
        Some(Self::new(lat_index as i64, lng_index as i64))
    }

    /// Parse an exported `"latIdx,lngIdx"` key. `_` is accepted as separator too.
    pub fn parse(key: &str) -> Option<Self> {
        let (lat, lng) = key.split_once(',').or_else(|| key.split_once('_'))?;
        Some(Self::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?))
    }
}

/// On-disk layout of `risk_grid.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskGridFile {
    pub grid_step: f64,
    pub cells: HashMap<String, GridCell>,
}

/// Risk grid keyed by composite integer cell keys.
#[derive(Debug, Clone)]
pub struct RiskGrid {
    step: f64,
    cells: HashMap<CellKey, GridCell>,
}

impl RiskGrid {
    pub fn new(step: f64, cells: HashMap<CellKey, GridCell>) -> Self {
        Self { step, cells }
    }

    /// Build from the exported string-keyed layout, rejecting bad or colliding keys.
    pub fn from_file(file: RiskGridFile) -> Result<Self, ArtifactLoadError> {
        if !file.grid_step.is_finite() || file.grid_step <= 0.0 {
            return Err(ArtifactLoadError::InvalidConfig(format!(
                "risk grid step must be positive, got {}",
                file.grid_step
            )));
        }
        let mut cells = HashMap::with_capacity(file.cells.len());
        for (raw_key, cell) in file.cells {
            let key = CellKey::parse(&raw_key)
                .ok_or_else(|| ArtifactLoadError::InvalidCellKey { key: raw_key.clone() })?;
            if cells.insert(key, cell).is_some() {
                return Err(ArtifactLoadError::DuplicateCell { key: raw_key });
            }
        }
        Ok(Self::new(file.grid_step, cells))
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Precomputed cell at a point, if the grid covers it.
    pub fn lookup(&self, lat: f64, lng: f64) -> Option<&GridCell> {
        let key = CellKey::for_point(lat, lng, self.step)?;
        self.cells.get(&key)
    }

    /// Cell at a point, falling back to [`GridCell::OUT_OF_COVERAGE`].
    pub fn resolve(&self, lat: f64, lng: f64) -> GridCell {
        self.lookup(lat, lng)
            .copied()
            .unwrap_or(GridCell::OUT_OF_COVERAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(crash: f64) -> GridCell {
        GridCell {
            crash_density: crash,
            crime_density: 0.1,
            road_class_penalty: 0.25,
            bike_lane_penalty: 0.3,
            bike_coverage: 0.6,
        }
    }

    fn grid() -> RiskGrid {
        let mut cells = HashMap::new();
        cells.insert(CellKey::new(20365, -36987), cell(0.7));
        RiskGrid::new(0.002, cells)
    }

    #[test]
    fn key_uses_floor_for_negative_coordinates() {
        let key = CellKey::for_point(40.7301, -73.9731, 0.002).unwrap();
        assert_eq!(key, CellKey::new(20365, -36987));
        assert!(CellKey::for_point(f64::NAN, 0.0, 0.002).is_none());
    }

    #[test]
    fn parses_exported_keys() {
        assert_eq!(CellKey::parse("20365,-36987"), Some(CellKey::new(20365, -36987)));
        assert_eq!(CellKey::parse("1_2"), Some(CellKey::new(1, 2)));
        assert_eq!(CellKey::parse("1;2"), None);
        assert_eq!(CellKey::parse("a,2"), None);
    }

    #[test]
    fn resolve_is_repeatable() {
        let grid = grid();
        let first = grid.resolve(40.7301, -73.9731);
        let second = grid.resolve(40.7301, -73.9731);
        assert_eq!(first, second);
        assert_eq!(first.crash_density, 0.7);
    }

    #[test]
    fn unmapped_point_gets_pessimistic_default() {
        let grid = grid();
        let cell = grid.resolve(0.0, 0.0);
        assert_eq!(cell, GridCell::OUT_OF_COVERAGE);
        assert_eq!(cell.road_class_penalty, 0.5);
        assert_eq!(cell.bike_lane_penalty, 0.8);
        assert!(grid.lookup(0.0, 0.0).is_none());
    }

    #[test]
    fn colliding_keys_are_rejected() {
        let mut cells = HashMap::new();
        cells.insert("1,2".to_string(), cell(0.1));
        cells.insert("01,2".to_string(), cell(0.2));
        let result = RiskGrid::from_file(RiskGridFile {
            grid_step: 0.002,
            cells,
        });
        assert!(matches!(result, Err(ArtifactLoadError::DuplicateCell { .. })));
    }

    #[test]
    fn malformed_key_is_rejected() {
        let mut cells = HashMap::new();
        cells.insert("nope".to_string(), cell(0.1));
        let result = RiskGrid::from_file(RiskGridFile {
            grid_step: 0.002,
            cells,
        });
        assert!(matches!(result, Err(ArtifactLoadError::InvalidCellKey { .. })));
    }
}
