//! Polyline sampling at an approximately fixed real-world spacing.

use crate::models::LngLat;
use crate::spatial::equirectangular_distance_m;

pub const DEFAULT_SAMPLE_SPACING_M: f64 = 25.0;

/// A sampled polyline vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub lat: f64,
    pub lng: f64,
    pub vertex_index: usize,
}

impl SamplePoint {
    fn from_vertex(coordinates: &[LngLat], vertex_index: usize) -> Self {
        let vertex = coordinates[vertex_index];
        Self {
            lat: vertex.lat(),
            lng: vertex.lng(),
            vertex_index,
        }
    }
}

/// Pick polyline vertices roughly `spacing_m` apart along the path.
///
/// The first and last vertices are always kept. A vertex is emitted once the
/// distance walked since the previous sample reaches the spacing. Vertices are
/// never interpolated, so every sample maps back to an original vertex.
pub fn sample_polyline(coordinates: &[LngLat], spacing_m: f64) -> Vec<SamplePoint> {
    if coordinates.is_empty() {
        return Vec::new();
    }
    let spacing = if spacing_m.is_finite() {
        spacing_m.max(0.0)
    } else {
        DEFAULT_SAMPLE_SPACING_M
    };

    let mut samples = vec![SamplePoint::from_vertex(coordinates, 0)];
    let mut walked_m = 0.0;
    for i in 1..coordinates.len() {
        let (prev, curr) = (coordinates[i - 1], coordinates[i]);
        walked_m += equirectangular_distance_m(prev.lat(), prev.lng(), curr.lat(), curr.lng());
        if walked_m >= spacing {
            samples.push(SamplePoint::from_vertex(coordinates, i));
            walked_m = 0.0;
        }
    }

    let last = coordinates.len() - 1;
    if samples.last().map(|s| s.vertex_index) != Some(last) {
        samples.push(SamplePoint::from_vertex(coordinates, last));
    }
    samples
}
