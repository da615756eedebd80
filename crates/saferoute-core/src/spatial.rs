//! Spatial math for sampling and proximity checks.
//!
//! Uses a fixed equirectangular approximation tuned for mid-latitude cities
//! rather than geodesic distance. Errors stay well under a meter at block scale.

/// Meters per degree of longitude at city latitude (~40.7°N).
pub const METERS_PER_DEG_LNG: f64 = 84_000.0;
/// Meters per degree of latitude.
pub const METERS_PER_DEG_LAT: f64 = 111_000.0;

/// Tolerance in squared degrees for radius checks.
pub const RADIUS_EPSILON_DEG2: f64 = 1e-12;

/// Approximate distance between two points in meters.
pub fn equirectangular_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dx = (lng2 - lng1) * METERS_PER_DEG_LNG;
    let dy = (lat2 - lat1) * METERS_PER_DEG_LAT;
    (dx * dx + dy * dy).sqrt()
}

/// Squared planar distance in degrees.
pub fn degree_distance_sq(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;
    dlat * dlat + dlng * dlng
}

/// Whether two points lie within `radius_deg` of each other, boundary inclusive.
pub fn within_radius_deg(lat1: f64, lng1: f64, lat2: f64, lng2: f64, radius_deg: f64) -> bool {
    degree_distance_sq(lat1, lng1, lat2, lng2) <= radius_deg * radius_deg + RADIUS_EPSILON_DEG2
}

/// Axis-aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Box around all points, expanded by `pad_deg` on every side.
    ///
    /// Returns `None` for an empty input.
    pub fn around<I>(points: I, pad_deg: f64) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lat, lng) = iter.next()?;
        let mut bbox = BoundingBox {
            min_lat: lat,
            max_lat: lat,
            min_lng: lng,
            max_lng: lng,
        };
        for (lat, lng) in iter {
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lat = bbox.max_lat.max(lat);
            bbox.min_lng = bbox.min_lng.min(lng);
            bbox.max_lng = bbox.max_lng.max(lng);
        }
        let pad = pad_deg.max(0.0) + RADIUS_EPSILON_DEG2.sqrt();
        bbox.min_lat -= pad;
        bbox.max_lat += pad;
        bbox.min_lng -= pad;
        bbox.max_lng += pad;
        Some(bbox)
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_uses_city_scale_factors() {
        let east = equirectangular_distance_m(40.7, -74.0, 40.7, -73.999);
        assert!((east - 84.0).abs() < 1e-6);
        let north = equirectangular_distance_m(40.7, -74.0, 40.701, -74.0);
        assert!((north - 111.0).abs() < 1e-6);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        assert!(within_radius_deg(0.0, 0.0, 0.0003, 0.0, 0.0003));
        assert!(within_radius_deg(40.7, -74.0, 40.7003, -74.0, 0.0003));
        assert!(!within_radius_deg(0.0, 0.0, 0.00031, 0.0, 0.0003));
    }

    #[test]
    fn bbox_expands_by_padding() {
        let bbox = BoundingBox::around([(40.0, -74.0), (40.01, -73.99)], 0.001).unwrap();
        assert!(bbox.contains(40.0105, -73.9895));
        assert!(!bbox.contains(40.0115, -73.99));
        assert!(BoundingBox::around(std::iter::empty(), 0.001).is_none());
    }
}
