//! Proximity search for complex intersections along a route.
//!
//! A single bounding box around the whole route prunes the intersection set,
//! then each survivor is checked against the route samples with an early exit.
//! Fine for city-scale tables; a spatial index would be needed for
//! much larger intersection sets.

use std::collections::HashSet;

use crate::models::IntersectionPoint;
use crate::sampling::SamplePoint;
use crate::spatial::{within_radius_deg, BoundingBox};

/// Intersections within `radius_deg` of any sample, de-duplicated by id.
///
/// Results keep the order of `intersections`.
pub fn find_nearby_intersections<'a>(
    samples: &[SamplePoint],
    intersections: &'a [IntersectionPoint],
    radius_deg: f64,
) -> Vec<&'a IntersectionPoint> {
    let Some(bbox) = BoundingBox::around(samples.iter().map(|s| (s.lat, s.lng)), radius_deg)
    else {
        return Vec::new();
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut nearby = Vec::new();
    for intersection in intersections {
        if !bbox.contains(intersection.lat, intersection.lng) {
            continue;
        }
        if seen.contains(intersection.id.as_str()) {
            continue;
        }
        let hit = samples.iter().any(|sample| {
            within_radius_deg(
                sample.lat,
                sample.lng,
                intersection.lat,
                intersection.lng,
                radius_deg,
            )
        });
        if hit {
            seen.insert(intersection.id.as_str());
            nearby.push(intersection);
        }
    }
    nearby
}
