//! Spherical coordinate helpers shared by graph construction and local search

use bevy::math::DVec3;
use std::f64::consts::PI;

/// Golden angle in radians, used for the Fibonacci sphere lattice
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Latitude/longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Convert to a unit direction (+Y is north)
    pub fn to_direction(self) -> DVec3 {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        DVec3::new(lat.cos() * lon.cos(), lat.sin(), lat.cos() * lon.sin())
    }

    pub fn from_direction(direction: DVec3) -> Self {
        let dir = direction.normalize_or_zero();
        Self {
            lat: dir.y.clamp(-1.0, 1.0).asin().to_degrees(),
            lon: dir.z.atan2(dir.x).to_degrees(),
        }
    }
}

/// Evenly distribute `count` unit directions over the sphere
pub fn fibonacci_sphere(count: usize) -> Vec<DVec3> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![DVec3::Y];
    }

    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
            let ring_radius = (1.0 - y * y).max(0.0).sqrt();
            let theta = GOLDEN_ANGLE * i as f64;
            DVec3::new(theta.cos() * ring_radius, y, theta.sin() * ring_radius)
        })
        .collect()
}

/// Mean angular spacing between `count` evenly distributed points
pub fn mean_angular_spacing(count: usize) -> f64 {
    (4.0 * PI / count.max(1) as f64).sqrt()
}

/// Angle in radians between two vectors, stable for tiny and near-antipodal angles
pub fn angle_between(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Great-circle arc length between two points, at the mean of their radii
pub fn geodesic_distance(a: DVec3, b: DVec3) -> f64 {
    let mean_radius = (a.length() + b.length()) * 0.5;
    angle_between(a, b) * mean_radius
}

/// Orthonormal tangent basis at `up`; the pair is stable for a given input
pub fn tangent_basis(up: DVec3) -> (DVec3, DVec3) {
    let up = up.normalize_or_zero();
    let helper = if up.y.abs() < 0.9 { DVec3::Y } else { DVec3::X };
    let east = helper.cross(up).normalize_or_zero();
    let north = up.cross(east);
    (east, north)
}

/// Shortest distance from `point` to the segment `a..b`
pub fn distance_to_segment(point: DVec3, a: DVec3, b: DVec3) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
