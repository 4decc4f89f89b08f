//! Source collision shapes and their bounding-sphere normalization

use crate::pathfinding::obstacles::Obstacle;
use bevy::math::DVec3;

/// Geometric shapes an obstacle can be described with
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    Sphere { radius: f64 },
    Box { half_extents: DVec3 },
    None,
}

impl CollisionShape {
    /// Radius of a sphere around the shape center that encloses the shape
    pub fn bounding_radius(&self) -> f64 {
        match self {
            CollisionShape::Sphere { radius } => radius.max(0.0),
            CollisionShape::Box { half_extents } => half_extents.abs().length(),
            CollisionShape::None => 0.0,
        }
    }

    /// Normalize into an obstacle centered at `center`; `None` for empty shapes
    pub fn to_obstacle(&self, center: DVec3) -> Option<Obstacle> {
        let radius = self.bounding_radius();
        if radius <= 0.0 {
            return None;
        }
        Obstacle::new(center, radius).ok()
    }
}
