//! Obstacle registration and normalization for planet pathfinding

use crate::errors::{NavError, NavResult};
use bevy::math::DVec3;

pub mod collision_shapes;
pub mod environment_obstacles;
pub mod obstacle_manager;

pub use collision_shapes::*;
pub use environment_obstacles::*;
pub use obstacle_manager::*;

/// A registered obstacle, normalized to a bounding sphere.
///
/// Every source shape is collapsed to this form at registration so the
/// search loops never branch on shape type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: DVec3,
    pub collision_radius: f64,
}

impl Obstacle {
    pub fn new(position: DVec3, collision_radius: f64) -> NavResult<Self> {
        if !position.is_finite() {
            return Err(NavError::InvalidObstacle {
                position,
                reason: "position must be finite".to_string(),
            });
        }
        if !collision_radius.is_finite() || collision_radius <= 0.0 {
            return Err(NavError::InvalidObstacle {
                position,
                reason: format!("radius must be positive, got {collision_radius}"),
            });
        }
        Ok(Self {
            position,
            collision_radius,
        })
    }

    /// True when `point` lies inside the collision radius
    pub fn contains_point(&self, point: DVec3) -> bool {
        self.position.distance_squared(point) < self.collision_radius * self.collision_radius
    }

    /// Distance from `point` to the obstacle surface (negative inside)
    pub fn surface_distance(&self, point: DVec3) -> f64 {
        self.position.distance(point) - self.collision_radius
    }
}
