//! Central registry of obstacles consulted by graph building and zone checks

use crate::pathfinding::obstacles::*;
use crate::terrain::coordinates::distance_to_segment;
use bevy::math::DVec3;
use bevy::prelude::Resource;

/// Enumerable list of normalized obstacles
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
}

impl ObstacleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_obstacles(obstacles: impl IntoIterator<Item = Obstacle>) -> Self {
        Self {
            obstacles: obstacles.into_iter().collect(),
        }
    }

    pub fn register_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Register scenery; returns false when the descriptor never blocks
    pub fn register(&mut self, descriptor: &ObstacleDescriptor) -> bool {
        match EnvironmentObstacle::from(descriptor).to_obstacle() {
            Some(obstacle) => {
                self.obstacles.push(obstacle);
                true
            }
            None => false,
        }
    }

    /// Register several descriptors, returning how many were kept
    pub fn register_all(&mut self, descriptors: &[ObstacleDescriptor]) -> usize {
        descriptors
            .iter()
            .filter(|descriptor| self.register(descriptor))
            .count()
    }

    /// Remove obstacles whose center lies within `radius` of `center`
    pub fn remove_in_radius(&mut self, center: DVec3, radius: f64) -> usize {
        let before = self.obstacles.len();
        self.obstacles
            .retain(|obstacle| obstacle.position.distance(center) > radius);
        before - self.obstacles.len()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// True if any obstacle contains `position`
    pub fn is_position_blocked(&self, position: DVec3) -> bool {
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.contains_point(position))
    }

    /// Obstacles whose surface is within `margin` of `position`
    pub fn obstacles_near(&self, position: DVec3, margin: f64) -> impl Iterator<Item = &Obstacle> {
        self.obstacles
            .iter()
            .filter(move |obstacle| obstacle.surface_distance(position) < margin)
    }

    /// Largest radius among obstacles within `margin` of the segment `from..to`
    pub fn largest_radius_near_segment(&self, from: DVec3, to: DVec3, margin: f64) -> Option<f64> {
        self.obstacles
            .iter()
            .filter(|obstacle| {
                distance_to_segment(obstacle.position, from, to)
                    < obstacle.collision_radius + margin
            })
            .map(|obstacle| obstacle.collision_radius)
            .reduce(f64::max)
    }
}
