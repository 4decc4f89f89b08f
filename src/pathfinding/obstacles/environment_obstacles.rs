//! Typed scenery descriptors and their collision shapes

use crate::pathfinding::obstacles::{CollisionShape, Obstacle};
use bevy::log::debug;
use bevy::math::DVec3;

/// Scenery placed on the planet surface, as a host world describes it
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleDescriptor {
    pub object_type: String,
    pub position: DVec3,
    pub scale: DVec3,
}

impl ObstacleDescriptor {
    pub fn new(object_type: impl Into<String>, position: DVec3, scale: DVec3) -> Self {
        Self {
            object_type: object_type.into(),
            position,
            scale,
        }
    }

    /// Descriptor with unit scale
    pub fn simple(object_type: impl Into<String>, position: DVec3) -> Self {
        Self::new(object_type, position, DVec3::ONE)
    }
}

/// Strongly-typed scenery kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ObstacleKind {
    Tree { trunk_radius_factor: f64 },
    Rock { collision_factor: f64 },
    Boulder { collision_factor: f64 },
    Grass,
    Custom {
        name: String,
        collision_shape: CollisionShape,
    },
}

impl ObstacleKind {
    pub fn name(&self) -> &str {
        match self {
            ObstacleKind::Tree { .. } => "tree",
            ObstacleKind::Rock { .. } => "rock",
            ObstacleKind::Boulder { .. } => "boulder",
            ObstacleKind::Grass => "grass",
            ObstacleKind::Custom { name, .. } => name,
        }
    }
}

/// A descriptor resolved to its kind
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentObstacle {
    pub kind: ObstacleKind,
    pub position: DVec3,
    pub scale: DVec3,
}

impl From<&ObstacleDescriptor> for EnvironmentObstacle {
    fn from(descriptor: &ObstacleDescriptor) -> Self {
        let kind = match descriptor.object_type.as_str() {
            "tree" => ObstacleKind::Tree {
                trunk_radius_factor: 0.3,
            },
            "rock" => ObstacleKind::Rock {
                collision_factor: 0.5,
            },
            "boulder" => ObstacleKind::Boulder {
                collision_factor: 0.5,
            },
            "grass" => ObstacleKind::Grass,
            name => {
                let scale = descriptor.scale;
                let collision_shape = if scale.x > 0.0 && scale.z > 0.0 {
                    CollisionShape::Box {
                        half_extents: scale * 0.5,
                    }
                } else {
                    CollisionShape::None
                };
                ObstacleKind::Custom {
                    name: name.to_string(),
                    collision_shape,
                }
            }
        };

        Self {
            kind,
            position: descriptor.position,
            scale: descriptor.scale,
        }
    }
}

impl EnvironmentObstacle {
    pub fn collision_shape(&self) -> CollisionShape {
        match &self.kind {
            ObstacleKind::Tree {
                trunk_radius_factor,
            } => CollisionShape::Sphere {
                radius: self.scale.x * trunk_radius_factor,
            },
            ObstacleKind::Rock { collision_factor }
            | ObstacleKind::Boulder { collision_factor } => CollisionShape::Sphere {
                radius: self.scale.x * collision_factor,
            },
            ObstacleKind::Grass => CollisionShape::None,
            ObstacleKind::Custom {
                collision_shape, ..
            } => collision_shape.clone(),
        }
    }

    pub fn blocks_pathfinding(&self) -> bool {
        match &self.kind {
            ObstacleKind::Grass => false,
            ObstacleKind::Custom {
                collision_shape, ..
            } => !matches!(collision_shape, CollisionShape::None),
            _ => true,
        }
    }

    /// Normalized obstacle, or `None` when this scenery never blocks
    pub fn to_obstacle(&self) -> Option<Obstacle> {
        if !self.blocks_pathfinding() {
            return None;
        }
        let obstacle = self.collision_shape().to_obstacle(self.position)?;
        debug!(
            "Pathfinding obstacle: {} at ({:.1}, {:.1}, {:.1}) radius={:.2}",
            self.kind.name(),
            obstacle.position.x,
            obstacle.position.y,
            obstacle.position.z,
            obstacle.collision_radius
        );
        Some(obstacle)
    }
}
