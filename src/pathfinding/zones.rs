//! Capability-aware zone classification of surface positions

use crate::pathfinding::obstacles::ObstacleRegistry;
use crate::resources::PathfindingConfig;
use crate::terrain::Terrain;
use crate::terrain::constants::{SHORE_PROBE_DIRECTIONS, SHORE_PROBE_STEPS};
use crate::terrain::coordinates::tangent_basis;
use bevy::math::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Movement abilities of the agent a path is planned for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_swim: bool,
    pub can_climb: bool,
    pub can_fly: bool,
}

impl Capabilities {
    pub fn walker() -> Self {
        Self::default()
    }

    pub fn swimmer() -> Self {
        Self {
            can_swim: true,
            ..Self::default()
        }
    }

    pub fn climber() -> Self {
        Self {
            can_climb: true,
            ..Self::default()
        }
    }

    /// Rock margins and steep slopes are irrelevant to this agent
    pub fn ignores_relief(&self) -> bool {
        self.can_climb || self.can_fly
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneType {
    /// Never traversed
    Forbidden,
    /// Traversable at extra cost
    Avoidance,
    Free,
}

/// Classifies positions against the terrain and the obstacle registry
#[derive(Clone, Copy)]
pub struct ZoneClassifier<'a> {
    terrain: &'a dyn Terrain,
    obstacles: &'a ObstacleRegistry,
    underwater_margin: f64,
    rock_avoidance_margin: f64,
    shore_avoidance_margin: f64,
}

impl<'a> ZoneClassifier<'a> {
    pub fn new(
        terrain: &'a dyn Terrain,
        obstacles: &'a ObstacleRegistry,
        config: &PathfindingConfig,
    ) -> Self {
        Self {
            terrain,
            obstacles,
            underwater_margin: config.underwater_margin.get(),
            rock_avoidance_margin: config.rock_avoidance_margin.get(),
            shore_avoidance_margin: config.shore_avoidance_margin.get(),
        }
    }

    pub fn terrain(&self) -> &'a dyn Terrain {
        self.terrain
    }

    pub fn obstacles(&self) -> &'a ObstacleRegistry {
        self.obstacles
    }

    pub fn classify(&self, position: DVec3, caps: Capabilities) -> ZoneType {
        if self.obstacles.is_position_blocked(position) {
            return ZoneType::Forbidden;
        }
        if !caps.can_swim && self.is_submerged(position) {
            return ZoneType::Forbidden;
        }

        if !caps.ignores_relief()
            && self
                .obstacles
                .obstacles_near(position, self.rock_avoidance_margin)
                .next()
                .is_some()
        {
            return ZoneType::Avoidance;
        }
        if !caps.can_swim && self.is_near_shore(position) {
            return ZoneType::Avoidance;
        }

        ZoneType::Free
    }

    pub fn is_valid_destination(&self, position: DVec3, caps: Capabilities) -> bool {
        self.classify(position, caps) != ZoneType::Forbidden
    }

    pub fn is_submerged(&self, position: DVec3) -> bool {
        self.terrain.is_submerged(position, self.underwater_margin)
    }

    /// True when walking outward from dry `position` reaches water within the shore margin
    pub fn is_near_shore(&self, position: DVec3) -> bool {
        let margin = self.shore_avoidance_margin;
        if margin <= 0.0 || self.is_submerged(position) {
            return false;
        }

        let (east, north) = tangent_basis(position);
        (0..SHORE_PROBE_DIRECTIONS).any(|direction_index| {
            let angle = TAU * direction_index as f64 / SHORE_PROBE_DIRECTIONS as f64;
            let heading = east * angle.cos() + north * angle.sin();

            let mut previous_dry = true;
            for step in 1..=SHORE_PROBE_STEPS {
                let distance = margin * step as f64 / SHORE_PROBE_STEPS as f64;
                let sample = self.terrain.project(position + heading * distance);
                let submerged = self.is_submerged(sample);
                if previous_dry && submerged {
                    return true;
                }
                previous_dry = !submerged;
            }
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::obstacles::Obstacle;
    use crate::terrain::coordinates::fibonacci_sphere;
    use crate::terrain_generation::{PlanetTerrain, SurfaceFeature};

    fn lake_planet() -> PlanetTerrain {
        // Basin at +X: water covers roughly 0.12 rad around the center
        PlanetTerrain::flat(50.0, 49.0)
            .unwrap()
            .with_feature(SurfaceFeature::basin(DVec3::X, 0.2, 3.0))
    }

    fn at_angle_from_x(terrain: &PlanetTerrain, angle: f64) -> DVec3 {
        terrain.project(DVec3::new(angle.cos(), angle.sin(), 0.0))
    }

    #[test]
    fn test_rock_core_is_forbidden_for_everyone() {
        let terrain = PlanetTerrain::flat(50.0, 10.0).unwrap();
        let rock_position = terrain.project(DVec3::Z);
        let rock = Obstacle::new(rock_position, 2.0).unwrap();
        let obstacles = ObstacleRegistry::from_obstacles([rock]);
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &PathfindingConfig::default());

        let all = Capabilities {
            can_swim: true,
            can_climb: true,
            can_fly: true,
        };
        assert_eq!(classifier.classify(rock_position, all), ZoneType::Forbidden);
        assert!(!classifier.is_valid_destination(rock_position, Capabilities::walker()));
    }

    #[test]
    fn test_rock_margin_is_avoidance_unless_climbing() {
        let terrain = PlanetTerrain::flat(50.0, 10.0).unwrap();
        let rock_position = terrain.project(DVec3::Z);
        let rock = Obstacle::new(rock_position, 2.0).unwrap();
        let obstacles = ObstacleRegistry::from_obstacles([rock]);
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &PathfindingConfig::default());

        // 3 units from the rock center, 1 unit outside its radius
        let nearby = terrain.project(rock_position + DVec3::X * 3.0);
        assert_eq!(classifier.classify(nearby, Capabilities::walker()), ZoneType::Avoidance);
        assert_eq!(classifier.classify(nearby, Capabilities::climber()), ZoneType::Free);
        let flyer = Capabilities {
            can_fly: true,
            ..Default::default()
        };
        assert_eq!(classifier.classify(nearby, flyer), ZoneType::Free);
        assert!(classifier.is_valid_destination(nearby, Capabilities::walker()));

        let far = terrain.project(-DVec3::Z);
        assert_eq!(classifier.classify(far, Capabilities::walker()), ZoneType::Free);
    }

    #[test]
    fn test_water_is_forbidden_without_swimming() {
        let terrain = lake_planet();
        let obstacles = ObstacleRegistry::new();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &PathfindingConfig::default());

        let lake_center = terrain.project(DVec3::X);
        assert_eq!(classifier.classify(lake_center, Capabilities::walker()), ZoneType::Forbidden);
        assert_eq!(classifier.classify(lake_center, Capabilities::swimmer()), ZoneType::Free);
    }

    #[test]
    fn test_shoreline_is_avoidance() {
        let terrain = lake_planet();
        let obstacles = ObstacleRegistry::new();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &PathfindingConfig::default());

        let shore = at_angle_from_x(&terrain, 0.135);
        assert!(!classifier.is_submerged(shore));
        assert!(classifier.is_near_shore(shore));
        assert_eq!(classifier.classify(shore, Capabilities::walker()), ZoneType::Avoidance);
        assert_eq!(classifier.classify(shore, Capabilities::swimmer()), ZoneType::Free);

        let inland = at_angle_from_x(&terrain, 0.4);
        assert_eq!(classifier.classify(inland, Capabilities::walker()), ZoneType::Free);
    }

    #[test]
    fn test_capabilities_never_shrink_valid_positions() {
        let terrain = lake_planet();
        let rock = Obstacle::new(at_angle_from_x(&terrain, 0.3), 1.0).unwrap();
        let obstacles = ObstacleRegistry::from_obstacles([rock]);
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &PathfindingConfig::default());

        for direction in fibonacci_sphere(3000) {
            let position = terrain.project(direction);
            let base = classifier.is_valid_destination(position, Capabilities::walker());
            for caps in [Capabilities::swimmer(), Capabilities::climber()] {
                if base {
                    assert!(classifier.is_valid_destination(position, caps));
                }
            }
        }
    }
}
