//! Sampled obstruction checks along straight segments

use crate::pathfinding::zones::{Capabilities, ZoneClassifier, ZoneType};
use crate::resources::PathfindingConfig;
use bevy::math::DVec3;

/// Samples segments at a fixed count, endpoints included.
///
/// Obstacles narrower than the sample spacing can slip between samples on
/// long segments.
#[derive(Clone, Copy)]
pub struct SegmentObstacleDetector<'a> {
    classifier: ZoneClassifier<'a>,
    samples: u32,
}

impl<'a> SegmentObstacleDetector<'a> {
    pub fn new(classifier: ZoneClassifier<'a>, config: &PathfindingConfig) -> Self {
        Self::with_samples(classifier, config.segment_samples)
    }

    pub fn with_samples(classifier: ZoneClassifier<'a>, samples: u32) -> Self {
        Self {
            classifier,
            samples: samples.max(2),
        }
    }

    /// Terrain-projected sample points from `from` to `to`
    pub fn sample_points(&self, from: DVec3, to: DVec3) -> impl Iterator<Item = DVec3> + '_ {
        let terrain = self.classifier.terrain();
        let last = (self.samples - 1) as f64;
        (0..self.samples).map(move |i| terrain.project(from.lerp(to, i as f64 / last)))
    }

    /// True when any sample is not Free
    pub fn has_obstacle(&self, from: DVec3, to: DVec3, caps: Capabilities) -> bool {
        self.sample_points(from, to)
            .any(|sample| self.classifier.classify(sample, caps) != ZoneType::Free)
    }

    pub fn crosses_forbidden(&self, from: DVec3, to: DVec3, caps: Capabilities) -> bool {
        self.sample_points(from, to)
            .any(|sample| self.classifier.classify(sample, caps) == ZoneType::Forbidden)
    }

    /// True when any consecutive pair of `path` crosses a Forbidden sample
    pub fn path_crosses_forbidden(&self, path: &[DVec3], caps: Capabilities) -> bool {
        path.windows(2)
            .any(|pair| self.crosses_forbidden(pair[0], pair[1], caps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::obstacles::{Obstacle, ObstacleRegistry};
    use crate::terrain::Terrain;
    use crate::terrain_generation::PlanetTerrain;

    #[test]
    fn test_clear_segment() {
        let terrain = PlanetTerrain::flat(50.0, 10.0).unwrap();
        let obstacles = ObstacleRegistry::new();
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let detector = SegmentObstacleDetector::new(classifier, &config);

        let from = terrain.project(DVec3::new(0.0, 0.0, 1.0));
        let to = terrain.project(DVec3::new(0.1, 0.0, 1.0));
        assert!(!detector.has_obstacle(from, to, Capabilities::walker()));
        assert!(!detector.crosses_forbidden(from, to, Capabilities::walker()));
    }

    #[test]
    fn test_rock_on_segment_is_detected() {
        let terrain = PlanetTerrain::flat(50.0, 10.0).unwrap();
        let from = terrain.project(DVec3::new(-0.1, 0.0, 1.0));
        let to = terrain.project(DVec3::new(0.1, 0.0, 1.0));
        let rock = Obstacle::new(terrain.project(DVec3::Z), 1.0).unwrap();
        let obstacles = ObstacleRegistry::from_obstacles([rock]);
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let detector = SegmentObstacleDetector::new(classifier, &config);

        assert!(detector.has_obstacle(from, to, Capabilities::walker()));
        assert!(detector.crosses_forbidden(from, to, Capabilities::walker()));
        assert!(detector.path_crosses_forbidden(&[from, to], Capabilities::climber()));
    }

    #[test]
    fn test_rock_margin_blocks_but_does_not_forbid() {
        let terrain = PlanetTerrain::flat(50.0, 10.0).unwrap();
        let from = terrain.project(DVec3::new(-0.1, 0.0, 1.0));
        let to = terrain.project(DVec3::new(0.1, 0.0, 1.0));
        // 2 units off the segment with radius 1: only the avoidance margin touches it
        let rock = Obstacle::new(terrain.project(DVec3::new(0.0, 0.04, 1.0)), 1.0).unwrap();
        let obstacles = ObstacleRegistry::from_obstacles([rock]);
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let detector = SegmentObstacleDetector::new(classifier, &config);

        assert!(detector.has_obstacle(from, to, Capabilities::walker()));
        assert!(!detector.crosses_forbidden(from, to, Capabilities::walker()));
        assert!(!detector.has_obstacle(from, to, Capabilities::climber()));
    }

    #[test]
    fn test_sample_points_include_endpoints() {
        let terrain = PlanetTerrain::flat(50.0, 10.0).unwrap();
        let obstacles = ObstacleRegistry::new();
        let config = PathfindingConfig::default();
        let detector = SegmentObstacleDetector::with_samples(
            ZoneClassifier::new(&terrain, &obstacles, &config),
            5,
        );
        let from = terrain.project(DVec3::X);
        let to = terrain.project(DVec3::new(1.0, 0.2, 0.0));
        let samples: Vec<DVec3> = detector.sample_points(from, to).collect();
        assert_eq!(samples.len(), 5);
        assert!(samples[0].distance(from) < 1e-9);
        assert!(samples[4].distance(to) < 1e-9);
        for sample in samples {
            assert!((sample.length() - 50.0).abs() < 1e-9);
        }
    }
}
