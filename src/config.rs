use crate::errors::{NavError, NavResult};
use crate::resources::PathfindingConfig;
use std::fs;
use std::path::{Path, PathBuf};

pub mod range_types;

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("spherenav");
        fs::create_dir_all(&path).ok()?;
        path.push("config.toml");
        Some(path)
    })
}

/// Load the user config, falling back to defaults when missing or invalid
pub fn load_config() -> PathfindingConfig {
    if let Some(config_path) = get_config_path() {
        if let Ok(config) = load_config_from(&config_path) {
            return config;
        }
    }
    PathfindingConfig::default()
}

pub fn save_config(config: &PathfindingConfig) -> NavResult<()> {
    let config_path = get_config_path().ok_or(NavError::ConfigDirNotFound)?;
    save_config_to(config, config_path)
}

/// Load and validate a config file at an explicit path
pub fn load_config_from<P: AsRef<Path>>(path: P) -> NavResult<PathfindingConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(NavError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path)?;
    let config = toml::from_str::<PathfindingConfig>(&contents)?;
    config.validate_settings()?;
    Ok(config)
}

pub fn save_config_to<P: AsRef<Path>>(config: &PathfindingConfig, path: P) -> NavResult<()> {
    config.validate_settings()?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::range_types::SlopeAngle;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("spherenav-config-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let path = scratch_path("round_trip.toml");
        let config = PathfindingConfig {
            node_count: 512,
            max_slope_angle: SlopeAngle::new(30.0),
            ..Default::default()
        };

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.node_count, 512);
        assert_eq!(loaded.max_slope_angle.get(), 30.0);
        assert_eq!(loaded.segment_samples, config.segment_samples);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = scratch_path("partial.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "node_count = 800\n").unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.node_count, 800);
        assert_eq!(
            loaded.global_max_iterations,
            PathfindingConfig::default().global_max_iterations
        );

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let path = scratch_path("does_not_exist.toml");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, NavError::ConfigFileNotFound { .. }));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let path = scratch_path("invalid.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "segment_samples = 0\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, NavError::InvalidConfig { .. }));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_out_of_range_floats_are_clamped_on_load() {
        use crate::pathfinding::{
            Capabilities, LocalRefiner, NavigationGraph, ObstacleRegistry, ZoneClassifier,
        };
        use crate::terrain::Terrain;
        use crate::terrain_generation::PlanetTerrain;
        use bevy::math::DVec3;

        let path = scratch_path("out_of_range.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "local_grid_spacing = 0.0\n\
             avoidance_cost_multiplier = 0.1\n\
             connectivity_multiplier = 0.0\n",
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.local_grid_spacing.get(), 0.05);
        assert_eq!(loaded.avoidance_cost_multiplier.get(), 1.0);
        assert_eq!(loaded.connectivity_multiplier.get(), 1.05);

        let terrain = PlanetTerrain::flat(50.0, 49.0).unwrap();
        let obstacles = ObstacleRegistry::new();
        let graph = NavigationGraph::generate(&terrain, &obstacles, &loaded, 200).unwrap();
        assert!(graph.stats().edge_count > 0);

        let classifier = ZoneClassifier::new(&terrain, &obstacles, &loaded);
        let refiner = LocalRefiner::new(classifier, &loaded);
        let from = terrain.project(DVec3::new(1.0, 0.0, -0.02));
        let to = terrain.project(DVec3::new(1.0, 0.0, 0.02));
        assert!(refiner.refine(from, to, Capabilities::walker(), None).is_some());
    }
}
