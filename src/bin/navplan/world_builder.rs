use spherenav::errors::{NavError, NavResult};
use spherenav::terrain::Terrain;
use spherenav::terrain_generation::{
    PlanetTerrain, SurfaceFeature, TerrainAlgorithm, get_terrain_preset,
};

pub struct WorldBuilder {
    terrain_type: String,
    radius: f64,
    seed: Option<u32>,
    water_level: Option<f64>,
    amplitude: Option<f64>,
    frequency: Option<f64>,
    octaves: Option<u32>,
    features: Vec<SurfaceFeature>,
}

impl WorldBuilder {
    pub fn new(terrain_type: String) -> Self {
        Self {
            terrain_type,
            radius: 100.0,
            seed: None,
            water_level: None,
            amplitude: None,
            frequency: None,
            octaves: None,
            features: Vec::new(),
        }
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn seed(mut self, seed: Option<u32>) -> Self {
        self.seed = seed;
        self
    }

    pub fn water_level(mut self, water_level: Option<f64>) -> Self {
        self.water_level = water_level;
        self
    }

    pub fn amplitude(mut self, amplitude: Option<f64>) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn frequency(mut self, frequency: Option<f64>) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn octaves(mut self, octaves: Option<u32>) -> Self {
        self.octaves = octaves;
        self
    }

    pub fn feature(mut self, feature: Option<SurfaceFeature>) -> Self {
        self.features.extend(feature);
        self
    }

    fn has_manual_parameters(&self) -> bool {
        self.amplitude.is_some() || self.frequency.is_some() || self.octaves.is_some()
    }

    pub fn build(self) -> NavResult<PlanetTerrain> {
        let seed = self.seed.unwrap_or_else(rand::random);

        let preset = get_terrain_preset(&self.terrain_type, self.radius, Some(seed));
        let (algorithm, preset_water) = match preset {
            Some(preset) => {
                let algorithm = if self.has_manual_parameters() {
                    self.override_preset_params(preset.algorithm.clone())
                } else {
                    preset.algorithm.clone()
                };
                (algorithm, preset.water_level())
            }
            None => (self.custom_algorithm()?, self.radius - self.radius * 0.02),
        };

        let water_level = self.water_level.unwrap_or(preset_water);
        let mut terrain = PlanetTerrain::new(self.radius, water_level, seed, algorithm)?;
        for feature in self.features {
            terrain.add_feature(feature);
        }
        Ok(terrain)
    }

    fn custom_algorithm(&self) -> NavResult<TerrainAlgorithm> {
        let amplitude = self.amplitude.unwrap_or(self.radius * 0.02);
        let frequency = self.frequency.unwrap_or(3.0 / self.radius);
        let octaves = self.octaves.unwrap_or(4);
        match self.terrain_type.as_str() {
            "perlin" => Ok(TerrainAlgorithm::Perlin {
                amplitude,
                frequency,
                octaves,
            }),
            "ridged" => Ok(TerrainAlgorithm::Ridged {
                amplitude,
                frequency,
                octaves,
            }),
            _ => Err(NavError::InvalidArgument {
                reason: format!(
                    "Unknown terrain type: '{}'. Available presets: flat, hills, archipelago, mountains, valleys. Custom algorithms: perlin, ridged",
                    self.terrain_type
                ),
            }),
        }
    }

    fn override_preset_params(&self, algorithm: TerrainAlgorithm) -> TerrainAlgorithm {
        match algorithm {
            TerrainAlgorithm::Flat => {
                println!(
                    "Warning: Manual terrain parameters (amplitude, frequency, octaves) are ignored for 'flat' terrain type"
                );
                TerrainAlgorithm::Flat
            }
            TerrainAlgorithm::Perlin {
                amplitude,
                frequency,
                octaves,
            } => TerrainAlgorithm::Perlin {
                amplitude: self.amplitude.unwrap_or(amplitude),
                frequency: self.frequency.unwrap_or(frequency),
                octaves: self.octaves.unwrap_or(octaves),
            },
            TerrainAlgorithm::Ridged {
                amplitude,
                frequency,
                octaves,
            } => TerrainAlgorithm::Ridged {
                amplitude: self.amplitude.unwrap_or(amplitude),
                frequency: self.frequency.unwrap_or(frequency),
                octaves: self.octaves.unwrap_or(octaves),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::DVec3;

    #[test]
    fn test_world_builder_preset() {
        let terrain = WorldBuilder::new("hills".to_string())
            .seed(Some(12345))
            .radius(80.0)
            .build()
            .unwrap();
        assert_eq!(terrain.seed, 12345);
        assert_eq!(terrain.base_radius(), 80.0);
        assert!(terrain.water_level() < 80.0);
    }

    #[test]
    fn test_world_builder_with_manual_params() {
        let terrain = WorldBuilder::new("hills".to_string())
            .seed(Some(12345))
            .amplitude(Some(4.0))
            .octaves(Some(6))
            .build()
            .unwrap();

        match terrain.algorithm {
            TerrainAlgorithm::Perlin {
                amplitude, octaves, ..
            } => {
                assert_eq!(amplitude, 4.0);
                assert_eq!(octaves, 6);
            }
            _ => panic!("Expected Perlin algorithm"),
        }
    }

    #[test]
    fn test_world_builder_custom_algorithm_and_lake() {
        let lake = SurfaceFeature::basin(DVec3::X, 0.2, 5.0);
        let terrain = WorldBuilder::new("ridged".to_string())
            .seed(Some(7))
            .water_level(Some(99.0))
            .feature(Some(lake))
            .build()
            .unwrap();

        assert!(matches!(terrain.algorithm, TerrainAlgorithm::Ridged { .. }));
        assert_eq!(terrain.water_level(), 99.0);
        assert_eq!(terrain.features(), &[lake]);
    }

    #[test]
    fn test_world_builder_unknown_type() {
        assert!(WorldBuilder::new("unknown".to_string()).build().is_err());
    }
}
