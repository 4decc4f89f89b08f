use crate::errors::{NavError, NavResult};
use crate::pathfinding::obstacles::Obstacle;
use crate::terrain::Terrain;
use crate::terrain::coordinates::angle_between;
use bevy::math::DVec3;
use noise::{MultiFractal, NoiseFn, Perlin, RidgedMulti};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::f64::consts::{PI, TAU};

/// Terrain generation algorithms
#[derive(Debug, Clone)]
pub enum TerrainAlgorithm {
    Flat,
    Perlin {
        amplitude: f64,
        frequency: f64,
        octaves: u32,
    },
    Ridged {
        amplitude: f64,
        frequency: f64,
        octaves: u32,
    },
}

/// A smooth radial bump or dip centered on a surface direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFeature {
    /// Unit direction of the feature center
    pub center: DVec3,
    /// Feature radius as an angle in radians
    pub angular_radius: f64,
    /// Peak height offset; negative carves a basin
    pub height: f64,
}

impl SurfaceFeature {
    pub fn basin(center: DVec3, angular_radius: f64, depth: f64) -> Self {
        Self {
            center: center.normalize_or_zero(),
            angular_radius,
            height: -depth.abs(),
        }
    }

    pub fn mound(center: DVec3, angular_radius: f64, height: f64) -> Self {
        Self {
            center: center.normalize_or_zero(),
            angular_radius,
            height: height.abs(),
        }
    }

    /// Cosine falloff from the full offset at the center to zero at the rim
    pub fn offset_at(&self, direction: DVec3) -> f64 {
        if self.angular_radius <= 0.0 {
            return 0.0;
        }
        let angle = angle_between(direction, self.center);
        if angle >= self.angular_radius {
            return 0.0;
        }
        self.height * 0.5 * (1.0 + (PI * angle / self.angular_radius).cos())
    }
}

#[derive(Clone)]
enum NoiseSource {
    None,
    Perlin {
        perlin: Perlin,
        amplitude: f64,
        frequency: f64,
        octaves: u32,
    },
    Ridged {
        ridged: RidgedMulti<Perlin>,
        amplitude: f64,
    },
}

/// Procedural planet surface: a base sphere plus noise and analytic features
#[derive(Clone)]
pub struct PlanetTerrain {
    pub seed: u32,
    pub algorithm: TerrainAlgorithm,
    base_radius: f64,
    water_level: f64,
    features: Vec<SurfaceFeature>,
    noise: NoiseSource,
}

impl PlanetTerrain {
    /// Create a planet terrain with validation
    pub fn new(
        base_radius: f64,
        water_level: f64,
        seed: u32,
        algorithm: TerrainAlgorithm,
    ) -> NavResult<Self> {
        if !base_radius.is_finite() || base_radius <= 0.0 {
            return Err(NavError::InvalidTerrain {
                reason: format!("Base radius must be positive, got {base_radius}"),
            });
        }
        if !water_level.is_finite() || water_level < 0.0 {
            return Err(NavError::InvalidTerrain {
                reason: format!("Water level must be a non-negative radius, got {water_level}"),
            });
        }

        let noise = match &algorithm {
            TerrainAlgorithm::Flat => NoiseSource::None,
            TerrainAlgorithm::Perlin {
                amplitude,
                frequency,
                octaves,
            } => NoiseSource::Perlin {
                perlin: Perlin::new(seed),
                amplitude: *amplitude,
                frequency: *frequency,
                octaves: (*octaves).max(1),
            },
            TerrainAlgorithm::Ridged {
                amplitude,
                frequency,
                octaves,
            } => NoiseSource::Ridged {
                ridged: RidgedMulti::<Perlin>::new(seed)
                    .set_octaves((*octaves).max(1) as usize)
                    .set_frequency(*frequency),
                amplitude: *amplitude,
            },
        };

        Ok(Self {
            seed,
            algorithm,
            base_radius,
            water_level,
            features: Vec::new(),
            noise,
        })
    }

    /// Create a perfectly round planet for testing
    pub fn flat(base_radius: f64, water_level: f64) -> NavResult<Self> {
        Self::new(base_radius, water_level, 0, TerrainAlgorithm::Flat)
    }

    pub fn with_feature(mut self, feature: SurfaceFeature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn add_feature(&mut self, feature: SurfaceFeature) {
        self.features.push(feature);
    }

    pub fn features(&self) -> &[SurfaceFeature] {
        &self.features
    }

    fn noise_offset(&self, direction: DVec3) -> f64 {
        match &self.noise {
            NoiseSource::None => 0.0,
            NoiseSource::Perlin {
                perlin,
                amplitude,
                frequency,
                octaves,
            } => {
                let point = direction * self.base_radius * *frequency;

                let mut noise_value = 0.0;
                let mut current_amplitude = *amplitude;
                let mut current_frequency = 1.0;

                for _ in 0..*octaves {
                    let sample = point * current_frequency;
                    noise_value += perlin.get([sample.x, sample.y, sample.z]) * current_amplitude;
                    current_amplitude *= 0.5; // Persistence
                    current_frequency *= 2.0; // Lacunarity
                }

                noise_value
            }
            NoiseSource::Ridged { ridged, amplitude } => {
                let point = direction * self.base_radius;
                ridged.get([point.x, point.y, point.z]) * *amplitude
            }
        }
    }
}

impl Terrain for PlanetTerrain {
    fn radius_at(&self, direction: DVec3) -> f64 {
        let direction = direction.normalize_or_zero();
        let features: f64 = self
            .features
            .iter()
            .map(|feature| feature.offset_at(direction))
            .sum();
        self.base_radius + self.noise_offset(direction) + features
    }

    fn base_radius(&self) -> f64 {
        self.base_radius
    }

    fn water_level(&self) -> f64 {
        self.water_level
    }
}

/// Get a predefined planet preset scaled to `base_radius`
pub fn get_terrain_preset(
    name: &str,
    base_radius: f64,
    seed: Option<u32>,
) -> Option<PlanetTerrain> {
    let seed = seed.unwrap_or_else(rand::random);

    let (algorithm, water_level) = match name {
        "flat" => (TerrainAlgorithm::Flat, base_radius - 1.0),
        "hills" => (
            TerrainAlgorithm::Perlin {
                amplitude: base_radius * 0.02,
                frequency: 3.0 / base_radius,
                octaves: 4,
            },
            base_radius - base_radius * 0.01,
        ),
        "archipelago" => (
            TerrainAlgorithm::Perlin {
                amplitude: base_radius * 0.03,
                frequency: 4.0 / base_radius,
                octaves: 3,
            },
            base_radius + base_radius * 0.005,
        ),
        "mountains" => (
            TerrainAlgorithm::Ridged {
                amplitude: base_radius * 0.04,
                frequency: 2.0 / base_radius,
                octaves: 5,
            },
            base_radius - base_radius * 0.04,
        ),
        "valleys" => (
            TerrainAlgorithm::Ridged {
                amplitude: -base_radius * 0.04, // Negative amplitude creates valleys
                frequency: 2.5 / base_radius,
                octaves: 4,
            },
            base_radius - base_radius * 0.02,
        ),
        _ => return None,
    };

    PlanetTerrain::new(base_radius, water_level.max(0.0), seed, algorithm).ok()
}

/// Scatter rocks over dry land with a seeded generator.
///
/// Positions are projected onto the surface; attempts landing underwater are
/// skipped, so fewer than `count` rocks may come back on wet planets.
pub fn scatter_rocks(
    terrain: &dyn Terrain,
    count: usize,
    radius_range: (f64, f64),
    seed: u64,
) -> Vec<Obstacle> {
    let mut rng = Pcg64::seed_from_u64(seed);
    let (min_radius, max_radius) = if radius_range.0 <= radius_range.1 {
        radius_range
    } else {
        (radius_range.1, radius_range.0)
    };

    let mut rocks = Vec::with_capacity(count);
    for _ in 0..count {
        let y: f64 = rng.gen_range(-1.0..=1.0);
        let theta: f64 = rng.gen_range(0.0..TAU);
        let ring = (1.0 - y * y).max(0.0).sqrt();
        let direction = DVec3::new(theta.cos() * ring, y, theta.sin() * ring);
        let radius = if max_radius > min_radius {
            rng.gen_range(min_radius..=max_radius)
        } else {
            min_radius
        };

        if terrain.is_submerged(direction, 0.0) {
            continue;
        }
        if let Ok(rock) = Obstacle::new(terrain.project(direction), radius) {
            rocks.push(rock);
        }
    }
    rocks
}
