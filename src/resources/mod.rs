use crate::config::range_types::*;
use crate::errors::{NavError, NavResult};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tunables for graph generation, zone classification and both search tiers.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, Validate)]
#[serde(default)]
pub struct PathfindingConfig {
    // Global graph settings
    #[validate(range(min = 16, max = 50000))]
    pub node_count: usize,
    pub connectivity_multiplier: ConnectivityMultiplier,
    pub max_slope_angle: SlopeAngle,
    /// Water depth tolerated before terrain counts as submerged
    pub underwater_margin: Clearance,
    /// Extra distance beyond a rock's collision radius that disables graph nodes
    pub obstacle_clearance: Clearance,

    // Zone settings
    pub rock_avoidance_margin: AvoidanceMargin,
    pub shore_avoidance_margin: AvoidanceMargin,

    // Global search settings
    #[validate(range(min = 1))]
    pub global_max_iterations: u32,
    /// Max snap distance from an endpoint to its graph node, in neighbor distances
    pub snap_distance_factor: ScaleFactor,
    #[validate(nested)]
    pub smoothing: SmoothingSettings,

    // Segment detection
    #[validate(range(min = 2, max = 1024))]
    pub segment_samples: u32,

    // Local refinement settings
    pub channel_margin: ChannelMargin,
    pub local_grid_spacing: GridSpacing,
    #[validate(range(min = 1))]
    pub local_max_iterations: u32,
    pub avoidance_cost_multiplier: CostMultiplier,
    pub widen_factor: ScaleFactor,
}

#[derive(Serialize, Deserialize, Clone, Debug, Validate)]
#[serde(default)]
pub struct SmoothingSettings {
    pub enabled: bool,
    /// Spline samples emitted per graph edge (1 = node positions only)
    #[validate(range(min = 1, max = 32))]
    pub samples_per_segment: u32,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            samples_per_segment: 3,
        }
    }
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            // Global graph settings
            node_count: 2000,
            connectivity_multiplier: ConnectivityMultiplier::new(1.6),
            max_slope_angle: SlopeAngle::new(40.0),
            underwater_margin: Clearance::new(0.0),
            obstacle_clearance: Clearance::new(0.5),

            // Zone settings
            rock_avoidance_margin: AvoidanceMargin::new(1.5),
            shore_avoidance_margin: AvoidanceMargin::new(1.5),

            // Global search settings
            global_max_iterations: 20_000,
            snap_distance_factor: ScaleFactor::new(3.0),
            smoothing: SmoothingSettings::default(),

            // Segment detection
            segment_samples: 16,

            // Local refinement settings
            channel_margin: ChannelMargin::new(3.0),
            local_grid_spacing: GridSpacing::new(0.5),
            local_max_iterations: 20_000,
            avoidance_cost_multiplier: CostMultiplier::new(4.0),
            widen_factor: ScaleFactor::new(3.0),
        }
    }
}

impl PathfindingConfig {
    /// Validate integer ranges, reporting every failing field
    pub fn validate_settings(&self) -> NavResult<()> {
        self.validate().map_err(|validation_errors| {
            let mut details: Vec<String> = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                    format!("{field}: {}", error_msgs.join(", "))
                })
                .collect();
            if details.is_empty() {
                details.push(validation_errors.to_string());
            }
            details.sort();

            NavError::InvalidConfig {
                reason: details.join("; "),
            }
        })
    }
}
