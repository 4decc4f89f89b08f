pub mod config;
pub mod errors;
pub mod pathfinding;
pub mod resources;
pub mod terrain;
pub mod terrain_generation;

// Selective re-exports for external consumers

// Errors - setup operations
pub use errors::{NavError, NavResult};

// Planning entry points
pub use pathfinding::{
    Capabilities, DebugCapture, NavigationGraph, ObstacleRegistry, PathPlanner, PlanFailure,
    PlanResult, ZoneClassifier, ZoneType,
};

// Config and terrain
pub use resources::PathfindingConfig;
pub use terrain::Terrain;
pub use terrain_generation::{PlanetTerrain, get_terrain_preset, scatter_rocks};
