/// Constants for terrain queries and both search tiers

/// Shoreline detection: tangent directions probed around a position
pub const SHORE_PROBE_DIRECTIONS: usize = 8;
/// Shoreline detection: steps taken along each probe, up to the margin
pub const SHORE_PROBE_STEPS: usize = 4;

/// Finite-difference step for terrain normals, in radians of arc
pub const NORMAL_SAMPLE_ANGLE: f64 = 1e-4;

/// Local channel caps
pub const MAX_CHANNEL_ROWS: usize = 160;
pub const MAX_CHANNEL_COLUMNS: usize = 100;

/// Channel half-width relative to the largest obstacle crossing the segment
pub const OBSTACLE_CHANNEL_FACTOR: f64 = 1.5;

/// Reason string for the same-node degenerate case
pub const ALREADY_AT_GOAL: &str = "Already at goal";
