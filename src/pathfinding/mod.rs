//! Hierarchical pathfinding over a spherical planet surface.
//!
//! A global A* over a sphere-spanning node graph finds the route; segments of
//! that route that touch non-free zones are re-planned on a small local grid.

pub mod local_refiner;
pub mod nav_graph;
pub mod obstacles;
pub mod planner;
pub mod priority_queue;
pub mod segment_detector;
pub mod smoothing;
pub mod zones;

pub use local_refiner::{DebugCapture, DebugPoint, LocalGridNode, LocalRefiner, Refinement};
pub use nav_graph::{
    BlockReasons, GraphPath, GraphSearchFailure, GraphStats, NavNode, NavigationGraph,
};
pub use obstacles::*;
pub use planner::{PathPlanner, PlanFailure, PlanMetrics, PlanResult};
pub use priority_queue::PriorityQueue;
pub use segment_detector::SegmentObstacleDetector;
pub use smoothing::{catmull_rom_smooth, path_length};
pub use zones::{Capabilities, ZoneClassifier, ZoneType};
