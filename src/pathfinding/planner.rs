//! Two-tier planning: global graph search, then local detours per blocked segment

use crate::pathfinding::local_refiner::{DebugCapture, LocalRefiner};
use crate::pathfinding::nav_graph::NavigationGraph;
use crate::pathfinding::obstacles::ObstacleRegistry;
use crate::pathfinding::segment_detector::SegmentObstacleDetector;
use crate::pathfinding::zones::{Capabilities, ZoneClassifier, ZoneType};
use crate::resources::PathfindingConfig;
use crate::terrain::Terrain;
use crate::terrain::constants::ALREADY_AT_GOAL;
use bevy::log::{debug, info, warn};
use bevy::math::DVec3;
use std::time::{Duration, Instant};
use thiserror::Error;

const DUPLICATE_POINT_DISTANCE: f64 = 1e-6;

/// Why a plan did not fully succeed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFailure {
    #[error("No walkable start: start is forbidden or too far from any passable node")]
    NoWalkableStart,

    #[error("No walkable goal: goal is forbidden or too far from any passable node")]
    NoWalkableGoal,

    #[error("No global path found ({})", search_end_label(.iteration_limit))]
    GlobalPathNotFound { iteration_limit: bool },

    #[error("Segment {segment_index} is blocked and could not be refined")]
    SegmentBlockedUnrefinable { segment_index: usize },
}

fn search_end_label(iteration_limit: &bool) -> &'static str {
    if *iteration_limit {
        "iteration limit reached"
    } else {
        "open set exhausted"
    }
}

impl PlanFailure {
    /// Stable machine-readable code
    pub fn reason_code(&self) -> &'static str {
        match self {
            PlanFailure::NoWalkableStart => "no_walkable_start",
            PlanFailure::NoWalkableGoal => "no_walkable_goal",
            PlanFailure::GlobalPathNotFound { .. } => "global_path_not_found",
            PlanFailure::SegmentBlockedUnrefinable { .. } => "segment_blocked_unrefinable",
        }
    }
}

/// Search effort spent on one plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanMetrics {
    pub global_nodes_explored: usize,
    pub global_iterations: u32,
    pub local_nodes_explored: usize,
    pub segments_total: usize,
    pub segments_blocked: usize,
    pub segments_refined: usize,
    /// Widened second attempts
    pub refinement_retries: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    pub success: bool,
    /// Terrain-projected waypoints from start toward goal
    pub path: Vec<DVec3>,
    /// Global node sequence the path was built from
    pub node_path: Vec<usize>,
    pub failure: Option<PlanFailure>,
    /// Informational note on success, e.g. the degenerate same-node case
    pub note: Option<&'static str>,
    /// The path is a direct line that was never checked for obstacles
    pub unsafe_fallback: bool,
    /// The path stops before the goal at an unrefinable segment
    pub truncated: bool,
    pub metrics: PlanMetrics,
}

impl PlanResult {
    fn failed(failure: PlanFailure, metrics: PlanMetrics) -> Self {
        Self {
            success: false,
            path: Vec::new(),
            node_path: Vec::new(),
            failure: Some(failure),
            note: None,
            unsafe_fallback: false,
            truncated: false,
            metrics,
        }
    }

    /// Human-readable reason for a failure or note
    pub fn reason(&self) -> Option<String> {
        self.failure
            .map(|failure| failure.to_string())
            .or_else(|| self.note.map(str::to_string))
    }

    pub fn reason_code(&self) -> Option<&'static str> {
        self.failure.map(|failure| failure.reason_code())
    }
}

enum SegmentOutcome {
    Clear,
    Refined(Vec<DVec3>),
    Unrefinable,
}

/// Stateless orchestrator over a graph, terrain and obstacle set
#[derive(Clone, Copy)]
pub struct PathPlanner<'a> {
    graph: &'a NavigationGraph,
    terrain: &'a dyn Terrain,
    obstacles: &'a ObstacleRegistry,
    config: &'a PathfindingConfig,
}

impl<'a> PathPlanner<'a> {
    pub fn new(
        graph: &'a NavigationGraph,
        terrain: &'a dyn Terrain,
        obstacles: &'a ObstacleRegistry,
        config: &'a PathfindingConfig,
    ) -> Self {
        Self {
            graph,
            terrain,
            obstacles,
            config,
        }
    }

    pub fn classifier(&self) -> ZoneClassifier<'a> {
        ZoneClassifier::new(self.terrain, self.obstacles, self.config)
    }

    pub fn plan_path(&self, start: DVec3, goal: DVec3, caps: Capabilities) -> PlanResult {
        self.plan_path_with_debug(start, goal, caps, &mut DebugCapture::default())
    }

    pub fn plan_path_with_debug(
        &self,
        start: DVec3,
        goal: DVec3,
        caps: Capabilities,
        debug_capture: &mut DebugCapture,
    ) -> PlanResult {
        let started = Instant::now();
        let mut metrics = PlanMetrics::default();
        let classifier = self.classifier();
        let start = self.terrain.project(start);
        let goal = self.terrain.project(goal);

        if !classifier.is_valid_destination(start, caps) {
            warn!("Plan rejected: start {start:?} is forbidden for {caps:?}");
            metrics.elapsed = started.elapsed();
            return PlanResult::failed(PlanFailure::NoWalkableStart, metrics);
        }
        if !classifier.is_valid_destination(goal, caps) {
            warn!("Plan rejected: goal {goal:?} is forbidden for {caps:?}");
            metrics.elapsed = started.elapsed();
            return PlanResult::failed(PlanFailure::NoWalkableGoal, metrics);
        }

        let global = match self.graph.find_path(
            self.terrain,
            start,
            goal,
            caps,
            self.config.global_max_iterations,
        ) {
            Ok(global) => global,
            Err(search) => {
                metrics.global_nodes_explored = search.nodes_explored;
                metrics.global_iterations = search.iterations;
                metrics.elapsed = started.elapsed();
                warn!("Global search failed: {}", search.failure);

                let mut result = PlanResult::failed(search.failure, metrics);
                if matches!(search.failure, PlanFailure::GlobalPathNotFound { .. }) {
                    result.path = vec![start, goal];
                    result.unsafe_fallback = true;
                }
                return result;
            }
        };
        metrics.global_nodes_explored = global.nodes_explored;
        metrics.global_iterations = global.iterations;

        if global.nodes.len() == 1 {
            metrics.elapsed = started.elapsed();
            return PlanResult {
                success: true,
                path: vec![start, goal],
                node_path: global.nodes,
                failure: None,
                note: Some(ALREADY_AT_GOAL),
                unsafe_fallback: false,
                truncated: false,
                metrics,
            };
        }

        let mut waypoints = Vec::with_capacity(global.waypoints.len() + 2);
        waypoints.push(start);
        waypoints.extend(
            global
                .waypoints
                .iter()
                .copied()
                .filter(|&point| classifier.classify(point, caps) != ZoneType::Forbidden),
        );
        waypoints.push(goal);
        waypoints.dedup_by(|a, b| a.distance(*b) < DUPLICATE_POINT_DISTANCE);

        let detector = SegmentObstacleDetector::new(classifier, self.config);
        let refiner = LocalRefiner::new(classifier, self.config);

        let mut path = vec![start];
        let mut failure = None;
        for (segment_index, pair) in waypoints.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            metrics.segments_total += 1;

            match self.resolve_segment(
                &detector,
                &refiner,
                from,
                to,
                caps,
                &mut metrics,
                debug_capture,
            ) {
                SegmentOutcome::Clear => append_point(&mut path, to),
                SegmentOutcome::Refined(detour) => {
                    for point in detour {
                        append_point(&mut path, point);
                    }
                    append_point(&mut path, to);
                }
                SegmentOutcome::Unrefinable => {
                    warn!(
                        "Segment {segment_index} could not be refined; truncating path at {} points",
                        path.len()
                    );
                    failure = Some(PlanFailure::SegmentBlockedUnrefinable { segment_index });
                    break;
                }
            }
        }

        let path: Vec<DVec3> = path.into_iter().map(|point| self.terrain.project(point)).collect();
        metrics.elapsed = started.elapsed();

        info!(
            "Planned path: {} waypoints, {}/{} segments blocked, {} refined, {:?}",
            path.len(),
            metrics.segments_blocked,
            metrics.segments_total,
            metrics.segments_refined,
            metrics.elapsed
        );

        PlanResult {
            success: failure.is_none(),
            path,
            node_path: global.nodes,
            failure,
            note: None,
            unsafe_fallback: false,
            truncated: failure.is_some(),
            metrics,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_segment(
        &self,
        detector: &SegmentObstacleDetector,
        refiner: &LocalRefiner,
        from: DVec3,
        to: DVec3,
        caps: Capabilities,
        metrics: &mut PlanMetrics,
        debug_capture: &mut DebugCapture,
    ) -> SegmentOutcome {
        if !detector.has_obstacle(from, to, caps) {
            return SegmentOutcome::Clear;
        }
        metrics.segments_blocked += 1;

        let first = refiner.refine_detailed(from, to, caps, None, debug_capture);
        metrics.local_nodes_explored += first.nodes_explored;
        if let Some(detour) = first.path {
            if !detector.path_crosses_forbidden(&detour, caps) {
                metrics.segments_refined += 1;
                return SegmentOutcome::Refined(detour);
            }
            debug!("Default channel detour crosses forbidden ground; widening");
        }

        metrics.refinement_retries += 1;
        let widened = first.half_width * self.config.widen_factor.get();
        let second = refiner.refine_detailed(from, to, caps, Some(widened), debug_capture);
        metrics.local_nodes_explored += second.nodes_explored;
        match second.path {
            Some(detour) if !detector.path_crosses_forbidden(&detour, caps) => {
                metrics.segments_refined += 1;
                SegmentOutcome::Refined(detour)
            }
            _ => SegmentOutcome::Unrefinable,
        }
    }
}

fn append_point(path: &mut Vec<DVec3>, point: DVec3) {
    let duplicate = path
        .last()
        .is_some_and(|last| last.distance(point) < DUPLICATE_POINT_DISTANCE);
    if !duplicate {
        path.push(point);
    }
}
