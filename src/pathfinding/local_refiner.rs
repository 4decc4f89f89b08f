//! Local channel search around obstructed global segments

use crate::pathfinding::priority_queue::PriorityQueue;
use crate::pathfinding::zones::{Capabilities, ZoneClassifier, ZoneType};
use crate::resources::PathfindingConfig;
use crate::terrain::constants::{MAX_CHANNEL_COLUMNS, MAX_CHANNEL_ROWS, OBSTACLE_CHANNEL_FACTOR};
use crate::terrain::coordinates::tangent_basis;
use bevy::log::debug;
use bevy::math::DVec3;

/// One cell of the channel grid, rebuilt on every refinement call
#[derive(Debug, Clone, PartialEq)]
pub struct LocalGridNode {
    pub index: usize,
    pub position: DVec3,
    pub walkable: bool,
    pub is_avoidance: bool,
    pub row: usize,
    pub col: usize,
    pub neighbors: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugPoint {
    pub position: DVec3,
    pub walkable: bool,
    pub zone: ZoneType,
}

/// Opt-in record of the most recent channel grid
#[derive(Debug, Clone, Default)]
pub struct DebugCapture {
    pub enabled: bool,
    points: Vec<DebugPoint>,
}

impl DebugCapture {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            points: Vec::new(),
        }
    }

    pub fn debug_points(&self) -> &[DebugPoint] {
        &self.points
    }

    fn record(&mut self, points: impl IntoIterator<Item = DebugPoint>) {
        if self.enabled {
            self.points.clear();
            self.points.extend(points);
        }
    }
}

/// Outcome of one refinement attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    /// Channel node positions from `from` to `to`, if a detour exists
    pub path: Option<Vec<DVec3>>,
    pub nodes_explored: usize,
    /// Channel half-width used for this attempt
    pub half_width: f64,
    pub rows: usize,
    pub columns: usize,
}

/// Bounded grid search in an oriented channel around one segment
#[derive(Clone, Copy)]
pub struct LocalRefiner<'a> {
    classifier: ZoneClassifier<'a>,
    channel_margin: f64,
    grid_spacing: f64,
    max_iterations: u32,
    avoidance_cost_multiplier: f64,
    rock_avoidance_margin: f64,
}

impl<'a> LocalRefiner<'a> {
    pub fn new(classifier: ZoneClassifier<'a>, config: &PathfindingConfig) -> Self {
        Self {
            classifier,
            channel_margin: config.channel_margin.get(),
            grid_spacing: config.local_grid_spacing.get(),
            max_iterations: config.local_max_iterations,
            avoidance_cost_multiplier: config.avoidance_cost_multiplier.get(),
            rock_avoidance_margin: config.rock_avoidance_margin.get(),
        }
    }

    /// Detour from `from` to `to`, or `None` when the channel has no route
    pub fn refine(
        &self,
        from: DVec3,
        to: DVec3,
        caps: Capabilities,
        margin_override: Option<f64>,
    ) -> Option<Vec<DVec3>> {
        self.refine_detailed(from, to, caps, margin_override, &mut DebugCapture::default())
            .path
    }

    /// Channel half-width for a segment: the configured margin, widened for large obstacles
    pub fn default_half_width(&self, from: DVec3, to: DVec3) -> f64 {
        let largest = self
            .classifier
            .obstacles()
            .largest_radius_near_segment(from, to, self.rock_avoidance_margin)
            .unwrap_or(0.0);
        self.channel_margin.max(OBSTACLE_CHANNEL_FACTOR * largest)
    }

    pub fn refine_detailed(
        &self,
        from: DVec3,
        to: DVec3,
        caps: Capabilities,
        margin_override: Option<f64>,
        debug_capture: &mut DebugCapture,
    ) -> Refinement {
        let half_width = margin_override.unwrap_or_else(|| self.default_half_width(from, to));
        let grid = self.build_grid(from, to, half_width, caps);

        debug_capture.record(grid.nodes.iter().map(|node| DebugPoint {
            position: node.position,
            walkable: node.walkable,
            zone: if !node.walkable {
                ZoneType::Forbidden
            } else if node.is_avoidance {
                ZoneType::Avoidance
            } else {
                ZoneType::Free
            },
        }));

        let (path, nodes_explored) = match (
            grid.nearest_walkable_in_row(0, from),
            grid.nearest_walkable_in_row(grid.rows - 1, to),
        ) {
            (Some(start), Some(goal)) => self.search(&grid, start, goal),
            _ => (None, 0),
        };

        debug!(
            "Local refinement: {}x{} channel, half-width {:.2}, {} explored, {}",
            grid.rows,
            grid.columns,
            half_width,
            nodes_explored,
            if path.is_some() { "detour found" } else { "no detour" }
        );

        Refinement {
            path,
            nodes_explored,
            half_width,
            rows: grid.rows,
            columns: grid.columns,
        }
    }

    fn build_grid(
        &self,
        from: DVec3,
        to: DVec3,
        half_width: f64,
        caps: Capabilities,
    ) -> ChannelGrid {
        let terrain = self.classifier.terrain();
        let length = from.distance(to);
        let spacing = self.grid_spacing;

        let rows = ((length / spacing).ceil() as usize + 1).clamp(2, MAX_CHANNEL_ROWS);
        let max_half_columns = (MAX_CHANNEL_COLUMNS - 1) / 2;
        let half_columns = ((half_width.max(0.0) / spacing).ceil() as usize).min(max_half_columns);
        let column_spacing = if half_columns == 0 {
            0.0
        } else {
            (half_width / half_columns as f64).max(spacing)
        };
        let columns = half_columns * 2 + 1;

        let midpoint = (from + to) * 0.5;
        let forward = (to - from).normalize_or_zero();
        let mut side = terrain.normal_at(midpoint).cross(forward).normalize_or_zero();
        if side == DVec3::ZERO {
            side = tangent_basis(midpoint).0;
        }

        let mut nodes = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            let along = from.lerp(to, row as f64 / (rows - 1) as f64);
            for col in 0..columns {
                let offset = (col as f64 - half_columns as f64) * column_spacing;
                let position = terrain.project(along + side * offset);
                let zone = self.classifier.classify(position, caps);
                nodes.push(LocalGridNode {
                    index: row * columns + col,
                    position,
                    walkable: zone != ZoneType::Forbidden,
                    is_avoidance: zone == ZoneType::Avoidance,
                    row,
                    col,
                    neighbors: grid_neighbors(row, col, rows, columns),
                });
            }
        }

        ChannelGrid {
            nodes,
            rows,
            columns,
        }
    }

    fn search(&self, grid: &ChannelGrid, start: usize, goal: usize) -> (Option<Vec<DVec3>>, usize) {
        let goal_position = grid.nodes[goal].position;
        let mut open = PriorityQueue::with_capacity(grid.nodes.len());
        let mut g_score = vec![f64::INFINITY; grid.nodes.len()];
        let mut came_from: Vec<Option<usize>> = vec![None; grid.nodes.len()];
        let mut closed = vec![false; grid.nodes.len()];
        let mut explored = 0;

        g_score[start] = 0.0;
        open.push(start, grid.nodes[start].position.distance(goal_position));

        while let Some((current, _)) = open.pop() {
            if current == goal {
                let mut path = vec![grid.nodes[goal].position];
                let mut node = goal;
                while let Some(previous) = came_from[node] {
                    path.push(grid.nodes[previous].position);
                    node = previous;
                }
                path.reverse();
                return (Some(path), explored);
            }
            if explored >= self.max_iterations as usize {
                return (None, explored);
            }
            closed[current] = true;
            explored += 1;

            let current_node = &grid.nodes[current];
            for &neighbor in &current_node.neighbors {
                let next = &grid.nodes[neighbor];
                if closed[neighbor] || !next.walkable || grid.cuts_corner(current_node, next) {
                    continue;
                }
                let mut step = current_node.position.distance(next.position);
                if next.is_avoidance {
                    step *= self.avoidance_cost_multiplier;
                }
                let tentative = g_score[current] + step;
                if tentative < g_score[neighbor] {
                    g_score[neighbor] = tentative;
                    came_from[neighbor] = Some(current);
                    open.push(neighbor, tentative + next.position.distance(goal_position));
                }
            }
        }

        (None, explored)
    }
}

struct ChannelGrid {
    nodes: Vec<LocalGridNode>,
    rows: usize,
    columns: usize,
}

impl ChannelGrid {
    fn at(&self, row: usize, col: usize) -> &LocalGridNode {
        &self.nodes[row * self.columns + col]
    }

    fn nearest_walkable_in_row(&self, row: usize, target: DVec3) -> Option<usize> {
        (0..self.columns)
            .map(|col| self.at(row, col))
            .filter(|node| node.walkable)
            .min_by(|a, b| {
                a.position
                    .distance(target)
                    .total_cmp(&b.position.distance(target))
            })
            .map(|node| node.index)
    }

    /// Diagonal moves need both orthogonal cells walkable
    fn cuts_corner(&self, from: &LocalGridNode, to: &LocalGridNode) -> bool {
        from.row != to.row
            && from.col != to.col
            && (!self.at(from.row, to.col).walkable || !self.at(to.row, from.col).walkable)
    }
}

fn grid_neighbors(row: usize, col: usize, rows: usize, columns: usize) -> Vec<usize> {
    let mut neighbors = Vec::with_capacity(8);
    for d_row in -1i64..=1 {
        for d_col in -1i64..=1 {
            if d_row == 0 && d_col == 0 {
                continue;
            }
            let r = row as i64 + d_row;
            let c = col as i64 + d_col;
            if r >= 0 && c >= 0 && (r as usize) < rows && (c as usize) < columns {
                neighbors.push(r as usize * columns + c as usize);
            }
        }
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::obstacles::{Obstacle, ObstacleRegistry};
    use crate::pathfinding::segment_detector::SegmentObstacleDetector;
    use crate::config::range_types::CostMultiplier;
    use crate::terrain::Terrain;
    use crate::terrain_generation::{PlanetTerrain, SurfaceFeature};

    fn flat() -> PlanetTerrain {
        PlanetTerrain::flat(50.0, 10.0).unwrap()
    }

    /// Pond around +Z, dry beyond about 3.04 units from its center
    fn pond() -> PlanetTerrain {
        PlanetTerrain::flat(50.0, 49.0)
            .unwrap()
            .with_feature(SurfaceFeature::basin(DVec3::Z, 0.1, 3.0))
    }

    fn pond_segment(terrain: &PlanetTerrain) -> (DVec3, DVec3) {
        (
            terrain.project(DVec3::new(-0.16, 0.0, 1.0)),
            terrain.project(DVec3::new(0.16, 0.0, 1.0)),
        )
    }

    fn segment(terrain: &PlanetTerrain) -> (DVec3, DVec3) {
        (
            terrain.project(DVec3::new(-0.1, 0.0, 1.0)),
            terrain.project(DVec3::new(0.1, 0.0, 1.0)),
        )
    }

    #[test]
    fn test_grid_neighbors() {
        assert_eq!(grid_neighbors(0, 0, 3, 3), vec![1, 3, 4]);
        assert_eq!(grid_neighbors(1, 1, 3, 3).len(), 8);
        assert_eq!(grid_neighbors(2, 2, 3, 3), vec![4, 5, 7]);
    }

    #[test]
    fn test_open_channel_goes_straight() {
        let terrain = flat();
        let obstacles = ObstacleRegistry::new();
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let refiner = LocalRefiner::new(classifier, &config);
        let (from, to) = segment(&terrain);

        let path = refiner.refine(from, to, Capabilities::walker(), None).unwrap();
        assert!(path[0].distance(from) < 1e-6);
        assert!(path.last().unwrap().distance(to) < 1e-6);

        let length: f64 = path.windows(2).map(|p| p[0].distance(p[1])).sum();
        assert!(length < from.distance(to) * 1.01);
    }

    #[test]
    fn test_detour_around_rock() {
        let terrain = flat();
        let (from, to) = segment(&terrain);
        let rock = Obstacle::new(terrain.project(DVec3::Z), 1.0).unwrap();
        let obstacles = ObstacleRegistry::from_obstacles([rock]);
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let refiner = LocalRefiner::new(classifier, &config);
        let detector = SegmentObstacleDetector::new(classifier, &config);

        let mut capture = DebugCapture::enabled();
        let refinement =
            refiner.refine_detailed(from, to, Capabilities::walker(), None, &mut capture);
        let path = refinement.path.unwrap();

        assert!(refinement.half_width >= 3.0);
        assert!(refinement.columns % 2 == 1);
        assert!(!detector.path_crosses_forbidden(&path, Capabilities::walker()));
        for point in &path {
            assert!((point.length() - 50.0).abs() < 1e-9);
            assert!(!obstacles.is_position_blocked(*point));
        }

        let points = capture.debug_points();
        assert_eq!(points.len(), refinement.rows * refinement.columns);
        assert!(points.iter().any(|p| p.zone == ZoneType::Forbidden && !p.walkable));
        assert!(points.iter().any(|p| p.zone == ZoneType::Avoidance && p.walkable));
    }

    #[test]
    fn test_wide_rock_needs_wider_channel() {
        let terrain = flat();
        let (from, to) = segment(&terrain);
        // Radius 4 wall straddles the segment; a 2 unit channel cannot get around it
        let rock = Obstacle::new(terrain.project(DVec3::Z), 4.0).unwrap();
        let obstacles = ObstacleRegistry::from_obstacles([rock]);
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let refiner = LocalRefiner::new(classifier, &config);

        assert!(refiner.refine(from, to, Capabilities::walker(), Some(2.0)).is_none());
        assert!((refiner.default_half_width(from, to) - 6.0).abs() < 1e-12);
        assert!(refiner.refine(from, to, Capabilities::walker(), Some(18.0)).is_some());
    }

    #[test]
    fn test_blocked_endpoint_row_fails() {
        let terrain = flat();
        let (from, to) = segment(&terrain);
        let obstacles = ObstacleRegistry::from_obstacles([Obstacle::new(to, 30.0).unwrap()]);
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let refiner = LocalRefiner::new(classifier, &config);

        let refinement = refiner.refine_detailed(
            from,
            to,
            Capabilities::walker(),
            Some(3.0),
            &mut DebugCapture::default(),
        );
        assert!(refinement.path.is_none());
        assert_eq!(refinement.nodes_explored, 0);
    }

    #[test]
    fn test_channel_caps() {
        let terrain = flat();
        let obstacles = ObstacleRegistry::new();
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let refiner = LocalRefiner::new(classifier, &config);

        // Nearly 100 units long; 0.5 spacing would need about 200 rows
        let from = terrain.project(DVec3::X);
        let to = terrain.project(DVec3::new(-1.0, 0.3, 0.0));
        let refinement = refiner.refine_detailed(
            from,
            to,
            Capabilities::walker(),
            Some(80.0),
            &mut DebugCapture::default(),
        );
        assert_eq!(refinement.rows, MAX_CHANNEL_ROWS);
        assert!(refinement.columns <= MAX_CHANNEL_COLUMNS);
        assert!(refinement.path.is_some());
    }

    #[test]
    fn test_iteration_budget() {
        let terrain = flat();
        let (from, to) = segment(&terrain);
        let obstacles = ObstacleRegistry::new();
        let config = PathfindingConfig {
            local_max_iterations: 2,
            ..Default::default()
        };
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let refiner = LocalRefiner::new(classifier, &config);
        let refinement = refiner.refine_detailed(
            from,
            to,
            Capabilities::walker(),
            None,
            &mut DebugCapture::default(),
        );
        assert!(refinement.path.is_none());
        assert_eq!(refinement.nodes_explored, 2);
    }

    #[test]
    fn test_debug_capture_disabled_records_nothing() {
        let terrain = flat();
        let (from, to) = segment(&terrain);
        let obstacles = ObstacleRegistry::new();
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let refiner = LocalRefiner::new(classifier, &config);
        let mut capture = DebugCapture::default();
        refiner.refine_detailed(from, to, Capabilities::walker(), None, &mut capture);
        assert!(capture.debug_points().is_empty());
    }

    #[test]
    fn test_detour_around_pond() {
        let terrain = pond();
        let (from, to) = pond_segment(&terrain);
        let obstacles = ObstacleRegistry::new();
        let config = PathfindingConfig::default();
        let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
        let refiner = LocalRefiner::new(classifier, &config);
        let detector = SegmentObstacleDetector::new(classifier, &config);
        let walker = Capabilities::walker();

        assert!(detector.crosses_forbidden(from, to, walker));

        // Water reaches past a 2.5 unit channel on both sides
        assert!(refiner.refine(from, to, walker, Some(2.5)).is_none());

        let path = refiner.refine(from, to, walker, Some(8.0)).unwrap();
        assert!(path[0].distance(from) < 1e-6);
        assert!(path.last().unwrap().distance(to) < 1e-6);
        assert!(!detector.path_crosses_forbidden(&path, walker));
        for point in &path {
            assert!(!classifier.is_submerged(*point));
            assert_ne!(classifier.classify(*point, walker), ZoneType::Forbidden);
        }
    }

    #[test]
    fn test_pond_detour_prefers_free_ground() {
        let terrain = pond();
        let (from, to) = pond_segment(&terrain);
        let obstacles = ObstacleRegistry::new();
        let walker = Capabilities::walker();

        let avoidance_points = |multiplier: f64| {
            let config = PathfindingConfig {
                avoidance_cost_multiplier: CostMultiplier::new(multiplier),
                ..Default::default()
            };
            let classifier = ZoneClassifier::new(&terrain, &obstacles, &config);
            let refiner = LocalRefiner::new(classifier, &config);
            let path = refiner.refine(from, to, walker, Some(8.0)).unwrap();
            path.iter()
                .filter(|point| classifier.classify(**point, walker) == ZoneType::Avoidance)
                .count()
        };

        // Without a penalty the shortest route hugs the shoreline buffer
        let unpenalized = avoidance_points(1.0);
        let penalized = avoidance_points(4.0);
        assert!(unpenalized > 0);
        assert!(penalized < unpenalized, "{penalized} >= {unpenalized}");
    }
}
