//! Global navigation graph over the planet surface

use crate::errors::{NavError, NavResult};
use crate::pathfinding::obstacles::ObstacleRegistry;
use crate::pathfinding::priority_queue::PriorityQueue;
use crate::pathfinding::smoothing::catmull_rom_smooth;
use crate::pathfinding::zones::Capabilities;
use crate::pathfinding::PlanFailure;
use crate::resources::PathfindingConfig;
use crate::terrain::Terrain;
use crate::terrain::coordinates::{angle_between, fibonacci_sphere, mean_angular_spacing};
use bevy::log::{debug, info};
use bevy::math::DVec3;
use bevy::prelude::Resource;
use ::pathfinding::prelude::connected_components;

/// Why a node is not walkable for the default agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockReasons {
    pub submerged: bool,
    pub steep: bool,
    pub obstacle: bool,
}

impl BlockReasons {
    pub fn is_clear(&self) -> bool {
        !(self.submerged || self.steep || self.obstacle)
    }
}

#[derive(Debug, Clone)]
pub struct NavNode {
    pub index: usize,
    /// Surface point; its length equals the terrain radius along `direction`
    pub position: DVec3,
    pub direction: DVec3,
    pub walkable: bool,
    pub slope_angle_deg: f64,
    pub height_above_base: f64,
    /// Sorted ascending
    pub neighbors: Vec<usize>,
    pub blocked: BlockReasons,
}

impl NavNode {
    /// Passability for an agent; capabilities waive water and slope, never obstacles
    pub fn is_passable_for(&self, caps: Capabilities) -> bool {
        !self.blocked.obstacle
            && (!self.blocked.submerged || caps.can_swim)
            && (!self.blocked.steep || caps.ignores_relief())
    }
}

/// Successful global search
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPath {
    /// Node indices from the start node to the goal node
    pub nodes: Vec<usize>,
    /// Node positions, smoothed when enabled, projected onto the terrain
    pub waypoints: Vec<DVec3>,
    /// Sum of straight-line edge lengths along `nodes`
    pub cost: f64,
    pub nodes_explored: usize,
    pub iterations: u32,
}

/// Failed global search with the work done before giving up
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSearchFailure {
    pub failure: PlanFailure,
    pub nodes_explored: usize,
    pub iterations: u32,
}

impl GraphSearchFailure {
    fn before_search(failure: PlanFailure) -> Self {
        Self {
            failure,
            nodes_explored: 0,
            iterations: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub walkable_count: usize,
    pub edge_count: usize,
    pub average_degree: f64,
    pub neighbor_distance: f64,
    /// Connected components among walkable nodes
    pub walkable_components: usize,
}

/// Nodes distributed over the sphere with angular-threshold adjacency.
///
/// Generated once per terrain and obstacle set; localized changes go through
/// `mark_unwalkable_in_radius` and `refresh_walkability_in_radius`.
#[derive(Resource, Debug, Clone)]
pub struct NavigationGraph {
    nodes: Vec<NavNode>,
    /// Max angular separation of connected nodes, in radians
    connection_angle: f64,
    /// Scale applied to the angular heuristic, never above any real edge chain cost
    heuristic_scale: f64,
    mean_radius: f64,
    config: PathfindingConfig,
}

impl NavigationGraph {
    /// Build the graph over `terrain` with obstacle blocking baked in
    pub fn generate(
        terrain: &dyn Terrain,
        obstacles: &ObstacleRegistry,
        config: &PathfindingConfig,
        node_count: usize,
    ) -> NavResult<Self> {
        if node_count < 2 {
            return Err(NavError::TooFewNodes { node_count });
        }
        config.validate_settings()?;

        let mut nodes: Vec<NavNode> = fibonacci_sphere(node_count)
            .into_iter()
            .enumerate()
            .map(|(index, direction)| {
                let position = terrain.project(direction);
                let mut node = NavNode {
                    index,
                    position,
                    direction,
                    walkable: true,
                    slope_angle_deg: terrain.slope_angle_deg(position),
                    height_above_base: terrain.height_above_base(direction),
                    neighbors: Vec::new(),
                    blocked: BlockReasons::default(),
                };
                node.blocked = Self::block_reasons(&node, terrain, obstacles, config);
                node.walkable = node.blocked.is_clear();
                node
            })
            .collect();

        let connection_angle =
            mean_angular_spacing(node_count) * config.connectivity_multiplier.get();
        let min_dot = connection_angle.cos();

        let mut max_edge_angle: f64 = 0.0;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if nodes[i].direction.dot(nodes[j].direction) >= min_dot {
                    max_edge_angle =
                        max_edge_angle.max(angle_between(nodes[i].direction, nodes[j].direction));
                    nodes[i].neighbors.push(j);
                    nodes[j].neighbors.push(i);
                }
            }
        }

        let min_radius = nodes
            .iter()
            .map(|node| node.position.length())
            .fold(f64::INFINITY, f64::min);
        let mean_radius =
            nodes.iter().map(|node| node.position.length()).sum::<f64>() / nodes.len() as f64;

        // chord/arc ratio of the longest edge
        let half_angle = max_edge_angle * 0.5;
        let chord_ratio = if half_angle > f64::EPSILON {
            half_angle.sin() / half_angle
        } else {
            1.0
        };

        let graph = Self {
            nodes,
            connection_angle,
            heuristic_scale: min_radius.max(0.0) * chord_ratio,
            mean_radius,
            config: config.clone(),
        };

        let stats = graph.stats();
        info!(
            "Navigation graph: {walkable}/{total} nodes walkable, {edges} edges, avg degree {degree:.1}, {components} walkable components",
            walkable = stats.walkable_count,
            total = stats.node_count,
            edges = stats.edge_count,
            degree = stats.average_degree,
            components = stats.walkable_components
        );

        Ok(graph)
    }

    fn block_reasons(
        node: &NavNode,
        terrain: &dyn Terrain,
        obstacles: &ObstacleRegistry,
        config: &PathfindingConfig,
    ) -> BlockReasons {
        let clearance = config.obstacle_clearance.get();
        BlockReasons {
            submerged: terrain.is_submerged(node.position, config.underwater_margin.get()),
            steep: node.slope_angle_deg > config.max_slope_angle.get(),
            obstacle: obstacles.obstacles().iter().any(|obstacle| {
                obstacle.position.distance(node.position) < obstacle.collision_radius + clearance
            }),
        }
    }

    pub fn nodes(&self) -> &[NavNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&NavNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn config(&self) -> &PathfindingConfig {
        &self.config
    }

    /// Max angular separation of adjacent nodes, in radians
    pub fn connection_angle(&self) -> f64 {
        self.connection_angle
    }

    /// Typical surface distance between adjacent nodes
    pub fn neighbor_distance(&self) -> f64 {
        self.connection_angle * self.mean_radius
    }

    /// Admissible lower bound on the edge-chain cost between two positions
    pub fn heuristic_distance(&self, from: DVec3, to: DVec3) -> f64 {
        angle_between(from, to) * self.heuristic_scale
    }

    /// Nearest node by straight-line distance.
    ///
    /// Linear scan; a spatial index would slot in behind this signature.
    pub fn find_nearest_node(&self, position: DVec3, walkable_only: bool) -> Option<(usize, f64)> {
        self.nearest_matching(position, |node| !walkable_only || node.walkable)
    }

    /// Nearest node passable for `caps`
    pub fn find_nearest_node_for(
        &self,
        position: DVec3,
        caps: Capabilities,
    ) -> Option<(usize, f64)> {
        self.nearest_matching(position, |node| node.is_passable_for(caps))
    }

    fn nearest_matching(
        &self,
        position: DVec3,
        predicate: impl Fn(&NavNode) -> bool,
    ) -> Option<(usize, f64)> {
        self.nodes
            .iter()
            .filter(|node| predicate(node))
            .map(|node| (node.index, node.position.distance(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
    }

    pub fn nodes_in_radius(&self, position: DVec3, radius: f64) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|node| node.position.distance(position) <= radius)
            .map(|node| node.index)
            .collect()
    }

    /// Flag nodes near `center` as obstacle-blocked without rebuilding
    pub fn mark_unwalkable_in_radius(&mut self, center: DVec3, radius: f64) -> usize {
        let mut changed = 0;
        for node in &mut self.nodes {
            if node.position.distance(center) <= radius {
                if node.walkable {
                    changed += 1;
                }
                node.blocked.obstacle = true;
                node.walkable = false;
            }
        }
        debug!("Marked {changed} nodes unwalkable within {radius:.2} of {center:?}");
        changed
    }

    /// Re-derive block reasons for nodes near `center` from current terrain and obstacles
    pub fn refresh_walkability_in_radius(
        &mut self,
        terrain: &dyn Terrain,
        obstacles: &ObstacleRegistry,
        center: DVec3,
        radius: f64,
    ) -> usize {
        let mut changed = 0;
        for index in self.nodes_in_radius(center, radius) {
            let blocked = Self::block_reasons(&self.nodes[index], terrain, obstacles, &self.config);
            let node = &mut self.nodes[index];
            if node.blocked != blocked {
                changed += 1;
            }
            node.blocked = blocked;
            node.walkable = blocked.is_clear();
        }
        debug!("Refreshed walkability near {center:?}: {changed} nodes changed");
        changed
    }

    pub fn stats(&self) -> GraphStats {
        let walkable: Vec<usize> = self
            .nodes
            .iter()
            .filter(|node| node.walkable)
            .map(|node| node.index)
            .collect();
        let degree_sum: usize = self.nodes.iter().map(|node| node.neighbors.len()).sum();

        let components = connected_components(&walkable, |&index| {
            self.nodes[index]
                .neighbors
                .iter()
                .copied()
                .filter(|&neighbor| self.nodes[neighbor].walkable)
                .collect::<Vec<_>>()
        });

        GraphStats {
            node_count: self.nodes.len(),
            walkable_count: walkable.len(),
            edge_count: degree_sum / 2,
            average_degree: degree_sum as f64 / self.nodes.len().max(1) as f64,
            neighbor_distance: self.neighbor_distance(),
            walkable_components: components.len(),
        }
    }

    /// A* between the nodes nearest `start` and `goal`.
    ///
    /// Endpoints snap to the nearest node passable for `caps` within
    /// `snap_distance_factor` neighbor distances. The search stops with a
    /// failure after `max_iterations` expansions.
    pub fn find_path(
        &self,
        terrain: &dyn Terrain,
        start: DVec3,
        goal: DVec3,
        caps: Capabilities,
        max_iterations: u32,
    ) -> Result<GraphPath, GraphSearchFailure> {
        let snap_distance = self.neighbor_distance() * self.config.snap_distance_factor.get();
        let snap = |position: DVec3| {
            self.find_nearest_node_for(position, caps)
                .filter(|&(_, distance)| distance <= snap_distance)
                .map(|(index, _)| index)
        };

        let start_node = snap(start)
            .ok_or_else(|| GraphSearchFailure::before_search(PlanFailure::NoWalkableStart))?;
        let goal_node = snap(goal)
            .ok_or_else(|| GraphSearchFailure::before_search(PlanFailure::NoWalkableGoal))?;

        debug!("Global search: node {start_node} -> node {goal_node} (caps {caps:?})");

        if start_node == goal_node {
            return Ok(GraphPath {
                nodes: vec![start_node],
                waypoints: vec![self.nodes[start_node].position],
                cost: 0.0,
                nodes_explored: 0,
                iterations: 0,
            });
        }

        let goal_position = self.nodes[goal_node].position;
        let node_count = self.nodes.len();
        let mut open = PriorityQueue::with_capacity(node_count);
        let mut g_score = vec![f64::INFINITY; node_count];
        let mut came_from: Vec<Option<usize>> = vec![None; node_count];
        let mut closed = vec![false; node_count];
        let mut iterations: u32 = 0;
        let mut nodes_explored = 0;

        g_score[start_node] = 0.0;
        open.push(
            start_node,
            self.heuristic_distance(self.nodes[start_node].position, goal_position),
        );

        while let Some((current, _)) = open.pop() {
            if current == goal_node {
                let nodes = reconstruct(&came_from, goal_node);
                let waypoints = self.waypoints_for(terrain, &nodes);
                debug!(
                    "Global search succeeded: {} nodes, cost {:.2}, {} explored in {} iterations",
                    nodes.len(),
                    g_score[goal_node],
                    nodes_explored,
                    iterations
                );
                return Ok(GraphPath {
                    nodes,
                    waypoints,
                    cost: g_score[goal_node],
                    nodes_explored,
                    iterations,
                });
            }

            if iterations >= max_iterations {
                debug!("Global search hit the iteration cap ({max_iterations})");
                return Err(GraphSearchFailure {
                    failure: PlanFailure::GlobalPathNotFound {
                        iteration_limit: true,
                    },
                    nodes_explored,
                    iterations,
                });
            }
            iterations += 1;
            closed[current] = true;
            nodes_explored += 1;

            let current_position = self.nodes[current].position;
            for &neighbor in &self.nodes[current].neighbors {
                if closed[neighbor] || !self.nodes[neighbor].is_passable_for(caps) {
                    continue;
                }
                let neighbor_position = self.nodes[neighbor].position;
                let tentative = g_score[current] + current_position.distance(neighbor_position);
                if tentative < g_score[neighbor] {
                    g_score[neighbor] = tentative;
                    came_from[neighbor] = Some(current);
                    open.push(
                        neighbor,
                        tentative + self.heuristic_distance(neighbor_position, goal_position),
                    );
                }
            }
        }

        debug!("Global search exhausted the open set after {iterations} iterations");
        Err(GraphSearchFailure {
            failure: PlanFailure::GlobalPathNotFound {
                iteration_limit: false,
            },
            nodes_explored,
            iterations,
        })
    }

    fn waypoints_for(&self, terrain: &dyn Terrain, nodes: &[usize]) -> Vec<DVec3> {
        let positions: Vec<DVec3> = nodes.iter().map(|&index| self.nodes[index].position).collect();
        let smoothing = &self.config.smoothing;
        if !smoothing.enabled {
            return positions;
        }
        catmull_rom_smooth(&positions, smoothing.samples_per_segment)
            .into_iter()
            .map(|point| terrain.project(point))
            .collect()
    }
}

fn reconstruct(came_from: &[Option<usize>], goal: usize) -> Vec<usize> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(previous) = came_from[current] {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
