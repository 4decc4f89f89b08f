use clap::Parser;
use spherenav::config::{load_config, load_config_from};
use spherenav::errors::{NavError, NavResult};
use spherenav::pathfinding::{
    Capabilities, DebugCapture, NavigationGraph, ObstacleRegistry, PathPlanner, PlanResult,
    path_length,
};
use spherenav::terrain::Terrain;
use spherenav::terrain_generation::scatter_rocks;
use std::path::PathBuf;

mod navplan {
    pub mod cli_utils;
    pub mod world_builder;
}

use navplan::cli_utils::*;
use navplan::world_builder::WorldBuilder;

#[derive(Parser, Clone)]
#[command(name = "navplan")]
#[command(about = "Plan a path across a generated planet")]
struct Args {
    /// Start position (format: LAT,LON in degrees)
    #[arg(long, default_value = "0.0,0.0")]
    from: String,

    /// Goal position (format: LAT,LON in degrees)
    #[arg(long, default_value = "20.0,30.0")]
    to: String,

    /// Terrain preset (flat, hills, archipelago, mountains, valleys) or algorithm (perlin, ridged)
    #[arg(long, default_value = "hills")]
    terrain_type: String,

    /// Planet base radius
    #[arg(long, default_value = "100.0")]
    radius: f64,

    /// Random seed for reproducible generation
    #[arg(long)]
    seed: Option<u32>,

    /// Absolute water level radius (defaults to the preset's)
    #[arg(long)]
    water_level: Option<f64>,

    /// Terrain amplitude override
    #[arg(long)]
    amplitude: Option<f64>,

    /// Noise frequency override
    #[arg(long)]
    frequency: Option<f64>,

    /// Noise octaves override
    #[arg(long)]
    octaves: Option<u32>,

    /// Carve a lake (format: LAT,LON,RADIUS_DEG,DEPTH)
    #[arg(long)]
    lake: Option<String>,

    /// Number of rocks scattered over dry land
    #[arg(long, default_value = "40")]
    rocks: usize,

    /// Rock radius range as min,max
    #[arg(long, default_value = "0.5,2.0")]
    rock_size: String,

    /// Navigation graph node count (defaults to the config value)
    #[arg(long)]
    nodes: Option<usize>,

    /// Config file path (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    swim: bool,

    #[arg(long)]
    climb: bool,

    #[arg(long)]
    fly: bool,

    /// Print every waypoint and local grid debug points
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_swim: self.swim,
            can_climb: self.climb,
            can_fly: self.fly,
        }
    }
}

fn main() -> NavResult<()> {
    let args = Args::parse();

    // Parse and validate all CLI arguments
    let start = parse_lat_lon(&args.from)?;
    let goal = parse_lat_lon(&args.to)?;
    let rock_size = parse_radius_range(&args.rock_size)?;
    let lake = args.lake.as_deref().map(parse_lake).transpose()?;
    if !args.radius.is_finite() || args.radius <= 0.0 {
        return Err(NavError::InvalidArgument {
            reason: format!("Radius must be positive, got {}", args.radius),
        });
    }

    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config(),
    };

    let terrain = WorldBuilder::new(args.terrain_type.clone())
        .radius(args.radius)
        .seed(args.seed)
        .water_level(args.water_level)
        .amplitude(args.amplitude)
        .frequency(args.frequency)
        .octaves(args.octaves)
        .feature(lake)
        .build()?;

    let obstacles = ObstacleRegistry::from_obstacles(scatter_rocks(
        &terrain,
        args.rocks,
        rock_size,
        u64::from(terrain.seed),
    ));

    let node_count = args.nodes.unwrap_or(config.node_count);
    let graph = NavigationGraph::generate(&terrain, &obstacles, &config, node_count)?;

    let planner = PathPlanner::new(&graph, &terrain, &obstacles, &config);
    let mut debug_capture = if args.verbose {
        DebugCapture::enabled()
    } else {
        DebugCapture::default()
    };
    let result = planner.plan_path_with_debug(
        start.to_direction() * terrain.base_radius(),
        goal.to_direction() * terrain.base_radius(),
        args.capabilities(),
        &mut debug_capture,
    );

    print_world_summary(&args, &terrain, &obstacles, &graph);
    print_plan_summary(&result, &debug_capture, args.verbose);
    Ok(())
}

fn print_world_summary(
    args: &Args,
    terrain: &spherenav::PlanetTerrain,
    obstacles: &ObstacleRegistry,
    graph: &NavigationGraph,
) {
    let stats = graph.stats();

    println!("World summary:");
    println!(
        "  Terrain: {} (seed {}), radius {}, water level {:.2}",
        args.terrain_type,
        terrain.seed,
        terrain.base_radius(),
        terrain.water_level()
    );
    println!("  Rocks: {}", obstacles.len());
    println!(
        "  Graph: {} nodes ({} walkable), {} edges, average degree {:.2}",
        stats.node_count, stats.walkable_count, stats.edge_count, stats.average_degree
    );
    println!(
        "  Neighbor distance: {:.3}, walkable components: {}",
        stats.neighbor_distance, stats.walkable_components
    );
}

fn print_plan_summary(result: &PlanResult, debug_capture: &DebugCapture, verbose: bool) {
    let status = if result.success {
        "success"
    } else if result.unsafe_fallback {
        "failed (unsafe direct fallback)"
    } else if result.truncated {
        "failed (truncated)"
    } else {
        "failed"
    };

    println!("\nPlan summary:");
    println!("  Status: {status}");
    if let Some(reason) = result.reason() {
        match result.reason_code() {
            Some(code) => println!("  Reason: {reason} [{code}]"),
            None => println!("  Note: {reason}"),
        }
    }
    println!(
        "  Waypoints: {} over {} global nodes, length {:.2}",
        result.path.len(),
        result.node_path.len(),
        path_length(&result.path)
    );

    let metrics = &result.metrics;
    println!(
        "  Global search: {} nodes explored in {} iterations",
        metrics.global_nodes_explored, metrics.global_iterations
    );
    println!(
        "  Segments: {} total, {} blocked, {} refined ({} widened retries)",
        metrics.segments_total,
        metrics.segments_blocked,
        metrics.segments_refined,
        metrics.refinement_retries
    );
    println!(
        "  Local search: {} nodes explored",
        metrics.local_nodes_explored
    );
    println!("  Elapsed: {:?}", metrics.elapsed);

    if verbose {
        println!("  Path:");
        for (i, point) in result.path.iter().enumerate() {
            println!("    {}: {}", i, format_position(*point));
        }
        println!(
            "  Last local grid: {} debug points",
            debug_capture.debug_points().len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_integration() {
        let args = Args::parse_from([
            "navplan",
            "--terrain-type",
            "flat",
            "--seed",
            "12345",
            "--radius",
            "50",
            "--rocks",
            "0",
            "--nodes",
            "400",
            "--from",
            "0,0",
            "--to",
            "10,10",
        ]);

        let start = parse_lat_lon(&args.from).unwrap();
        let goal = parse_lat_lon(&args.to).unwrap();
        assert_eq!(args.capabilities(), Capabilities::walker());

        let terrain = WorldBuilder::new(args.terrain_type.clone())
            .radius(args.radius)
            .seed(args.seed)
            .build()
            .unwrap();
        let obstacles = ObstacleRegistry::new();
        let config = spherenav::PathfindingConfig::default();
        let graph =
            NavigationGraph::generate(&terrain, &obstacles, &config, args.nodes.unwrap()).unwrap();

        let planner = PathPlanner::new(&graph, &terrain, &obstacles, &config);
        let result = planner.plan_path(
            start.to_direction() * 50.0,
            goal.to_direction() * 50.0,
            args.capabilities(),
        );
        assert!(result.success);
        assert!(result.path.len() >= 2);
    }

    #[test]
    fn test_capability_flags() {
        let args = Args::parse_from(["navplan", "--swim", "--fly"]);
        let caps = args.capabilities();
        assert!(caps.can_swim && caps.can_fly && !caps.can_climb);
    }
}
