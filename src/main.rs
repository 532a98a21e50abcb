use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use glam::DVec3;
use serde::Serialize;

use s2_edge_query::s2_index::{ChordAngle, ShapeIndex};
use s2_edge_query::textformat::{parse_index, parse_point, parse_points};
use s2_edge_query::util::Timed;
use s2_edge_query::{
    ClosestEdgeQuery, Distance, EdgeTarget, FurthestEdgeQuery, FurthestEdgeTarget,
    FurthestPointTarget, MaxDistance, MinDistance, Options, PointTarget, QueryResult,
};

/// Closest / furthest edge search over a text-format index
#[derive(Parser, Debug)]
#[command(name = "edge-query", version, about)]
struct Cli {
    /// Index as text: `points # polylines # polygons`, e.g. "0:0 | 1:0 # #"
    #[arg(long, conflicts_with = "index_file", required_unless_present = "index_file")]
    index: Option<String>,

    /// Read the index text from a file
    #[arg(long, value_name = "FILE")]
    index_file: Option<PathBuf>,

    /// Point target as `lat:lng`
    #[arg(long, conflicts_with = "edge_target", required_unless_present = "edge_target")]
    target: Option<String>,

    /// Edge target as `lat:lng, lat:lng`
    #[arg(long)]
    edge_target: Option<String>,

    /// Find the furthest edges instead of the closest
    #[arg(long)]
    furthest: bool,

    /// Maximum number of results (default: all)
    #[arg(long)]
    max_edges: Option<usize>,

    /// Only report edges closer than this (further than this with --furthest)
    #[arg(long, value_name = "DEGREES")]
    max_distance_deg: Option<f64>,

    /// Allowed error in the reported distances
    #[arg(long, value_name = "DEGREES", default_value_t = 0.0)]
    max_error_deg: f64,

    /// Report polygons containing the target (distance 0, or 180 with --furthest)
    #[arg(long)]
    include_interiors: bool,

    /// Test every edge instead of searching the index
    #[arg(long)]
    brute_force: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
enum TargetGeometry {
    Point(DVec3),
    Edge(DVec3, DVec3),
}

#[derive(Debug, Serialize)]
struct ResultRow {
    shape_id: u32,
    /// Absent for a polygon interior.
    edge_id: Option<u32>,
    distance_deg: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let index = load_index(&cli)?;
    let target = parse_target(&cli)?;
    let rows = {
        let _t = Timed::debug("query");
        if cli.furthest {
            run_furthest(&cli, &index, target)?
        } else {
            run_closest(&cli, &index, target)?
        }
    };
    print_rows(&rows, cli.json)
}

fn load_index(cli: &Cli) -> anyhow::Result<ShapeIndex> {
    let text = match (&cli.index, &cli.index_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading index file {}", path.display()))?,
        (None, None) => bail!("one of --index or --index-file is required"),
    };
    let _t = Timed::debug("index build");
    let index = parse_index(&text).context("parsing index")?;
    log::info!(
        "index: {} shapes, {} edges, {} cells",
        index.num_shapes(),
        index.num_edges(),
        index.num_cells()
    );
    Ok(index)
}

fn parse_target(cli: &Cli) -> anyhow::Result<TargetGeometry> {
    if let Some(text) = &cli.target {
        let p = parse_point(text).with_context(|| format!("parsing --target {text:?}"))?;
        return Ok(TargetGeometry::Point(p));
    }
    if let Some(text) = &cli.edge_target {
        let points = parse_points(text).with_context(|| format!("parsing --edge-target {text:?}"))?;
        return match points.as_slice() {
            [a, b] => Ok(TargetGeometry::Edge(*a, *b)),
            _ => bail!("--edge-target needs exactly 2 points, got {}", points.len()),
        };
    }
    bail!("one of --target or --edge-target is required")
}

fn options_from_cli<D: Distance>(cli: &Cli, max_distance: Option<D>) -> anyhow::Result<Options<D>> {
    let mut options = Options::default()
        .with_max_error(ChordAngle::from_degrees(cli.max_error_deg))
        .with_include_interiors(cli.include_interiors);
    if let Some(max_edges) = cli.max_edges {
        if max_edges == 0 {
            bail!("--max-edges must be positive");
        }
        options = options.with_max_edges(max_edges);
    }
    if let Some(max_distance) = max_distance {
        options = options.with_max_distance(max_distance);
    }
    if cli.brute_force {
        options = options.with_brute_force_threshold(usize::MAX);
    }
    Ok(options)
}

fn run_closest(cli: &Cli, index: &ShapeIndex, target: TargetGeometry) -> anyhow::Result<Vec<ResultRow>> {
    let options = options_from_cli(cli, cli.max_distance_deg.map(MinDistance::from_degrees))?;
    let mut query = ClosestEdgeQuery::with_options(index, options);
    let results = match target {
        TargetGeometry::Point(p) => query.find_closest_edges(&PointTarget::new(p)),
        TargetGeometry::Edge(a, b) => query.find_closest_edges(&EdgeTarget::new(a, b)),
    };
    log::debug!("{:?}", query.last_stats());
    Ok(results.iter().map(|r| row(r, r.distance.chord_angle())).collect())
}

fn run_furthest(cli: &Cli, index: &ShapeIndex, target: TargetGeometry) -> anyhow::Result<Vec<ResultRow>> {
    let options = options_from_cli(cli, cli.max_distance_deg.map(MaxDistance::from_degrees))?;
    let mut query = FurthestEdgeQuery::with_options(index, options);
    let results = match target {
        TargetGeometry::Point(p) => query.find_furthest_edges(&FurthestPointTarget::new(p)),
        TargetGeometry::Edge(a, b) => query.find_furthest_edges(&FurthestEdgeTarget::new(a, b)),
    };
    log::debug!("{:?}", query.last_stats());
    Ok(results.iter().map(|r| row(r, r.distance.chord_angle())).collect())
}

fn row<D: Distance>(result: &QueryResult<D>, distance: ChordAngle) -> ResultRow {
    ResultRow {
        shape_id: result.shape_id,
        edge_id: result.edge_id,
        distance_deg: distance.degrees(),
    }
}

fn print_rows(rows: &[ResultRow], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("no edges found");
    }
    for r in rows {
        let edge = r
            .edge_id
            .map_or_else(|| "interior".to_string(), |e| e.to_string());
        println!("shape {} edge {} {:.9} deg", r.shape_id, edge, r.distance_deg);
    }
    Ok(())
}
