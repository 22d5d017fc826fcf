//! Warmonger CLI - inspect and sanity-check maps
//!
//! Commands:
//! - generate: Build a map from settings and save it
//! - check: Load a map and verify its graph
//! - path: Shortest path of a unit to a node
//! - reach: Nodes a unit can reach this turn

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use warmonger_core::{
    load_map, load_world, reachable_nodes_for_unit, save_map, shortest_path_for_unit, Map,
    MapGenerator, MapNodeId, MapSettings, UnitId, World,
};

#[derive(Parser)]
#[command(name = "warmonger")]
#[command(about = "Warmonger map sanity-check tool")]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a map and save it
    Generate {
        #[arg(long)]
        world: PathBuf,
        /// Settings file; defaults are used when absent
        #[arg(long)]
        settings: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        radius: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output: PathBuf,
    },
    /// Load a map and check its consistency
    Check {
        #[arg(long)]
        world: PathBuf,
        #[arg(long)]
        map: PathBuf,
    },
    /// Print the shortest path of a unit to a node
    Path {
        #[arg(long)]
        world: PathBuf,
        #[arg(long)]
        map: PathBuf,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        to: String,
    },
    /// Print the nodes a unit can reach with its movement points
    Reach {
        #[arg(long)]
        world: PathBuf,
        #[arg(long)]
        map: PathBuf,
        #[arg(long)]
        unit: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            world,
            settings,
            name,
            radius,
            seed,
            output,
        } => {
            let world = read_world(&world)?;
            let mut settings = match settings {
                Some(path) => MapSettings::load(&path)
                    .with_context(|| format!("failed to load settings from {}", path.display()))?,
                None => MapSettings::default(),
            };
            if let Some(name) = name {
                settings.name = name;
            }
            if radius.is_some() {
                settings.radius = radius;
            }
            if let Some(seed) = seed {
                settings.seed = seed;
            }

            let map = MapGenerator::new(&world, settings)
                .generate()
                .context("failed to generate map")?;
            save_map(&world, &map, &output)
                .with_context(|| format!("failed to save map to {}", output.display()))?;
            println!(
                "generated map `{}`: {} nodes, {} connections",
                map.name,
                map.node_count(),
                map.connections().len()
            );
        }
        Commands::Check { world, map } => {
            let world = read_world(&world)?;
            let map = read_map(&world, &map)?;
            map.check_consistency()
                .with_context(|| format!("map `{}` is inconsistent", map.name))?;
            println!(
                "map `{}` is consistent: {} nodes, {} connections, {} edge nodes, {} settlements, {} units",
                map.name,
                map.node_count(),
                map.connections().len(),
                map.edge_nodes().count(),
                map.settlements().count(),
                map.units().count()
            );
        }
        Commands::Path {
            world,
            map,
            unit,
            to,
        } => {
            let world = read_world(&world)?;
            let map = read_map(&world, &map)?;
            let unit = find_unit(&map, &unit)?;
            let target = find_node(&map, &to)?;

            let path = shortest_path_for_unit(&world, &map, unit, target)?;
            if path.is_empty() {
                println!("no path");
            } else {
                println!("{}", node_names(&map, &path).join(" -> "));
            }
        }
        Commands::Reach { world, map, unit } => {
            let world = read_world(&world)?;
            let map = read_map(&world, &map)?;
            let unit = find_unit(&map, &unit)?;

            let mut reachable: Vec<MapNodeId> =
                reachable_nodes_for_unit(&world, &map, unit)?.into_iter().collect();
            reachable.sort();
            println!("{} nodes reachable", reachable.len());
            for name in node_names(&map, &reachable) {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

fn read_world(path: &Path) -> anyhow::Result<World> {
    load_world(path).with_context(|| format!("failed to load world from {}", path.display()))
}

fn read_map(world: &World, path: &Path) -> anyhow::Result<Map> {
    load_map(world, path).with_context(|| format!("failed to load map from {}", path.display()))
}

fn find_unit(map: &Map, name: &str) -> anyhow::Result<UnitId> {
    match map.units().find(|(_, unit)| unit.name == name) {
        Some((id, unit)) => {
            tracing::debug!(unit = id, position = %unit.position, "resolved unit `{}`", name);
            Ok(id)
        }
        None => bail!("no unit named `{}` on map `{}`", name, map.name),
    }
}

fn find_node(map: &Map, name: &str) -> anyhow::Result<MapNodeId> {
    map.node_by_name(name)
        .with_context(|| format!("no map node named `{}`", name))
}

fn node_names(map: &Map, nodes: &[MapNodeId]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|&id| map.node(id).map(|n| n.name().to_string()))
        .collect()
}
