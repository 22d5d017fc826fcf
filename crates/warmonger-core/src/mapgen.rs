//! Procedural map generation.
//!
//! Maps are hexagons grown ring by ring around a center node. Terrain is
//! then assigned with a seeded generator so the same seed always produces
//! the same map.

use crate::hex::Direction;
use crate::map::{Map, MapNodeId};
use crate::settings::{MapSettings, SettingsError};
use crate::terrain::TerrainTypeId;
use crate::world::World;
use thiserror::Error;

/// Errors from building a map out of settings.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapGenError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("terrain type `{0}` does not exist in the world")]
    UnknownTerrainType(String),
    #[error("the world has no terrain types")]
    NoTerrainTypes,
}

/// Grow a hexagonal grid of `radius` rings inside `map`.
///
/// Radius 0 creates nothing, radius 1 a single node, and every further ring
/// surrounds the previous ones. All new nodes get `terrain`. Returns the new
/// nodes, center first, ring by ring.
pub fn generate_map_nodes(map: &mut Map, radius: u32, terrain: TerrainTypeId) -> Vec<MapNodeId> {
    let mut nodes = Vec::new();
    if radius == 0 {
        return nodes;
    }

    nodes.push(map.add_map_node(terrain));

    for ring in 1..radius {
        add_map_node_ring(map, &mut nodes, terrain);
        tracing::debug!(ring, nodes = nodes.len(), "added map node ring");
    }

    nodes
}

/// Give every free side of the current nodes a new neighbour.
///
/// Only nodes that existed before this pass are expanded; the nodes created
/// here are appended afterwards.
fn add_map_node_ring(map: &mut Map, nodes: &mut Vec<MapNodeId>, terrain: TerrainTypeId) {
    let mut new_nodes = Vec::new();

    for &node in nodes.iter() {
        for direction in Direction::ALL {
            if map.neighbour(node, direction).is_none() {
                new_nodes.push(create_neighbour(map, node, direction, terrain));
            }
        }
    }

    nodes.extend(new_nodes);
}

/// Create the neighbour of `node` in `direction` and link it with the nodes
/// sharing a hexagon corner with it.
fn create_neighbour(
    map: &mut Map,
    node: MapNodeId,
    direction: Direction,
    terrain: TerrainTypeId,
) -> MapNodeId {
    let new_node = map.add_map_node(terrain);
    link(map, node, direction, new_node);

    let (ccw, cw) = direction.neighbour_directions();
    connect_with_common_neighbour(map, node, new_node, direction, ccw);
    connect_with_common_neighbour(map, node, new_node, direction, cw);

    new_node
}

/// `n2` is the neighbour of `n1` towards `d12`. If `n1` also has a neighbour
/// `n3` towards the adjacent `d13`, then `n2` and `n3` touch as well.
fn connect_with_common_neighbour(
    map: &mut Map,
    n1: MapNodeId,
    n2: MapNodeId,
    d12: Direction,
    d13: Direction,
) {
    let Some(n3) = map.neighbour(n1, d13) else {
        return;
    };
    if let Some(d23) = d12.connecting_direction(d13) {
        link(map, n2, d23, n3);
    }
}

fn link(map: &mut Map, a: MapNodeId, direction: Direction, b: MapNodeId) {
    // Both ends were created by this module, connecting cannot fail
    if let Err(err) = map.connect_towards(a, direction, b) {
        tracing::warn!(%err, "failed to link generated map nodes");
    }
}

/// A deterministic random number generator using xorshift.
///
/// The same seed yields the same sequence on every platform.
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a 64 bit seed.
    pub fn new(seed: u64) -> Self {
        // FNV-1a over the seed bytes spreads nearby seeds apart
        let mut state: u64 = 0xcbf29ce484222325;
        for byte in seed.to_le_bytes() {
            state ^= byte as u64;
            state = state.wrapping_mul(0x100000001b3);
        }
        if state == 0 {
            state = 0x853c49e6748fea9b;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Pick a random element, `None` when `items` is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_u64() % items.len() as u64;
        items.get(index as usize)
    }
}

/// Assign a random terrain type from `terrain_types` to each node.
///
/// Does nothing when `terrain_types` is empty.
pub fn assign_random_terrain_types(
    map: &mut Map,
    nodes: &[MapNodeId],
    terrain_types: &[TerrainTypeId],
    rng: &mut SeededRng,
) {
    for &node in nodes {
        let Some(&terrain) = rng.choose(terrain_types) else {
            return;
        };
        if let Err(err) = map.change_terrain_type(node, terrain) {
            tracing::warn!(%err, "skipping terrain assignment");
        }
    }
}

/// Builds complete maps from [`MapSettings`].
pub struct MapGenerator<'w> {
    world: &'w World,
    settings: MapSettings,
    rng: SeededRng,
}

impl<'w> MapGenerator<'w> {
    pub fn new(world: &'w World, settings: MapSettings) -> Self {
        let rng = SeededRng::new(settings.seed);
        Self {
            world,
            settings,
            rng,
        }
    }

    /// Generate a complete map.
    pub fn generate(&mut self) -> Result<Map, MapGenError> {
        self.settings.validate()?;
        let terrain_types = self.terrain_pool()?;
        let first = *terrain_types.first().ok_or(MapGenError::NoTerrainTypes)?;

        let mut map = Map::new(self.settings.name.clone(), self.world);
        if let Some(display_name) = &self.settings.display_name {
            map.display_name = display_name.clone();
        }

        let radius = self.settings.radius();
        let nodes = generate_map_nodes(&mut map, radius, first);
        assign_random_terrain_types(&mut map, &nodes, &terrain_types, &mut self.rng);

        tracing::info!(
            map = %map.name,
            radius,
            nodes = map.node_count(),
            seed = self.settings.seed,
            "generated map"
        );
        Ok(map)
    }

    /// Terrain types to draw from: the configured ones, or all of them.
    fn terrain_pool(&self) -> Result<Vec<TerrainTypeId>, MapGenError> {
        if self.settings.terrain_types.is_empty() {
            return Ok(self.world.terrain_type_ids().collect());
        }
        self.settings
            .terrain_types
            .iter()
            .map(|name| {
                self.world
                    .terrain_type_by_name(name)
                    .ok_or_else(|| MapGenError::UnknownTerrainType(name.clone()))
            })
            .collect()
    }
}
