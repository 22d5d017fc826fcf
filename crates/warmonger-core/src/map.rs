//! The hex map graph.
//!
//! A [`Map`] owns its nodes in an arena of slots addressed by [`MapNodeId`].
//! Neighbour links are ids into the same arena and are always written on
//! both ends at once, so that if `a` sees `b` in direction `d` then `b` sees
//! `a` in `d.opposite()`.

use std::collections::{BTreeMap, HashMap};

use crate::hex::{Axis, Direction};
use crate::settlement::{Faction, FactionId, Settlement, SettlementId, SettlementTypeId};
use crate::terrain::TerrainTypeId;
use crate::unit::{Unit, UnitId, UnitTypeId};
use crate::world::World;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of generated node names.
pub const MAP_NODE_NAME_PREFIX: &str = "mapNode";

/// Handle of a node inside its map. Never reused after removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapNodeId(pub u32);

impl MapNodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for MapNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from editing a map.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map node {0} does not exist")]
    UnknownNode(MapNodeId),
    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),
    #[error("unit type {0:?} does not exist in the world")]
    UnknownUnitType(UnitTypeId),
    #[error("map node {0} cannot be its own neighbour")]
    SelfConnection(MapNodeId),
    #[error("map node name `{0}` is already taken")]
    DuplicateName(String),
    #[error("map node {0} is occupied by a unit")]
    NodeOccupied(MapNodeId),
    #[error("edge from {node} towards {direction} is not mirrored")]
    AsymmetricEdge { node: MapNodeId, direction: Direction },
    #[error("map node {neighbour} is already the {direction} neighbour of {node}")]
    AlreadyNeighbours {
        node: MapNodeId,
        neighbour: MapNodeId,
        direction: Direction,
    },
    #[error("map node {0} is listed on more than one side")]
    DuplicateNeighbour(MapNodeId),
    #[error("map node {0} already has a settlement")]
    NodeHasSettlement(MapNodeId),
    #[error("settlement {0} does not exist")]
    UnknownSettlement(SettlementId),
    #[error("settlement type {0:?} does not exist in the world")]
    UnknownSettlementType(SettlementTypeId),
    #[error("faction {0} does not exist")]
    UnknownFaction(FactionId),
    #[error("faction name `{0}` is already taken")]
    DuplicateFaction(String),
    #[error("too many factions")]
    TooManyFactions,
}

/// One hexagonal cell of the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapNode {
    name: String,
    terrain: TerrainTypeId,
    neighbours: [Option<MapNodeId>; 6],
}

impl MapNode {
    fn new(name: String, terrain: TerrainTypeId) -> Self {
        Self {
            name,
            terrain,
            neighbours: [None; 6],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terrain_type(&self) -> TerrainTypeId {
        self.terrain
    }

    /// Neighbour in the given direction, `None` at the map edge.
    #[inline]
    pub fn neighbour(&self, direction: Direction) -> Option<MapNodeId> {
        self.neighbours[direction.index()]
    }

    /// Existing neighbours in clockwise order starting from West.
    pub fn neighbours(&self) -> impl Iterator<Item = (Direction, MapNodeId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.neighbour(d).map(|n| (d, n)))
    }

    pub fn neighbour_count(&self) -> usize {
        self.neighbours.iter().flatten().count()
    }

    /// A node with at least one missing neighbour lies on the map edge.
    pub fn is_edge_node(&self) -> bool {
        self.neighbours.iter().any(Option::is_none)
    }

    /// Direction in which `other` is a neighbour, if it is one.
    pub fn direction_to(&self, other: MapNodeId) -> Option<Direction> {
        self.neighbours().find(|&(_, n)| n == other).map(|(d, _)| d)
    }
}

/// An undirected edge in canonical form.
///
/// `node_b` is the neighbour of `node_a` in `axis.forward()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapNodeConnection {
    pub node_a: MapNodeId,
    pub node_b: MapNodeId,
    pub axis: Axis,
}

/// A campaign map: the node graph plus the factions, settlements and units
/// on it.
#[derive(Clone, Debug, Default)]
pub struct Map {
    /// Unique name of the map.
    pub name: String,
    pub display_name: String,
    /// Name of the world the map is built against.
    pub world: String,
    nodes: Vec<Option<MapNode>>,
    node_names: HashMap<String, MapNodeId>,
    node_count: usize,
    next_node_index: u32,
    units: BTreeMap<UnitId, Unit>,
    occupants: HashMap<MapNodeId, UnitId>,
    next_unit_id: UnitId,
    factions: Vec<Faction>,
    settlements: BTreeMap<SettlementId, Settlement>,
    settlement_sites: HashMap<MapNodeId, SettlementId>,
    next_settlement_id: SettlementId,
}

impl Map {
    /// Create an empty map for the given world.
    pub fn new(name: impl Into<String>, world: &World) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            world: world.name.clone(),
            ..Default::default()
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    pub fn node(&self, id: MapNodeId) -> Option<&MapNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: MapNodeId) -> Option<&mut MapNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn require(&self, id: MapNodeId) -> Result<&MapNode, MapError> {
        self.node(id).ok_or(MapError::UnknownNode(id))
    }

    pub fn contains_node(&self, id: MapNodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node_by_name(&self, name: &str) -> Option<MapNodeId> {
        self.node_names.get(name).copied()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Live nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (MapNodeId, &MapNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (MapNodeId(i as u32), n)))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = MapNodeId> + '_ {
        self.nodes().map(|(id, _)| id)
    }

    /// Neighbour of `id` in `direction`; `None` for a missing node too.
    pub fn neighbour(&self, id: MapNodeId, direction: Direction) -> Option<MapNodeId> {
        self.node(id).and_then(|n| n.neighbour(direction))
    }

    /// Nodes with at least one free side.
    pub fn edge_nodes(&self) -> impl Iterator<Item = MapNodeId> + '_ {
        self.nodes()
            .filter(|(_, n)| n.is_edge_node())
            .map(|(id, _)| id)
    }

    /// Add an unconnected node with a generated `mapNode<N>` name.
    pub fn add_map_node(&mut self, terrain: TerrainTypeId) -> MapNodeId {
        loop {
            let name = format!("{}{}", MAP_NODE_NAME_PREFIX, self.next_node_index);
            self.next_node_index += 1;
            if !self.node_names.contains_key(&name) {
                return self.insert_node(name, terrain);
            }
        }
    }

    /// Add an unconnected node with an explicit name.
    pub fn add_named_map_node(
        &mut self,
        name: impl Into<String>,
        terrain: TerrainTypeId,
    ) -> Result<MapNodeId, MapError> {
        let name = name.into();
        if self.node_names.contains_key(&name) {
            return Err(MapError::DuplicateName(name));
        }
        Ok(self.insert_node(name, terrain))
    }

    fn insert_node(&mut self, name: String, terrain: TerrainTypeId) -> MapNodeId {
        let id = MapNodeId(self.nodes.len() as u32);
        self.node_names.insert(name.clone(), id);
        self.nodes.push(Some(MapNode::new(name, terrain)));
        self.node_count += 1;
        id
    }

    /// Create a node and connect it to the given neighbours.
    ///
    /// All neighbours are checked before anything is created, so a failed
    /// call leaves the map untouched.
    pub fn create_map_node(
        &mut self,
        terrain: TerrainTypeId,
        neighbours: &[(Direction, MapNodeId)],
    ) -> Result<MapNodeId, MapError> {
        for (i, &(direction, neighbour)) in neighbours.iter().enumerate() {
            self.require(neighbour)?;
            // A node touches another on one side only
            if neighbours[..i]
                .iter()
                .any(|&(d, n)| n == neighbour && d != direction)
            {
                return Err(MapError::DuplicateNeighbour(neighbour));
            }
        }

        let id = self.add_map_node(terrain);
        for &(direction, neighbour) in neighbours {
            self.connect_towards(id, direction, neighbour)?;
        }

        tracing::debug!(node = %id, neighbours = neighbours.len(), "created map node");
        Ok(id)
    }

    /// Remove a node, clearing every neighbour's link back to it.
    pub fn remove_map_node(&mut self, id: MapNodeId) -> Result<MapNode, MapError> {
        self.require(id)?;
        if self.occupants.contains_key(&id) {
            return Err(MapError::NodeOccupied(id));
        }
        if self.settlement_sites.contains_key(&id) {
            return Err(MapError::NodeHasSettlement(id));
        }

        for direction in Direction::ALL {
            self.disconnect(id, direction)?;
        }

        let node = self.nodes[id.index()]
            .take()
            .ok_or(MapError::UnknownNode(id))?;
        self.node_names.remove(&node.name);
        self.node_count -= 1;

        tracing::debug!(node = %id, name = %node.name, "removed map node");
        Ok(node)
    }

    pub fn change_terrain_type(
        &mut self,
        id: MapNodeId,
        terrain: TerrainTypeId,
    ) -> Result<(), MapError> {
        let node = self.node_mut(id).ok_or(MapError::UnknownNode(id))?;
        node.terrain = terrain;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Connect `a` and `b` on `axis`: `b` becomes the neighbour of `a` in the
    /// forward direction and `a` the neighbour of `b` in the backward one.
    pub fn connect(&mut self, a: MapNodeId, b: MapNodeId, axis: Axis) -> Result<(), MapError> {
        self.link(a, axis.forward(), b)
    }

    /// Make `b` the neighbour of `a` in `direction`, both sides at once.
    pub fn connect_towards(
        &mut self,
        a: MapNodeId,
        direction: Direction,
        b: MapNodeId,
    ) -> Result<(), MapError> {
        self.link(a, direction, b)
    }

    fn link(&mut self, a: MapNodeId, direction: Direction, b: MapNodeId) -> Result<(), MapError> {
        if a == b {
            return Err(MapError::SelfConnection(a));
        }
        let former_of_a = self.require(a)?.neighbour(direction);
        let former_of_b = self.require(b)?.neighbour(direction.opposite());

        if former_of_a == Some(b) {
            return Ok(());
        }
        if let Some(existing) = self.require(a)?.direction_to(b) {
            return Err(MapError::AlreadyNeighbours {
                node: a,
                neighbour: b,
                direction: existing,
            });
        }

        // Whoever held the two slots loses its mirrored link
        if let Some(old) = former_of_a {
            self.clear_slot(old, direction.opposite());
        }
        if let Some(old) = former_of_b {
            self.clear_slot(old, direction);
        }

        self.set_slot(a, direction, Some(b));
        self.set_slot(b, direction.opposite(), Some(a));
        Ok(())
    }

    /// Remove the edge leaving `a` in `direction`, returning the former
    /// neighbour.
    pub fn disconnect(
        &mut self,
        a: MapNodeId,
        direction: Direction,
    ) -> Result<Option<MapNodeId>, MapError> {
        let former = self.require(a)?.neighbour(direction);
        if let Some(b) = former {
            self.clear_slot(b, direction.opposite());
            self.clear_slot(a, direction);
        }
        Ok(former)
    }

    fn set_slot(&mut self, id: MapNodeId, direction: Direction, value: Option<MapNodeId>) {
        if let Some(node) = self.node_mut(id) {
            node.neighbours[direction.index()] = value;
        }
    }

    fn clear_slot(&mut self, id: MapNodeId, direction: Direction) {
        self.set_slot(id, direction, None);
    }

    /// Every edge exactly once, in canonical form.
    ///
    /// An edge is reported from the end that sees it in its axis' forward
    /// direction; the mirrored entry on the other end is skipped.
    pub fn connections(&self) -> Vec<MapNodeConnection> {
        let mut connections = Vec::new();
        for (id, node) in self.nodes() {
            for (direction, neighbour) in node.neighbours() {
                let axis = direction.axis();
                if direction == axis.forward() {
                    connections.push(MapNodeConnection {
                        node_a: id,
                        node_b: neighbour,
                        axis,
                    });
                }
            }
        }
        connections
    }

    /// Sum of filled neighbour slots over all nodes.
    pub fn directed_edge_count(&self) -> usize {
        self.nodes().map(|(_, n)| n.neighbour_count()).sum()
    }

    /// Verify that every edge is mirrored, points at a live node and is the
    /// only link between its two nodes.
    pub fn check_consistency(&self) -> Result<(), MapError> {
        for (id, node) in self.nodes() {
            for (direction, neighbour) in node.neighbours() {
                let mirrored = self
                    .node(neighbour)
                    .and_then(|n| n.neighbour(direction.opposite()));
                if mirrored != Some(id) {
                    return Err(MapError::AsymmetricEdge {
                        node: id,
                        direction,
                    });
                }
                if node.direction_to(neighbour) != Some(direction) {
                    return Err(MapError::AlreadyNeighbours {
                        node: id,
                        neighbour,
                        direction,
                    });
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Units
    // ------------------------------------------------------------------

    /// Place a new unit with the full movement points of its class.
    pub fn create_unit(
        &mut self,
        world: &World,
        name: impl Into<String>,
        unit_type: UnitTypeId,
        position: MapNodeId,
    ) -> Result<UnitId, MapError> {
        let class = world
            .class_of(unit_type)
            .ok_or(MapError::UnknownUnitType(unit_type))?;
        let hit_points = world.unit_type(unit_type).map_or(0, |t| t.hit_points);
        self.require(position)?;
        if self.occupants.contains_key(&position) {
            return Err(MapError::NodeOccupied(position));
        }

        let id = self.next_unit_id;
        self.next_unit_id += 1;
        self.units.insert(
            id,
            Unit {
                name: name.into(),
                unit_type,
                position,
                owner: None,
                hit_points,
                experience_points: 0,
                movement_points: class.movement_points,
            },
        );
        self.occupants.insert(position, id);
        Ok(id)
    }

    pub fn remove_unit(&mut self, id: UnitId) -> Result<Unit, MapError> {
        let unit = self.units.remove(&id).ok_or(MapError::UnknownUnit(id))?;
        self.occupants.remove(&unit.position);
        Ok(unit)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Units ordered by id.
    pub fn units(&self) -> impl Iterator<Item = (UnitId, &Unit)> {
        self.units.iter().map(|(&id, u)| (id, u))
    }

    pub fn unit_at(&self, node: MapNodeId) -> Option<UnitId> {
        self.occupants.get(&node).copied()
    }

    /// Put a unit on another node without any movement checks.
    pub fn relocate_unit(&mut self, id: UnitId, target: MapNodeId) -> Result<(), MapError> {
        if !self.units.contains_key(&id) {
            return Err(MapError::UnknownUnit(id));
        }
        self.require(target)?;
        match self.occupants.get(&target) {
            Some(&other) if other != id => return Err(MapError::NodeOccupied(target)),
            _ => {}
        }
        let unit = self.units.get_mut(&id).ok_or(MapError::UnknownUnit(id))?;
        self.occupants.remove(&unit.position);
        unit.position = target;
        self.occupants.insert(target, id);
        Ok(())
    }

    /// Hand a unit to a faction, or release it with `None`.
    pub fn set_unit_owner(&mut self, id: UnitId, owner: Option<FactionId>) -> Result<(), MapError> {
        self.require_faction(owner)?;
        let unit = self.units.get_mut(&id).ok_or(MapError::UnknownUnit(id))?;
        unit.owner = owner;
        Ok(())
    }

    /// Restore every unit's movement points at the start of a turn.
    pub fn reset_movement_points(&mut self, world: &World) {
        for unit in self.units.values_mut() {
            if let Some(class) = world.class_of(unit.unit_type) {
                unit.movement_points = class.movement_points;
            }
        }
    }

    // ------------------------------------------------------------------
    // Factions
    // ------------------------------------------------------------------

    pub fn add_faction(&mut self, faction: Faction) -> Result<FactionId, MapError> {
        if self.faction_by_name(&faction.name).is_some() {
            return Err(MapError::DuplicateFaction(faction.name));
        }
        let id = FactionId::try_from(self.factions.len()).map_err(|_| MapError::TooManyFactions)?;
        self.factions.push(faction);
        Ok(id)
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id as usize)
    }

    pub fn faction_by_name(&self, name: &str) -> Option<FactionId> {
        self.factions
            .iter()
            .position(|f| f.name == name)
            .map(|i| i as FactionId)
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    fn require_faction(&self, owner: Option<FactionId>) -> Result<(), MapError> {
        match owner {
            Some(id) if self.faction(id).is_none() => Err(MapError::UnknownFaction(id)),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Settlements
    // ------------------------------------------------------------------

    /// Build a settlement on a node; a node holds at most one.
    pub fn create_settlement(
        &mut self,
        world: &World,
        name: impl Into<String>,
        settlement_type: SettlementTypeId,
        position: MapNodeId,
        owner: Option<FactionId>,
    ) -> Result<SettlementId, MapError> {
        if world.settlement_type(settlement_type).is_none() {
            return Err(MapError::UnknownSettlementType(settlement_type));
        }
        self.require(position)?;
        self.require_faction(owner)?;
        if self.settlement_sites.contains_key(&position) {
            return Err(MapError::NodeHasSettlement(position));
        }

        let id = self.next_settlement_id;
        self.next_settlement_id += 1;
        self.settlements.insert(
            id,
            Settlement {
                name: name.into(),
                settlement_type,
                position,
                owner,
            },
        );
        self.settlement_sites.insert(position, id);
        tracing::debug!(settlement = id, node = %position, "created settlement");
        Ok(id)
    }

    pub fn remove_settlement(&mut self, id: SettlementId) -> Result<Settlement, MapError> {
        let settlement = self
            .settlements
            .remove(&id)
            .ok_or(MapError::UnknownSettlement(id))?;
        self.settlement_sites.remove(&settlement.position);
        Ok(settlement)
    }

    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.get(&id)
    }

    /// Settlements ordered by id.
    pub fn settlements(&self) -> impl Iterator<Item = (SettlementId, &Settlement)> {
        self.settlements.iter().map(|(&id, s)| (id, s))
    }

    pub fn settlement_at(&self, node: MapNodeId) -> Option<SettlementId> {
        self.settlement_sites.get(&node).copied()
    }

    /// Change hands, e.g. after a capture.
    pub fn set_settlement_owner(
        &mut self,
        id: SettlementId,
        owner: Option<FactionId>,
    ) -> Result<(), MapError> {
        self.require_faction(owner)?;
        let settlement = self
            .settlements
            .get_mut(&id)
            .ok_or(MapError::UnknownSettlement(id))?;
        settlement.owner = owner;
        Ok(())
    }
}
