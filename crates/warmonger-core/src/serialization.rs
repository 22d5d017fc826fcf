//! Saving and loading worlds and maps as JSON.
//!
//! Saved files use a name based form: terrain types, unit classes, nodes,
//! factions, settlements and units refer to each other by name instead of by
//! index. Loading resolves
//! every name and stops at the first one that does not resolve.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::hex::{Axis, HexError};
use crate::map::{Map, MapError, MapNodeId};
use crate::settings::SettingsError;
use crate::settlement::{Faction, FactionId, SettlementType};
use crate::terrain::{TerrainType, TerrainTypeId};
use crate::unit::{UnitClass, UnitType};
use crate::world::{World, WorldError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or writing saved data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Hex(#[from] HexError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    World(WorldError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("unknown {kind} `{name}`")]
    UnresolvedReference { kind: &'static str, name: String },
    #[error("duplicate {kind} name `{name}`")]
    DuplicateName { kind: &'static str, name: String },
    #[error("map `{map}` is built for world `{expected}`, not `{actual}`")]
    WorldMismatch {
        map: String,
        expected: String,
        actual: String,
    },
    #[error("connection `{from}` to `{to}` overrides an existing edge or links the pair twice")]
    ConflictingConnection { from: String, to: String },
}

impl From<WorldError> for LoadError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::DuplicateName { kind, name } => LoadError::DuplicateName { kind, name },
            other => LoadError::World(other),
        }
    }
}

fn unresolved(kind: &'static str, name: &str) -> LoadError {
    LoadError::UnresolvedReference {
        kind,
        name: name.to_string(),
    }
}

/// Saved form of a [`World`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldData {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub terrain_types: Vec<TerrainType>,
    #[serde(default)]
    pub unit_classes: Vec<UnitClassData>,
    #[serde(default)]
    pub unit_types: Vec<UnitTypeData>,
    #[serde(default)]
    pub settlement_types: Vec<SettlementTypeData>,
}

/// Saved form of a [`UnitClass`]; the tables are keyed by terrain name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitClassData {
    pub name: String,
    pub movement_points: i32,
    #[serde(default)]
    pub movement_costs: BTreeMap<String, i32>,
    #[serde(default)]
    pub attacks: BTreeMap<String, i32>,
    #[serde(default)]
    pub defenses: BTreeMap<String, i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTypeData {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// Name of the unit class.
    pub class: String,
    #[serde(default)]
    pub hit_points: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementTypeData {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub gold_per_turn: i32,
    /// Names of the unit types recruitable here.
    #[serde(default)]
    pub recruits: Vec<String>,
}

/// Saved form of a [`Map`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// Name of the world the map belongs to.
    pub world: String,
    #[serde(default)]
    pub map_nodes: Vec<MapNodeData>,
    #[serde(default)]
    pub connections: Vec<ConnectionData>,
    #[serde(default)]
    pub factions: Vec<Faction>,
    #[serde(default)]
    pub settlements: Vec<SettlementData>,
    #[serde(default)]
    pub units: Vec<UnitData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapNodeData {
    pub name: String,
    pub terrain_type: String,
}

/// One edge: `to` is the neighbour of `from` in the forward direction of
/// `axis`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub from: String,
    pub to: String,
    pub axis: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementData {
    pub name: String,
    pub settlement_type: String,
    pub map_node: String,
    /// Name of the owning faction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitData {
    pub name: String,
    pub unit_type: String,
    pub map_node: String,
    /// Movement points left, the class' full allowance when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_points: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// The unit type's hit points when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_points: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_points: Option<i32>,
}

fn resolve_table(
    world: &World,
    table: &BTreeMap<String, i32>,
) -> Result<HashMap<TerrainTypeId, i32>, LoadError> {
    table
        .iter()
        .map(|(name, &value)| {
            world
                .terrain_type_by_name(name)
                .map(|id| (id, value))
                .ok_or_else(|| unresolved("terrain type", name))
        })
        .collect()
}

fn name_table(world: &World, table: &HashMap<TerrainTypeId, i32>) -> BTreeMap<String, i32> {
    table
        .iter()
        .filter_map(|(&id, &value)| world.terrain_type(id).map(|t| (t.name.clone(), value)))
        .collect()
}

impl World {
    /// Build a world from its saved form.
    pub fn from_data(data: WorldData) -> Result<Self, LoadError> {
        let mut world = World::new(data.name, data.display_name);

        for terrain in data.terrain_types {
            world.add_terrain_type(terrain)?;
        }

        for class in data.unit_classes {
            let unit_class = UnitClass {
                movement_costs: resolve_table(&world, &class.movement_costs)?,
                attacks: resolve_table(&world, &class.attacks)?,
                defenses: resolve_table(&world, &class.defenses)?,
                ..UnitClass::new(class.name, class.movement_points)
            };
            world.add_unit_class(unit_class)?;
        }

        for unit_type in data.unit_types {
            let class = world
                .unit_class_by_name(&unit_type.class)
                .ok_or_else(|| unresolved("unit class", &unit_type.class))?;
            world.add_unit_type(UnitType {
                name: unit_type.name,
                display_name: unit_type.display_name,
                class,
                hit_points: unit_type.hit_points,
            })?;
        }

        for data in data.settlement_types {
            let recruits = data
                .recruits
                .iter()
                .map(|name| {
                    world
                        .unit_type_by_name(name)
                        .ok_or_else(|| unresolved("unit type", name))
                })
                .collect::<Result<Vec<_>, _>>()?;
            world.add_settlement_type(SettlementType {
                gold_per_turn: data.gold_per_turn,
                recruits,
                ..SettlementType::new(data.name, data.display_name)
            })?;
        }

        Ok(world)
    }

    /// Saved form of this world.
    pub fn to_data(&self) -> WorldData {
        WorldData {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            terrain_types: self.terrain_types().to_vec(),
            unit_classes: self
                .unit_classes()
                .iter()
                .map(|class| UnitClassData {
                    name: class.name.clone(),
                    movement_points: class.movement_points,
                    movement_costs: name_table(self, &class.movement_costs),
                    attacks: name_table(self, &class.attacks),
                    defenses: name_table(self, &class.defenses),
                })
                .collect(),
            unit_types: self
                .unit_types()
                .iter()
                .map(|unit_type| UnitTypeData {
                    name: unit_type.name.clone(),
                    display_name: unit_type.display_name.clone(),
                    class: self
                        .unit_class(unit_type.class)
                        .map(|c| c.name.clone())
                        .unwrap_or_default(),
                    hit_points: unit_type.hit_points,
                })
                .collect(),
            settlement_types: self
                .settlement_types()
                .iter()
                .map(|settlement_type| SettlementTypeData {
                    name: settlement_type.name.clone(),
                    display_name: settlement_type.display_name.clone(),
                    gold_per_turn: settlement_type.gold_per_turn,
                    recruits: settlement_type
                        .recruits
                        .iter()
                        .filter_map(|&id| self.unit_type(id).map(|t| t.name.clone()))
                        .collect(),
                })
                .collect(),
        }
    }
}

impl Map {
    /// Build a map from its saved form, resolving names against `world`.
    pub fn from_data(world: &World, data: MapData) -> Result<Self, LoadError> {
        if data.world != world.name {
            return Err(LoadError::WorldMismatch {
                map: data.name,
                expected: data.world,
                actual: world.name.clone(),
            });
        }

        let mut map = Map::new(data.name, world);
        if !data.display_name.is_empty() {
            map.display_name = data.display_name;
        }

        for node in data.map_nodes {
            let terrain = world
                .terrain_type_by_name(&node.terrain_type)
                .ok_or_else(|| unresolved("terrain type", &node.terrain_type))?;
            map.add_named_map_node(node.name, terrain)
                .map_err(|err| match err {
                    MapError::DuplicateName(name) => LoadError::DuplicateName {
                        kind: "map node",
                        name,
                    },
                    other => LoadError::Map(other),
                })?;
        }

        let lookup = |map: &Map, name: &str| -> Result<MapNodeId, LoadError> {
            map.node_by_name(name)
                .ok_or_else(|| unresolved("map node", name))
        };

        for connection in &data.connections {
            let from = lookup(&map, &connection.from)?;
            let to = lookup(&map, &connection.to)?;
            let axis: Axis = connection.axis.parse()?;
            let (forward, backward) = axis.directions();

            // Connecting would silently drop whichever edges held these slots
            let taken = |held: Option<MapNodeId>, expected: MapNodeId| {
                held.is_some_and(|n| n != expected)
            };
            let linked_elsewhere = map
                .node(from)
                .and_then(|n| n.direction_to(to))
                .is_some_and(|d| d != forward);
            if linked_elsewhere
                || taken(map.neighbour(from, forward), to)
                || taken(map.neighbour(to, backward), from)
            {
                return Err(LoadError::ConflictingConnection {
                    from: connection.from.clone(),
                    to: connection.to.clone(),
                });
            }
            map.connect(from, to, axis)?;
        }

        for faction in data.factions {
            map.add_faction(faction).map_err(|err| match err {
                MapError::DuplicateFaction(name) => LoadError::DuplicateName {
                    kind: "faction",
                    name,
                },
                other => LoadError::Map(other),
            })?;
        }

        let owner_of = |map: &Map, owner: &Option<String>| -> Result<Option<FactionId>, LoadError> {
            owner
                .as_deref()
                .map(|name| {
                    map.faction_by_name(name)
                        .ok_or_else(|| unresolved("faction", name))
                })
                .transpose()
        };

        let mut settlement_names = HashSet::new();
        for settlement in data.settlements {
            if !settlement_names.insert(settlement.name.clone()) {
                return Err(LoadError::DuplicateName {
                    kind: "settlement",
                    name: settlement.name,
                });
            }
            let settlement_type = world
                .settlement_type_by_name(&settlement.settlement_type)
                .ok_or_else(|| unresolved("settlement type", &settlement.settlement_type))?;
            let position = lookup(&map, &settlement.map_node)?;
            let owner = owner_of(&map, &settlement.owner)?;
            map.create_settlement(world, settlement.name, settlement_type, position, owner)?;
        }

        let mut unit_names = HashSet::new();
        for unit in data.units {
            if !unit_names.insert(unit.name.clone()) {
                return Err(LoadError::DuplicateName {
                    kind: "unit",
                    name: unit.name,
                });
            }
            let unit_type = world
                .unit_type_by_name(&unit.unit_type)
                .ok_or_else(|| unresolved("unit type", &unit.unit_type))?;
            let position = lookup(&map, &unit.map_node)?;
            let owner = owner_of(&map, &unit.owner)?;
            let id = map.create_unit(world, unit.name, unit_type, position)?;
            map.set_unit_owner(id, owner)?;
            if let Some(created) = map.unit_mut(id) {
                if let Some(points) = unit.movement_points {
                    created.movement_points = points;
                }
                if let Some(hit_points) = unit.hit_points {
                    created.hit_points = hit_points;
                }
                if let Some(experience) = unit.experience_points {
                    created.experience_points = experience;
                }
            }
        }

        map.check_consistency()?;
        Ok(map)
    }

    /// Saved form of this map, with names taken from `world`.
    pub fn to_data(&self, world: &World) -> Result<MapData, LoadError> {
        let node_name = |id: MapNodeId| -> Result<String, LoadError> {
            self.node(id)
                .map(|n| n.name().to_string())
                .ok_or(LoadError::Map(MapError::UnknownNode(id)))
        };

        let map_nodes = self
            .nodes()
            .map(|(_, node)| {
                let terrain = world
                    .terrain_type(node.terrain_type())
                    .ok_or_else(|| unresolved("terrain type", &format!("{:?}", node.terrain_type())))?;
                Ok(MapNodeData {
                    name: node.name().to_string(),
                    terrain_type: terrain.name.clone(),
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        let connections = self
            .connections()
            .into_iter()
            .map(|c| {
                Ok(ConnectionData {
                    from: node_name(c.node_a)?,
                    to: node_name(c.node_b)?,
                    axis: c.axis.to_string(),
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        let faction_name = |owner: Option<FactionId>| -> Result<Option<String>, LoadError> {
            owner
                .map(|id| {
                    self.faction(id)
                        .map(|f| f.name.clone())
                        .ok_or(LoadError::Map(MapError::UnknownFaction(id)))
                })
                .transpose()
        };

        let settlements = self
            .settlements()
            .map(|(_, settlement)| {
                let settlement_type = world.settlement_type(settlement.settlement_type).ok_or(
                    LoadError::Map(MapError::UnknownSettlementType(settlement.settlement_type)),
                )?;
                Ok(SettlementData {
                    name: settlement.name.clone(),
                    settlement_type: settlement_type.name.clone(),
                    map_node: node_name(settlement.position)?,
                    owner: faction_name(settlement.owner)?,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        let units = self
            .units()
            .map(|(_, unit)| {
                let unit_type = world
                    .unit_type(unit.unit_type)
                    .ok_or(LoadError::Map(MapError::UnknownUnitType(unit.unit_type)))?;
                Ok(UnitData {
                    name: unit.name.clone(),
                    unit_type: unit_type.name.clone(),
                    map_node: node_name(unit.position)?,
                    movement_points: Some(unit.movement_points),
                    owner: faction_name(unit.owner)?,
                    hit_points: Some(unit.hit_points),
                    experience_points: Some(unit.experience_points),
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        Ok(MapData {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            world: self.world.clone(),
            map_nodes,
            connections,
            factions: self.factions().to_vec(),
            settlements,
            units,
        })
    }
}

/// Read a world from a JSON file.
pub fn load_world(path: &Path) -> Result<World, LoadError> {
    let content = std::fs::read_to_string(path)?;
    let data: WorldData = serde_json::from_str(&content)?;
    let world = World::from_data(data)?;
    tracing::info!(
        world = %world.name,
        terrain_types = world.terrain_types().len(),
        unit_types = world.unit_types().len(),
        path = %path.display(),
        "loaded world"
    );
    Ok(world)
}

/// Write a world to a JSON file.
pub fn save_world(world: &World, path: &Path) -> Result<(), LoadError> {
    let json = serde_json::to_string_pretty(&world.to_data())?;
    std::fs::write(path, json)?;
    tracing::debug!(world = %world.name, path = %path.display(), "saved world");
    Ok(())
}

/// Read a map built for `world` from a JSON file.
pub fn load_map(world: &World, path: &Path) -> Result<Map, LoadError> {
    let content = std::fs::read_to_string(path)?;
    let data: MapData = serde_json::from_str(&content)?;
    let map = Map::from_data(world, data)?;
    tracing::info!(
        map = %map.name,
        nodes = map.node_count(),
        units = map.units().count(),
        path = %path.display(),
        "loaded map"
    );
    Ok(map)
}

/// Write a map to a JSON file.
pub fn save_map(world: &World, map: &Map, path: &Path) -> Result<(), LoadError> {
    let json = serde_json::to_string_pretty(&map.to_data(world)?)?;
    std::fs::write(path, json)?;
    tracing::debug!(map = %map.name, path = %path.display(), "saved map");
    Ok(())
}
