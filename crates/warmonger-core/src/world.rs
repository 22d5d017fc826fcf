//! World rules: the terrain types, unit classes, unit types and settlement
//! types a map uses.
//!
//! Entities are stored in insertion order and addressed by small typed
//! indices. A name index per kind resolves references coming from saved data.

use std::collections::HashMap;

use crate::settlement::{SettlementType, SettlementTypeId};
use crate::terrain::{TerrainType, TerrainTypeId};
use crate::unit::{UnitClass, UnitClassId, UnitType, UnitTypeId};

/// Name to index lookup that refuses duplicates.
#[derive(Clone, Debug, Default)]
struct NameIndex {
    indices: HashMap<String, u16>,
}

impl NameIndex {
    fn get(&self, name: &str) -> Option<u16> {
        self.indices.get(name).copied()
    }

    /// Register a name, returns false if it is already taken.
    fn insert(&mut self, name: &str, index: u16) -> bool {
        if self.indices.contains_key(name) {
            return false;
        }
        self.indices.insert(name.to_string(), index);
        true
    }
}

/// Errors from building a world.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("duplicate {kind} name `{name}`")]
    DuplicateName { kind: &'static str, name: String },
    #[error("too many {0} entries")]
    TooMany(&'static str),
    #[error("unit type `{unit_type}` refers to unknown unit class")]
    UnknownUnitClass { unit_type: String },
    #[error("settlement type `{settlement_type}` recruits unknown unit type")]
    UnknownRecruit { settlement_type: String },
}

/// The rule set maps are built against.
#[derive(Clone, Debug, Default)]
pub struct World {
    /// Unique name of the world.
    pub name: String,
    pub display_name: String,
    terrain_types: Vec<TerrainType>,
    unit_classes: Vec<UnitClass>,
    unit_types: Vec<UnitType>,
    settlement_types: Vec<SettlementType>,
    terrain_names: NameIndex,
    unit_class_names: NameIndex,
    unit_type_names: NameIndex,
    settlement_type_names: NameIndex,
}

fn next_index(len: usize, kind: &'static str) -> Result<u16, WorldError> {
    u16::try_from(len).map_err(|_| WorldError::TooMany(kind))
}

impl World {
    /// Create an empty world.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    pub fn add_terrain_type(&mut self, terrain: TerrainType) -> Result<TerrainTypeId, WorldError> {
        let index = next_index(self.terrain_types.len(), "terrain type")?;
        if !self.terrain_names.insert(&terrain.name, index) {
            return Err(WorldError::DuplicateName {
                kind: "terrain type",
                name: terrain.name,
            });
        }
        self.terrain_types.push(terrain);
        Ok(TerrainTypeId(index))
    }

    pub fn add_unit_class(&mut self, class: UnitClass) -> Result<UnitClassId, WorldError> {
        let index = next_index(self.unit_classes.len(), "unit class")?;
        if !self.unit_class_names.insert(&class.name, index) {
            return Err(WorldError::DuplicateName {
                kind: "unit class",
                name: class.name,
            });
        }
        self.unit_classes.push(class);
        Ok(UnitClassId(index))
    }

    /// Add a unit type; its class must already be registered.
    pub fn add_unit_type(&mut self, unit_type: UnitType) -> Result<UnitTypeId, WorldError> {
        if self.unit_class(unit_type.class).is_none() {
            return Err(WorldError::UnknownUnitClass {
                unit_type: unit_type.name,
            });
        }
        let index = next_index(self.unit_types.len(), "unit type")?;
        if !self.unit_type_names.insert(&unit_type.name, index) {
            return Err(WorldError::DuplicateName {
                kind: "unit type",
                name: unit_type.name,
            });
        }
        self.unit_types.push(unit_type);
        Ok(UnitTypeId(index))
    }

    /// Add a settlement type; every recruit must already be registered.
    pub fn add_settlement_type(
        &mut self,
        settlement_type: SettlementType,
    ) -> Result<SettlementTypeId, WorldError> {
        if settlement_type
            .recruits
            .iter()
            .any(|&recruit| self.unit_type(recruit).is_none())
        {
            return Err(WorldError::UnknownRecruit {
                settlement_type: settlement_type.name,
            });
        }
        let index = next_index(self.settlement_types.len(), "settlement type")?;
        if !self.settlement_type_names.insert(&settlement_type.name, index) {
            return Err(WorldError::DuplicateName {
                kind: "settlement type",
                name: settlement_type.name,
            });
        }
        self.settlement_types.push(settlement_type);
        Ok(SettlementTypeId(index))
    }

    pub fn terrain_type(&self, id: TerrainTypeId) -> Option<&TerrainType> {
        self.terrain_types.get(id.index())
    }

    pub fn terrain_type_by_name(&self, name: &str) -> Option<TerrainTypeId> {
        self.terrain_names.get(name).map(TerrainTypeId)
    }

    /// All terrain ids in declaration order.
    pub fn terrain_type_ids(&self) -> impl Iterator<Item = TerrainTypeId> + '_ {
        (0..self.terrain_types.len()).map(|i| TerrainTypeId(i as u16))
    }

    pub fn terrain_types(&self) -> &[TerrainType] {
        &self.terrain_types
    }

    pub fn unit_class(&self, id: UnitClassId) -> Option<&UnitClass> {
        self.unit_classes.get(id.0 as usize)
    }

    pub fn unit_class_mut(&mut self, id: UnitClassId) -> Option<&mut UnitClass> {
        self.unit_classes.get_mut(id.0 as usize)
    }

    pub fn unit_class_by_name(&self, name: &str) -> Option<UnitClassId> {
        self.unit_class_names.get(name).map(UnitClassId)
    }

    pub fn unit_classes(&self) -> &[UnitClass] {
        &self.unit_classes
    }

    pub fn unit_type(&self, id: UnitTypeId) -> Option<&UnitType> {
        self.unit_types.get(id.0 as usize)
    }

    pub fn unit_type_by_name(&self, name: &str) -> Option<UnitTypeId> {
        self.unit_type_names.get(name).map(UnitTypeId)
    }

    pub fn unit_types(&self) -> &[UnitType] {
        &self.unit_types
    }

    pub fn settlement_type(&self, id: SettlementTypeId) -> Option<&SettlementType> {
        self.settlement_types.get(id.0 as usize)
    }

    pub fn settlement_type_by_name(&self, name: &str) -> Option<SettlementTypeId> {
        self.settlement_type_names.get(name).map(SettlementTypeId)
    }

    pub fn settlement_types(&self) -> &[SettlementType] {
        &self.settlement_types
    }

    /// Class of a unit type, the one the path searches care about.
    pub fn class_of(&self, unit_type: UnitTypeId) -> Option<&UnitClass> {
        self.unit_type(unit_type)
            .and_then(|t| self.unit_class(t.class))
    }
}
