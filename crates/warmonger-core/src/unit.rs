//! Units, unit types and unit classes.
//!
//! A [`UnitClass`] carries the per-terrain movement, attack and defense
//! tables. Unit types pick a class, and units on the map are instances of a
//! unit type.

use std::collections::HashMap;

use crate::map::MapNodeId;
use crate::settlement::FactionId;
use crate::terrain::TerrainTypeId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a unit on a map.
pub type UnitId = u64;

/// Index of a unit class inside its world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitClassId(pub u16);

/// Index of a unit type inside its world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitTypeId(pub u16);

/// Source of movement costs for the path searches.
///
/// A cost of zero or less means the terrain cannot be entered.
pub trait MovementCost {
    fn movement_cost(&self, terrain: TerrainTypeId) -> i32;
}

impl<F> MovementCost for F
where
    F: Fn(TerrainTypeId) -> i32,
{
    fn movement_cost(&self, terrain: TerrainTypeId) -> i32 {
        self(terrain)
    }
}

/// Movement and combat characteristics shared by several unit types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitClass {
    /// Unique name.
    pub name: String,
    /// Movement points available each turn.
    pub movement_points: i32,
    /// Cost of entering each terrain type.
    pub movement_costs: HashMap<TerrainTypeId, i32>,
    /// Attack modifier per terrain type.
    pub attacks: HashMap<TerrainTypeId, i32>,
    /// Defense modifier per terrain type.
    pub defenses: HashMap<TerrainTypeId, i32>,
}

impl UnitClass {
    /// Create a class with empty terrain tables.
    pub fn new(name: impl Into<String>, movement_points: i32) -> Self {
        Self {
            name: name.into(),
            movement_points,
            ..Default::default()
        }
    }

    /// Builder-style helper to set one movement cost.
    pub fn with_movement_cost(mut self, terrain: TerrainTypeId, cost: i32) -> Self {
        self.movement_costs.insert(terrain, cost);
        self
    }

    /// Check whether units of this class can enter the terrain at all.
    pub fn can_enter(&self, terrain: TerrainTypeId) -> bool {
        self.movement_cost(terrain) > 0
    }

    /// Attack modifier on the terrain, 0 when not listed.
    pub fn attack(&self, terrain: TerrainTypeId) -> i32 {
        self.attacks.get(&terrain).copied().unwrap_or(0)
    }

    /// Defense modifier on the terrain, 0 when not listed.
    pub fn defense(&self, terrain: TerrainTypeId) -> i32 {
        self.defenses.get(&terrain).copied().unwrap_or(0)
    }
}

impl MovementCost for UnitClass {
    /// Terrain missing from the table is impassable.
    fn movement_cost(&self, terrain: TerrainTypeId) -> i32 {
        self.movement_costs.get(&terrain).copied().unwrap_or(0)
    }
}

/// A recruitable kind of unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitType {
    pub name: String,
    pub display_name: String,
    pub class: UnitClassId,
    pub hit_points: i32,
}

/// A unit standing on a map node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    /// Unique name on the map.
    pub name: String,
    pub unit_type: UnitTypeId,
    /// The node the unit stands on.
    pub position: MapNodeId,
    /// Movement points left this turn.
    pub movement_points: i32,
    /// Owning faction, `None` for neutral units.
    pub owner: Option<FactionId>,
    pub hit_points: i32,
    pub experience_points: i32,
}

impl Unit {
    /// Spend movement points, never going below zero.
    pub fn use_movement(&mut self, cost: i32) {
        self.movement_points = (self.movement_points - cost).max(0);
    }

    /// Check if the unit has any movement left.
    pub fn can_move(&self) -> bool {
        self.movement_points > 0
    }
}
