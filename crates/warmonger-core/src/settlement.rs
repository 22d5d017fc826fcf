//! Settlements and the factions owning them.

use crate::map::MapNodeId;
use crate::unit::UnitTypeId;
use serde::{Deserialize, Serialize};

/// Index of a faction inside its map.
pub type FactionId = u8;

/// Unique identifier for a settlement on a map.
pub type SettlementId = u64;

/// Index of a settlement type inside its world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SettlementTypeId(pub u16);

/// A kind of settlement defined by the world rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementType {
    /// Unique name.
    pub name: String,
    pub display_name: String,
    /// Income of the owner each turn.
    pub gold_per_turn: i32,
    /// Unit types that can be recruited here.
    pub recruits: Vec<UnitTypeId>,
}

impl SettlementType {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            gold_per_turn: 0,
            recruits: Vec::new(),
        }
    }

    /// Check if units of the given type can be recruited here.
    pub fn can_recruit(&self, unit_type: UnitTypeId) -> bool {
        self.recruits.contains(&unit_type)
    }
}

/// A side in the game. Units and settlements may belong to one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faction {
    /// Unique name on the map.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

impl Faction {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
        }
    }
}

/// A settlement standing on a map node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Unique name on the map.
    pub name: String,
    pub settlement_type: SettlementTypeId,
    /// The node the settlement is built on.
    pub position: MapNodeId,
    /// Owning faction, `None` while unclaimed.
    pub owner: Option<FactionId>,
}

impl Settlement {
    pub fn is_owned_by(&self, faction: FactionId) -> bool {
        self.owner == Some(faction)
    }
}
