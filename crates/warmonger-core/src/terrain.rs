//! Terrain types defined by the world rules.
//!
//! Terrain is data, not code: a world declares the terrain types it uses and
//! map nodes refer to them through [`TerrainTypeId`].

use serde::{Deserialize, Serialize};

/// Index of a terrain type inside its [`World`](crate::world::World).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainTypeId(pub u16);

impl TerrainTypeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A kind of ground a map node can be made of.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainType {
    /// Unique name, used as the reference in saved data.
    pub name: String,
    /// Human readable name.
    pub display_name: String,
}

impl TerrainType {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
        }
    }
}
