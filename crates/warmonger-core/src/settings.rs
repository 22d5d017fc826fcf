//! Map generation settings.

use std::path::Path;

use crate::serialization::LoadError;
use serde::{Deserialize, Serialize};

/// Largest radius accepted by [`MapSettings::validate`].
pub const MAX_RADIUS: u32 = 64;

/// Map size presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MapSize {
    Tiny,
    Small,
    #[default]
    Standard,
    Large,
    Huge,
}

impl MapSize {
    /// Number of rings for this map size.
    pub const fn radius(&self) -> u32 {
        match self {
            MapSize::Tiny => 4,
            MapSize::Small => 8,
            MapSize::Standard => 12,
            MapSize::Large => 16,
            MapSize::Huge => 24,
        }
    }

    /// Number of nodes a map of this size has.
    pub const fn node_count(&self) -> u32 {
        let r = self.radius();
        1 + 3 * r * (r - 1)
    }

    /// Get all map size variants.
    pub const fn all() -> &'static [MapSize] {
        &[
            MapSize::Tiny,
            MapSize::Small,
            MapSize::Standard,
            MapSize::Large,
            MapSize::Huge,
        ]
    }
}

/// Configuration for generating a map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapSettings {
    /// Unique name of the map.
    pub name: String,
    /// Human readable name, defaults to the name.
    pub display_name: Option<String>,
    /// Map size preset.
    pub map_size: MapSize,
    /// Explicit radius, takes precedence over the preset.
    pub radius: Option<u32>,
    /// Seed for terrain assignment.
    pub seed: u64,
    /// Terrain type names to pick from (empty = all of the world's).
    pub terrain_types: Vec<String>,
}

impl MapSettings {
    /// Default settings for a map with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            map_size: MapSize::Standard,
            radius: None,
            seed: 0,
            terrain_types: Vec::new(),
        }
    }

    /// Effective number of rings.
    pub fn radius(&self) -> u32 {
        self.radius.unwrap_or_else(|| self.map_size.radius())
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.name.is_empty() {
            return Err(SettingsError::EmptyName);
        }
        if self.name.len() > 64 {
            return Err(SettingsError::NameTooLong);
        }
        match self.radius() {
            0 => Err(SettingsError::ZeroRadius),
            r if r > MAX_RADIUS => Err(SettingsError::RadiusTooLarge(r)),
            _ => Ok(()),
        }
    }

    /// Read and validate settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        let settings: MapSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self::new("map")
    }
}

/// Errors from invalid map settings.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("map name cannot be empty")]
    EmptyName,
    #[error("map name must be 64 characters or less")]
    NameTooLong,
    #[error("map radius must be at least 1")]
    ZeroRadius,
    #[error("map radius {0} exceeds the maximum of 64")]
    RadiusTooLarge(u32),
}
