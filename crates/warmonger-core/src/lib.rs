//! Warmonger Core Library
//!
//! This crate contains the map model of Warmonger, a turn based strategy game
//! played on a hexagonal grid. The map is a graph of nodes, each with up to
//! six neighbours; there are no coordinates.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: This crate is purely game logic
//! - **Deterministic**: Same inputs always produce same outputs
//! - **Symmetric edges**: Every link between two nodes is stored on both ends
//! - **Serializable**: Worlds and maps can be saved and loaded as JSON

// Core modules
pub mod hex;
pub mod map;
pub mod terrain;

// World rules, units and settlements
pub mod settlement;
pub mod unit;
pub mod world;

// Map generation
pub mod mapgen;
pub mod settings;

// Movement
pub mod pathfinding;

// Saved data
pub mod serialization;

// Re-exports for convenience
pub use hex::{Axis, Direction, HexError};
pub use map::{Map, MapError, MapNode, MapNodeConnection, MapNodeId};
pub use mapgen::{generate_map_nodes, MapGenError, MapGenerator, SeededRng};
pub use pathfinding::{
    edge_cost, find_path, find_reachable, move_unit, reachable_nodes, reachable_nodes_for_unit,
    shortest_path, shortest_path_for_unit, PathError, PathResult,
};
pub use serialization::{load_map, load_world, save_map, save_world, LoadError, MapData, WorldData};
pub use settlement::{Faction, FactionId, Settlement, SettlementId, SettlementType, SettlementTypeId};
pub use settings::{MapSettings, MapSize, SettingsError};
pub use terrain::{TerrainType, TerrainTypeId};
pub use unit::{MovementCost, Unit, UnitClass, UnitClassId, UnitId, UnitType, UnitTypeId};
pub use world::{World, WorldError};
