//! Integration tests for the Warmonger map graph.
//!
//! These tests exercise the public API end to end:
//! - Grid generation and its structural guarantees
//! - Edge symmetry under arbitrary editing
//! - Pathfinding and reachability on generated maps
//! - Unit movement across turns
//! - Save/load of worlds and maps

use std::collections::{HashMap, HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use warmonger_core::{
    find_reachable, generate_map_nodes, load_map, load_world, move_unit, reachable_nodes,
    reachable_nodes_for_unit, save_map, save_world, shortest_path, Axis, Direction, Faction, Map,
    MapError, MapGenerator, MapNodeId, MapSettings, PathError, SettlementType, TerrainType,
    TerrainTypeId, UnitClass, UnitType, World,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// World with cheap grass, expensive forest and impassable water.
fn create_test_world() -> World {
    let mut world = World::new("classic", "Classic");
    let grass = world
        .add_terrain_type(TerrainType::new("grass", "Grassland"))
        .unwrap();
    let forest = world
        .add_terrain_type(TerrainType::new("forest", "Forest"))
        .unwrap();
    let water = world
        .add_terrain_type(TerrainType::new("water", "Water"))
        .unwrap();

    let infantry = world
        .add_unit_class(
            UnitClass::new("infantry", 3)
                .with_movement_cost(grass, 1)
                .with_movement_cost(forest, 2)
                .with_movement_cost(water, 0),
        )
        .unwrap();
    world
        .add_unit_type(UnitType {
            name: "spearman".to_string(),
            display_name: "Spearman".to_string(),
            class: infantry,
            hit_points: 10,
        })
        .unwrap();
    world
        .add_settlement_type(SettlementType::new("village", "Village"))
        .unwrap();
    world
}

fn grass(world: &World) -> TerrainTypeId {
    world.terrain_type_by_name("grass").unwrap()
}

fn infantry(world: &World) -> &UnitClass {
    world
        .unit_class(world.unit_class_by_name("infantry").unwrap())
        .unwrap()
}

/// Uniform grass grid with its nodes, center first.
fn create_grid(world: &World, radius: u32) -> (Map, Vec<MapNodeId>) {
    let mut map = Map::new("grid", world);
    let nodes = generate_map_nodes(&mut map, radius, grass(world));
    (map, nodes)
}

/// Breadth first hop counts from `start`.
fn hop_distances(map: &Map, start: MapNodeId) -> HashMap<MapNodeId, usize> {
    let mut distances = HashMap::from([(start, 0)]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let next = distances[&node] + 1;
        for (_, neighbour) in map.node(node).unwrap().neighbours() {
            distances.entry(neighbour).or_insert_with(|| {
                queue.push_back(neighbour);
                next
            });
        }
    }
    distances
}

/// Every node's neighbours, by name, keyed by node name.
fn named_adjacency(map: &Map) -> HashMap<String, Vec<Option<String>>> {
    map.nodes()
        .map(|(_, node)| {
            let neighbours = Direction::ALL
                .into_iter()
                .map(|d| {
                    node.neighbour(d)
                        .map(|n| map.node(n).unwrap().name().to_string())
                })
                .collect();
            (node.name().to_string(), neighbours)
        })
        .collect()
}

// =============================================================================
// 1. Grid Generation
// =============================================================================

mod generation {
    use super::*;

    #[test]
    fn test_node_and_edge_counts() {
        let world = create_test_world();
        for radius in 1..=7u32 {
            let (map, nodes) = create_grid(&world, radius);
            let n = (radius - 1) as usize;

            assert_eq!(nodes.len(), 1 + 3 * n * (n + 1), "radius {}", radius);
            assert_eq!(map.node_count(), nodes.len());
            assert_eq!(map.directed_edge_count(), 6 * (3 * n * n + n), "radius {}", radius);
        }
    }

    #[test]
    fn test_generated_edges_are_symmetric() {
        let world = create_test_world();
        let (map, _) = create_grid(&world, 6);

        assert!(map.check_consistency().is_ok());
        for (id, node) in map.nodes() {
            for (direction, neighbour) in node.neighbours() {
                assert_eq!(map.neighbour(neighbour, direction.opposite()), Some(id));
            }
        }
    }

    #[test]
    fn test_neighbours_of_a_node_touch_each_other() {
        let world = create_test_world();
        let (map, _) = create_grid(&world, 5);

        for (_, node) in map.nodes() {
            for direction in Direction::ALL {
                let cw = direction.clockwise();
                let (Some(a), Some(b)) = (node.neighbour(direction), node.neighbour(cw)) else {
                    continue;
                };
                let towards = direction.connecting_direction(cw).unwrap();
                assert_eq!(map.neighbour(a, towards), Some(b));
            }
        }
    }

    #[test]
    fn test_interior_and_edge_nodes() {
        let world = create_test_world();
        for radius in 2..=6u32 {
            let (map, nodes) = create_grid(&world, radius);
            let rings = hop_distances(&map, nodes[0]);
            let outer = (radius - 1) as usize;

            assert_eq!(map.edge_nodes().count(), 6 * outer);
            for (id, node) in map.nodes() {
                assert_eq!(node.is_edge_node(), rings[&id] == outer);
                if rings[&id] < outer {
                    assert_eq!(node.neighbour_count(), 6);
                }
            }
        }
    }

    #[test]
    fn test_generator_from_settings() {
        let world = create_test_world();
        let settings = MapSettings {
            radius: Some(4),
            seed: 99,
            ..MapSettings::new("skirmish")
        };

        let map = MapGenerator::new(&world, settings).generate().unwrap();
        assert_eq!(map.node_count(), 37);
        assert_eq!(map.world, "classic");
        assert!(map.check_consistency().is_ok());
        let terrain: HashSet<TerrainTypeId> = map.nodes().map(|(_, n)| n.terrain_type()).collect();
        assert!(terrain.iter().all(|&t| world.terrain_type(t).is_some()));
    }
}

// =============================================================================
// 2. Edge Symmetry Under Editing
// =============================================================================

mod editing {
    use super::*;

    #[test]
    fn test_random_removals_keep_symmetry() {
        let world = create_test_world();
        let (mut map, mut nodes) = create_grid(&world, 6);
        let mut rng = StdRng::seed_from_u64(7);
        nodes.shuffle(&mut rng);

        for removed in nodes.iter().take(40) {
            let former: Vec<MapNodeId> = map
                .node(*removed)
                .unwrap()
                .neighbours()
                .map(|(_, n)| n)
                .collect();

            map.remove_map_node(*removed).unwrap();
            assert!(!map.contains_node(*removed));
            assert!(map.check_consistency().is_ok());
            for neighbour in former {
                assert!(map.node(neighbour).unwrap().direction_to(*removed).is_none());
            }
        }
        assert_eq!(map.node_count(), 91 - 40);
    }

    #[test]
    fn test_random_rewiring_keeps_symmetry() {
        let world = create_test_world();
        let (mut map, nodes) = create_grid(&world, 4);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let a = nodes[rng.gen_range(0..nodes.len())];
            let b = nodes[rng.gen_range(0..nodes.len())];
            let direction = Direction::ALL[rng.gen_range(0..6)];

            if rng.gen_bool(0.3) {
                map.disconnect(a, direction).unwrap();
            } else if a != b {
                match map.node(a).unwrap().direction_to(b) {
                    // Already touching on another side
                    Some(existing) if existing != direction => {
                        assert_eq!(
                            map.connect_towards(a, direction, b),
                            Err(MapError::AlreadyNeighbours {
                                node: a,
                                neighbour: b,
                                direction: existing
                            })
                        );
                        assert_eq!(map.neighbour(a, existing), Some(b));
                    }
                    _ => {
                        map.connect_towards(a, direction, b).unwrap();
                        assert_eq!(map.neighbour(a, direction), Some(b));
                        assert_eq!(map.neighbour(b, direction.opposite()), Some(a));
                    }
                }
            }
            assert!(map.check_consistency().is_ok());
        }
    }

    #[test]
    fn test_connections_are_canonical() {
        let world = create_test_world();
        let (map, _) = create_grid(&world, 4);
        let connections = map.connections();

        assert_eq!(connections.len() * 2, map.directed_edge_count());
        for connection in &connections {
            assert_eq!(
                map.neighbour(connection.node_a, connection.axis.forward()),
                Some(connection.node_b)
            );
        }
        for axis in Axis::ALL {
            assert!(connections.iter().any(|c| c.axis == axis));
        }
    }

    #[test]
    fn test_create_map_node_on_border() {
        let world = create_test_world();
        let (mut map, nodes) = create_grid(&world, 2);
        let center = nodes[0];
        let west = map.neighbour(center, Direction::West).unwrap();
        let north_west = map.neighbour(center, Direction::NorthWest).unwrap();

        // The new node sits west of north_west, south west of it is `west`
        let node = map
            .create_map_node(
                grass(&world),
                &[(Direction::East, north_west), (Direction::SouthEast, west)],
            )
            .unwrap();
        assert_eq!(map.neighbour(north_west, Direction::West), Some(node));
        assert_eq!(map.neighbour(west, Direction::NorthWest), Some(node));
        assert!(map.check_consistency().is_ok());
    }
}

// =============================================================================
// 3. Pathfinding and Reachability
// =============================================================================

mod movement {
    use super::*;

    #[test]
    fn test_uniform_paths_follow_hop_distance() {
        let world = create_test_world();
        let (map, nodes) = create_grid(&world, 5);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..30 {
            let source = *nodes.choose(&mut rng).unwrap();
            let target = *nodes.choose(&mut rng).unwrap();
            let hops = hop_distances(&map, source);

            let path = shortest_path(&map, infantry(&world), source, target);
            assert_eq!(path.first(), Some(&source));
            assert_eq!(path.last(), Some(&target));
            assert_eq!(path.len() - 1, hops[&target]);
        }
    }

    #[test]
    fn test_reachability_matches_distance() {
        let world = create_test_world();
        let forest = world.terrain_type_by_name("forest").unwrap();
        let (mut map, nodes) = create_grid(&world, 5);
        let mut rng = StdRng::seed_from_u64(11);
        for &node in &nodes {
            if rng.gen_bool(0.4) {
                map.change_terrain_type(node, forest).unwrap();
            }
        }

        let start = nodes[0];
        let budget = 4.0;
        let costs = find_reachable(&map, infantry(&world), start, 1e9);
        let reachable = reachable_nodes(&map, infantry(&world), start, budget);

        for &node in &nodes {
            if node == start {
                assert!(!reachable.contains(&node));
                continue;
            }
            assert_eq!(reachable.contains(&node), costs[&node] <= budget, "{}", node);
        }
    }

    #[test]
    fn test_water_blocks_paths() {
        let world = create_test_world();
        let water = world.terrain_type_by_name("water").unwrap();
        let (mut map, nodes) = create_grid(&world, 4);
        let center = nodes[0];
        for direction in Direction::ALL {
            let neighbour = map.neighbour(center, direction).unwrap();
            map.change_terrain_type(neighbour, water).unwrap();
        }

        let outer = *nodes.last().unwrap();
        assert!(shortest_path(&map, infantry(&world), outer, center).is_empty());
        assert!(reachable_nodes(&map, infantry(&world), center, 100.0).is_empty());
    }

    #[test]
    fn test_unit_moves_across_turns() {
        let world = create_test_world();
        let spearman = world.unit_type_by_name("spearman").unwrap();
        let (mut map, nodes) = create_grid(&world, 6);
        let unit = map.create_unit(&world, "scout", spearman, nodes[0]).unwrap();
        let target = map.edge_nodes().next().unwrap();

        // Five steps away, three movement points per turn
        assert!(!reachable_nodes_for_unit(&world, &map, unit)
            .unwrap()
            .contains(&target));
        assert!(matches!(
            move_unit(&world, &mut map, unit, target),
            Err(PathError::InsufficientMovement { required: 5, available: 3 })
        ));

        let path = shortest_path(&map, infantry(&world), nodes[0], target);
        move_unit(&world, &mut map, unit, path[3]).unwrap();
        assert_eq!(map.unit(unit).unwrap().movement_points, 0);

        map.reset_movement_points(&world);
        move_unit(&world, &mut map, unit, target).unwrap();
        assert_eq!(map.unit(unit).unwrap().position, target);
        assert_eq!(map.unit(unit).unwrap().movement_points, 1);
        assert_eq!(map.unit_at(target), Some(unit));
    }
}

// =============================================================================
// 4. Save/Load
// =============================================================================

mod persistence {
    use super::*;

    #[test]
    fn test_generated_map_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let world_path = dir.path().join("world.json");
        let map_path = dir.path().join("map.json");

        let world = create_test_world();
        let settings = MapSettings {
            radius: Some(5),
            seed: 2024,
            ..MapSettings::new("campaign")
        };
        let mut map = MapGenerator::new(&world, settings).generate().unwrap();
        let spearman = world.unit_type_by_name("spearman").unwrap();
        let center = map.node_by_name("mapNode0").unwrap();
        map.change_terrain_type(center, grass(&world)).unwrap();
        let hero = map.create_unit(&world, "hero", spearman, center).unwrap();
        let red = map.add_faction(Faction::new("red", "Red")).unwrap();
        map.set_unit_owner(hero, Some(red)).unwrap();
        let village = world.settlement_type_by_name("village").unwrap();
        let site = map.node_by_name("mapNode1").unwrap();
        map.create_settlement(&world, "capital", village, site, Some(red))
            .unwrap();

        save_world(&world, &world_path).unwrap();
        save_map(&world, &map, &map_path).unwrap();

        let loaded_world = load_world(&world_path).unwrap();
        let loaded = load_map(&loaded_world, &map_path).unwrap();

        assert_eq!(loaded.name, "campaign");
        assert_eq!(loaded.node_count(), map.node_count());
        assert_eq!(loaded.connections().len(), map.connections().len());
        assert_eq!(named_adjacency(&loaded), named_adjacency(&map));

        for (_, node) in map.nodes() {
            let other = loaded.node(loaded.node_by_name(node.name()).unwrap()).unwrap();
            let original = world.terrain_type(node.terrain_type()).unwrap();
            let reloaded = loaded_world.terrain_type(other.terrain_type()).unwrap();
            assert_eq!(original.name, reloaded.name);
        }

        let red = loaded.faction_by_name("red").unwrap();
        let hero = loaded.unit_at(loaded.node_by_name("mapNode0").unwrap()).unwrap();
        let unit = loaded.unit(hero).unwrap();
        assert_eq!(unit.name, "hero");
        assert_eq!(unit.owner, Some(red));
        assert_eq!(unit.hit_points, 10);

        let capital = loaded
            .settlement_at(loaded.node_by_name("mapNode1").unwrap())
            .unwrap();
        let settlement = loaded.settlement(capital).unwrap();
        assert_eq!(settlement.name, "capital");
        assert!(settlement.is_owned_by(red));
    }

    #[test]
    fn test_edited_map_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        let world = create_test_world();
        let (mut map, nodes) = create_grid(&world, 3);
        map.remove_map_node(nodes[0]).unwrap();
        map.disconnect(nodes[1], Direction::ALL[0]).unwrap();

        save_map(&world, &map, &path).unwrap();
        let loaded = load_map(&world, &path).unwrap();

        assert_eq!(named_adjacency(&loaded), named_adjacency(&map));
        assert!(loaded.node_by_name("mapNode0").is_none());
    }
}
