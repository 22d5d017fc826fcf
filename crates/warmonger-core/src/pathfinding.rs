//! Dijkstra pathfinding and movement reachability on the map graph.
//!
//! Crossing the edge between two nodes costs the average of the movement
//! costs of their terrain types. If either terrain is impassable for the
//! unit class the edge cannot be used at all.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::map::{Map, MapError, MapNodeId};
use crate::unit::{MovementCost, Unit, UnitClass, UnitId, UnitTypeId};
use crate::world::World;
use thiserror::Error;

/// Cost of an edge that cannot be crossed.
pub const IMPASSABLE: f64 = f64::INFINITY;

/// Result of a pathfinding operation.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// The path from start to goal (inclusive).
    pub path: Vec<MapNodeId>,
    /// Total movement cost of the path.
    pub total_cost: f64,
}

/// Errors from unit movement queries.
///
/// Not finding a path is only an error when actually moving; the plain
/// queries answer with an empty result instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),
    #[error("unit type {0:?} has no unit class in the world")]
    UnknownUnitType(UnitTypeId),
    #[error("map node {0} does not exist")]
    UnknownNode(MapNodeId),
    #[error("no path from {from} to {to}")]
    NoPath { from: MapNodeId, to: MapNodeId },
    #[error("move needs {required} movement points but only {available} are left")]
    InsufficientMovement { required: i32, available: i32 },
    #[error("map node {0} is occupied")]
    NodeOccupied(MapNodeId),
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Entry in the search frontier.
#[derive(Clone, Copy, PartialEq)]
struct PathNode {
    node: MapNodeId,
    cost: f64,
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (lowest cost first)
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cost of moving between two adjacent nodes.
///
/// Returns [`IMPASSABLE`] when either terrain has a cost of zero or less, or
/// when either node does not exist.
pub fn edge_cost<C>(map: &Map, costs: &C, a: MapNodeId, b: MapNodeId) -> f64
where
    C: MovementCost + ?Sized,
{
    let (Some(node_a), Some(node_b)) = (map.node(a), map.node(b)) else {
        return IMPASSABLE;
    };

    let cost_a = costs.movement_cost(node_a.terrain_type());
    let cost_b = costs.movement_cost(node_b.terrain_type());
    if cost_a <= 0 || cost_b <= 0 {
        return IMPASSABLE;
    }

    (f64::from(cost_a) + f64::from(cost_b)) / 2.0
}

/// Find the cheapest path between two nodes.
///
/// Returns `None` if no path exists or either node is missing.
pub fn find_path<C>(
    map: &Map,
    costs: &C,
    source: MapNodeId,
    target: MapNodeId,
) -> Option<PathResult>
where
    C: MovementCost + ?Sized,
{
    if !map.contains_node(source) || !map.contains_node(target) {
        tracing::warn!(%source, %target, "path requested for missing map node");
        return None;
    }

    if source == target {
        return Some(PathResult {
            path: vec![source],
            total_cost: 0.0,
        });
    }

    let mut distances: HashMap<MapNodeId, f64> = HashMap::new();
    let mut previous: HashMap<MapNodeId, MapNodeId> = HashMap::new();
    let mut settled: HashSet<MapNodeId> = HashSet::new();
    let mut frontier = BinaryHeap::new();

    distances.insert(source, 0.0);
    frontier.push(PathNode {
        node: source,
        cost: 0.0,
    });

    // Only finite distances are ever queued, so an empty frontier means the
    // rest of the map is unreachable
    while let Some(PathNode { node, cost }) = frontier.pop() {
        if !settled.insert(node) {
            continue;
        }
        if node == target {
            break;
        }

        let Some(current) = map.node(node) else {
            continue;
        };

        for (_, neighbour) in current.neighbours() {
            if settled.contains(&neighbour) {
                continue;
            }

            let weight = edge_cost(map, costs, node, neighbour);
            if weight == IMPASSABLE {
                continue;
            }

            let candidate = cost + weight;
            if candidate < *distances.get(&neighbour).unwrap_or(&IMPASSABLE) {
                distances.insert(neighbour, candidate);
                previous.insert(neighbour, node);
                frontier.push(PathNode {
                    node: neighbour,
                    cost: candidate,
                });
            }
        }
    }

    let path = reconstruct_path(&previous, source, target);
    if path.first() != Some(&source) || path.last() != Some(&target) {
        tracing::debug!(%source, %target, "no path found");
        return None;
    }

    let total_cost = distances.get(&target).copied().unwrap_or(IMPASSABLE);
    tracing::debug!(%source, %target, steps = path.len() - 1, total_cost, "path found");
    Some(PathResult { path, total_cost })
}

/// Shortest path from `source` to `target`, both included.
///
/// An empty path means the target cannot be reached.
pub fn shortest_path<C>(map: &Map, costs: &C, source: MapNodeId, target: MapNodeId) -> Vec<MapNodeId>
where
    C: MovementCost + ?Sized,
{
    find_path(map, costs, source, target)
        .map(|result| result.path)
        .unwrap_or_default()
}

/// Follow back-pointers from the target; stops early if the chain breaks.
fn reconstruct_path(
    previous: &HashMap<MapNodeId, MapNodeId>,
    source: MapNodeId,
    target: MapNodeId,
) -> Vec<MapNodeId> {
    let mut path = vec![target];
    let mut current = target;

    while current != source {
        match previous.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }

    path.reverse();
    path
}

/// Total cost of walking along `path`, [`IMPASSABLE`] if any step is.
pub fn path_cost<C>(map: &Map, costs: &C, path: &[MapNodeId]) -> f64
where
    C: MovementCost + ?Sized,
{
    path.windows(2)
        .map(|step| {
            let adjacent = map
                .node(step[0])
                .and_then(|n| n.direction_to(step[1]))
                .is_some();
            if adjacent {
                edge_cost(map, costs, step[0], step[1])
            } else {
                IMPASSABLE
            }
        })
        .sum()
}

/// Cheapest cost to every node reachable from `start` within `budget`.
///
/// The start node is included with cost 0. A node is expanded again whenever
/// it is reached more cheaply than before, so the result is exact; the search
/// still terminates on the cyclic grid because every edge costs at least 0.5.
pub fn find_reachable<C>(
    map: &Map,
    costs: &C,
    start: MapNodeId,
    budget: f64,
) -> HashMap<MapNodeId, f64>
where
    C: MovementCost + ?Sized,
{
    let mut reachable: HashMap<MapNodeId, f64> = HashMap::new();
    if !map.contains_node(start) || budget.is_nan() || budget < 0.0 {
        return reachable;
    }

    let mut frontier = BinaryHeap::new();
    reachable.insert(start, 0.0);
    frontier.push(PathNode {
        node: start,
        cost: 0.0,
    });

    while let Some(PathNode { node, cost }) = frontier.pop() {
        // A cheaper visit was queued after this one
        if cost > *reachable.get(&node).unwrap_or(&IMPASSABLE) {
            continue;
        }

        let Some(current) = map.node(node) else {
            continue;
        };

        for (_, neighbour) in current.neighbours() {
            let weight = edge_cost(map, costs, node, neighbour);
            let total = cost + weight;

            if total > budget {
                continue;
            }

            if total < *reachable.get(&neighbour).unwrap_or(&IMPASSABLE) {
                reachable.insert(neighbour, total);
                frontier.push(PathNode {
                    node: neighbour,
                    cost: total,
                });
            }
        }
    }

    reachable
}

/// Nodes that can be moved to from `start` with at most `budget` movement
/// points, not counting `start` itself.
pub fn reachable_nodes<C>(map: &Map, costs: &C, start: MapNodeId, budget: f64) -> HashSet<MapNodeId>
where
    C: MovementCost + ?Sized,
{
    find_reachable(map, costs, start, budget)
        .into_keys()
        .filter(|&node| node != start)
        .collect()
}

fn unit_context<'a>(
    world: &'a World,
    map: &'a Map,
    unit: UnitId,
) -> Result<(&'a Unit, &'a UnitClass), PathError> {
    let unit = map.unit(unit).ok_or(PathError::UnknownUnit(unit))?;
    let class = world
        .class_of(unit.unit_type)
        .ok_or(PathError::UnknownUnitType(unit.unit_type))?;
    Ok((unit, class))
}

/// Shortest path for a unit from its current position to `target`.
///
/// Empty when the unit's class cannot get there.
pub fn shortest_path_for_unit(
    world: &World,
    map: &Map,
    unit: UnitId,
    target: MapNodeId,
) -> Result<Vec<MapNodeId>, PathError> {
    let (unit, class) = unit_context(world, map, unit)?;
    Ok(shortest_path(map, class, unit.position, target))
}

/// Nodes the unit can reach with the movement points it has left.
pub fn reachable_nodes_for_unit(
    world: &World,
    map: &Map,
    unit: UnitId,
) -> Result<HashSet<MapNodeId>, PathError> {
    let (unit, class) = unit_context(world, map, unit)?;
    Ok(reachable_nodes(
        map,
        class,
        unit.position,
        f64::from(unit.movement_points),
    ))
}

/// Move a unit along the shortest path to `target`, paying for it.
///
/// The cost is rounded up to whole movement points. Nothing changes if the
/// move is not possible.
pub fn move_unit(
    world: &World,
    map: &mut Map,
    unit_id: UnitId,
    target: MapNodeId,
) -> Result<PathResult, PathError> {
    let (unit, class) = unit_context(world, map, unit_id)?;
    let from = unit.position;
    let available = unit.movement_points;

    if !map.contains_node(target) {
        return Err(PathError::UnknownNode(target));
    }
    if from == target {
        return Ok(PathResult {
            path: vec![from],
            total_cost: 0.0,
        });
    }
    if map.unit_at(target).is_some() {
        return Err(PathError::NodeOccupied(target));
    }

    let result = find_path(map, class, from, target).ok_or(PathError::NoPath { from, to: target })?;
    let required = result.total_cost.ceil() as i32;
    if required > available {
        return Err(PathError::InsufficientMovement {
            required,
            available,
        });
    }

    map.relocate_unit(unit_id, target)?;
    if let Some(unit) = map.unit_mut(unit_id) {
        unit.use_movement(required);
    }

    tracing::debug!(unit = unit_id, %from, %target, cost = required, "unit moved");
    Ok(result)
}
