//! Grid pathfinding
//!
//! Breadth-first search over the 8-connected tile grid. Diagonal steps may
//! not cut a blocked corner. When several destinations are acceptable the
//! winner is the one with the shortest path, then the smallest straight-line
//! distance from the mover, then the earliest in the candidate list.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;

use crate::core::types::Location;
use crate::spatial::collision::collides_with_any_entities;
use crate::world::region::Region;

pub const WALK_SPEED: usize = 1;
pub const RUN_SPEED: usize = 2;

/// Expansion order: W, E, S, N, SW, SE, NW, NE
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, 1),
    (0, -1),
    (-1, 1),
    (1, 1),
    (-1, -1),
    (1, -1),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathResult {
    /// Chosen candidate, if any was reachable
    pub destination: Option<Location>,
    /// Tiles from the first step to the destination (origin excluded)
    pub path: Vec<Location>,
}

/// One tick of movement along a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub location: Location,
    /// Tiles entered this tick, in order
    pub steps: Vec<Location>,
    /// Where the mover is heading; collapses to its location when unreachable
    pub destination: Location,
}

pub fn can_tile_be_pathed_to(region: &Region, x: i32, y: i32, size: i32) -> bool {
    region.in_bounds(x, y, size) && !collides_with_any_entities(region, x, y, size)
}

fn can_step(region: &Region, from: Location, dx: i32, dy: i32, size: i32) -> bool {
    let to = from.offset(dx, dy);
    if !can_tile_be_pathed_to(region, to.x, to.y, size) {
        return false;
    }
    if dx != 0 && dy != 0 {
        return can_tile_be_pathed_to(region, from.x + dx, from.y, size)
            && can_tile_be_pathed_to(region, from.x, from.y + dy, size);
    }
    true
}

/// Shortest path from `origin` to the best of `candidates`
pub fn construct_paths(
    region: &Region,
    origin: Location,
    size: i32,
    candidates: &[Location],
) -> PathResult {
    if candidates.is_empty() {
        return PathResult::default();
    }
    let targets: AHashSet<Location> = candidates.iter().copied().collect();

    let mut depth: AHashMap<Location, u32> = AHashMap::new();
    let mut came_from: AHashMap<Location, Location> = AHashMap::new();
    let mut queue = VecDeque::from([origin]);
    depth.insert(origin, 0);

    let mut best: Option<(u32, OrderedFloat<f64>, usize, Location)> = None;

    while let Some(current) = queue.pop_front() {
        let current_depth = depth[&current];
        if best.is_some_and(|(found, ..)| current_depth > found) {
            break;
        }

        if targets.contains(&current) {
            let index = candidates
                .iter()
                .position(|c| *c == current)
                .unwrap_or(usize::MAX);
            let key = (
                current_depth,
                OrderedFloat(origin.distance(&current)),
                index,
                current,
            );
            if best.map_or(true, |b| (key.0, key.1, key.2) < (b.0, b.1, b.2)) {
                best = Some(key);
            }
            continue;
        }

        for (dx, dy) in NEIGHBOURS {
            if !can_step(region, current, dx, dy, size) {
                continue;
            }
            let next = current.offset(dx, dy);
            if depth.contains_key(&next) {
                continue;
            }
            depth.insert(next, current_depth + 1);
            came_from.insert(next, current);
            queue.push_back(next);
        }
    }

    let Some((_, _, _, destination)) = best else {
        return PathResult::default();
    };
    PathResult {
        destination: Some(destination),
        path: reconstruct_path(&came_from, origin, destination),
    }
}

fn reconstruct_path(
    came_from: &AHashMap<Location, Location>,
    origin: Location,
    destination: Location,
) -> Vec<Location> {
    let mut path = Vec::new();
    let mut current = destination;
    while current != origin {
        path.push(current);
        match came_from.get(&current) {
            Some(previous) => current = *previous,
            None => break,
        }
    }
    path.reverse();
    path
}

/// Advance up to `speed` tiles from `from` toward `to`
pub fn path(region: &Region, from: Location, to: Location, speed: usize, size: i32) -> PathStep {
    let stay = PathStep {
        location: from,
        steps: Vec::new(),
        destination: from,
    };
    if from == to {
        return stay;
    }
    let result = construct_paths(region, from, size, &[to]);
    if result.path.is_empty() {
        return stay;
    }
    let taken = speed.clamp(1, result.path.len());
    let steps = result.path[..taken].to_vec();
    PathStep {
        location: steps[taken - 1],
        steps,
        destination: to,
    }
}

pub fn dist(x1: i32, y1: i32, x2: i32, y2: i32) -> f64 {
    Location::new(x1, y1).distance(&Location::new(x2, y2))
}

pub fn linear_interpolation(from: f64, to: f64, amount: f64) -> f64 {
    from + (to - from) * amount
}

/// Facing angle in radians from one point toward another
pub fn angle(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (y2 - y1).atan2(x2 - x1)
}
