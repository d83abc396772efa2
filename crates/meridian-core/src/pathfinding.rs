//! A* routing and bounded reachability over the 8-connected square grid.
//!
//! The heuristic is Manhattan distance while steps may be diagonal, so it can
//! overestimate and the returned route is not guaranteed to be cheapest on
//! mixed terrain. Route choice is pinned by tests; change both together.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

use meridian_protocol::{Coord, MovePoints, UnitKind};

use crate::{grid::Grid, map::Tile};

const RIVER_PENALTY: MovePoints = MovePoints(5);
const ROAD_DISCOUNT: MovePoints = MovePoints(5);
const ROAD_FLOOR: MovePoints = MovePoints(5);
const RAILROAD_COST: MovePoints = MovePoints(2);

/// Cost for `unit` to enter `tile`, or `None` when the terrain is impassable to it.
pub fn tile_entry_cost(tile: &Tile, unit: UnitKind) -> Option<MovePoints> {
    let naval = unit.is_naval();
    if naval {
        if !tile.terrain.is_water() {
            return None;
        }
    } else if tile.terrain.is_water() && !tile.river {
        return None;
    }

    if tile.has_railroad() {
        return Some(RAILROAD_COST);
    }

    let mut cost = tile.terrain.movement_cost();
    if tile.river && !naval {
        cost = cost + RIVER_PENALTY;
    }
    if tile.has_road() {
        cost = cost.saturating_sub(ROAD_DISCOUNT).max(ROAD_FLOOR);
    }
    Some(cost)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathResult {
    /// Starts at the origin and ends at the goal when `success` is set; empty otherwise.
    pub path: Vec<Coord>,
    pub total_cost: MovePoints,
    pub success: bool,
}

impl PathResult {
    fn no_route() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReachableTile {
    pub coord: Coord,
    pub cost: MovePoints,
}

#[derive(Debug)]
struct OpenNode {
    f: i32,
    g: i32,
    cell: Coord,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (i32, i32, Coord, u64) {
        (self.f, self.g, self.cell, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest key.
        other.key().cmp(&self.key())
    }
}

fn heuristic(a: Coord, b: Coord) -> i32 {
    a.manhattan(b) as i32 * MovePoints::SCALE
}

fn reconstruct(grid: &Grid, came_from: &[Option<usize>], mut current: usize) -> Vec<Coord> {
    let mut out = Vec::new();
    if let Some(c) = grid.coord_at(current) {
        out.push(c);
    }
    while let Some(prev) = came_from[current] {
        current = prev;
        if let Some(c) = grid.coord_at(current) {
            out.push(c);
        }
    }
    out.reverse();
    out
}

/// A* from `start` to `goal`. An unreachable goal yields `success: false`, not an error.
pub fn find_path<'a>(
    start: Coord,
    goal: Coord,
    tile_at: impl Fn(Coord) -> Option<&'a Tile>,
    unit: UnitKind,
    width: u32,
    height: u32,
) -> PathResult {
    let grid = Grid::new(width, height);
    let (Some(start_idx), Some(goal_idx)) = (grid.index_of(start), grid.index_of(goal)) else {
        return PathResult::no_route();
    };
    if start_idx == goal_idx {
        return PathResult {
            path: vec![start],
            total_cost: MovePoints::ZERO,
            success: true,
        };
    }
    match tile_at(goal) {
        Some(tile) if tile_entry_cost(tile, unit).is_some() => {}
        _ => return PathResult::no_route(),
    }

    let mut open = BinaryHeap::<OpenNode>::new();
    let mut tie: u64 = 0;
    let mut g_score = vec![i32::MAX; grid.len()];
    let mut came_from: Vec<Option<usize>> = vec![None; grid.len()];

    g_score[start_idx] = 0;
    open.push(OpenNode {
        f: heuristic(start, goal),
        g: 0,
        cell: start,
        tie,
    });
    tie += 1;

    while let Some(node) = open.pop() {
        let Some(node_idx) = grid.index_of(node.cell) else {
            continue;
        };
        if node_idx == goal_idx {
            return PathResult {
                path: reconstruct(&grid, &came_from, goal_idx),
                total_cost: MovePoints(node.g),
                success: true,
            };
        }
        if node.g != g_score[node_idx] {
            // Stale heap entry.
            continue;
        }

        for n in grid.neighbors(node.cell) {
            let Some(n_idx) = grid.index_of(n) else {
                continue;
            };
            let Some(step) = tile_at(n).and_then(|t| tile_entry_cost(t, unit)) else {
                continue;
            };
            let tentative_g = node.g.saturating_add(step.tenths());
            if tentative_g >= g_score[n_idx] {
                continue;
            }
            came_from[n_idx] = Some(node_idx);
            g_score[n_idx] = tentative_g;
            open.push(OpenNode {
                f: tentative_g.saturating_add(heuristic(n, goal)),
                g: tentative_g,
                cell: n,
                tie,
            });
            tie += 1;
        }
    }

    PathResult::no_route()
}

/// Every tile enterable within `max_movement`, excluding `start`, in row-major order.
pub fn get_reachable_tiles<'a>(
    start: Coord,
    max_movement: MovePoints,
    tile_at: impl Fn(Coord) -> Option<&'a Tile>,
    unit: UnitKind,
    width: u32,
    height: u32,
) -> Vec<ReachableTile> {
    let grid = Grid::new(width, height);
    let Some(start_idx) = grid.index_of(start) else {
        return Vec::new();
    };

    let mut dist = vec![i32::MAX; grid.len()];
    dist[start_idx] = 0;
    let mut heap: BinaryHeap<std::cmp::Reverse<(i32, usize)>> = BinaryHeap::new();
    heap.push(std::cmp::Reverse((0, start_idx)));

    while let Some(std::cmp::Reverse((cost, index))) = heap.pop() {
        if cost != dist[index] {
            continue;
        }
        let Some(here) = grid.coord_at(index) else {
            continue;
        };
        for n in grid.neighbors(here) {
            let Some(n_idx) = grid.index_of(n) else {
                continue;
            };
            let Some(step) = tile_at(n).and_then(|t| tile_entry_cost(t, unit)) else {
                continue;
            };
            let new_cost = cost.saturating_add(step.tenths());
            if new_cost > max_movement.tenths() {
                continue;
            }
            if new_cost < dist[n_idx] {
                dist[n_idx] = new_cost;
                heap.push(std::cmp::Reverse((new_cost, n_idx)));
            }
        }
    }

    dist.into_iter()
        .enumerate()
        .filter(|&(i, d)| i != start_idx && d != i32::MAX)
        .filter_map(|(i, d)| {
            grid.coord_at(i).map(|coord| ReachableTile {
                coord,
                cost: MovePoints(d),
            })
        })
        .collect()
}
