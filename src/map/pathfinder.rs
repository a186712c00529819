//! Grid A* over 8-connected cells.
//!
//! Orthogonal steps cost 1, diagonal steps cost sqrt(2). A diagonal step is
//! refused when either orthogonal neighbour it would clip is blocked. Every
//! cell is expanded at most once, so a search is bounded by the map size even
//! when the goal is unreachable.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{Cell, GridMap};

const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

const NEIGHBORS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Distance estimate used to order the open set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heuristic {
    /// |dx| + |dz|. Overestimates diagonal routes, so paths may be slightly longer than optimal.
    Manhattan,
    /// Exact cost of an unobstructed 8-connected route
    #[default]
    Octile,
}

impl Heuristic {
    pub fn estimate(self, from: Cell, to: Cell) -> f32 {
        let dx = (from.x - to.x).abs() as f32;
        let dz = (from.z - to.z).abs() as f32;
        match self {
            Heuristic::Manhattan => dx + dz,
            Heuristic::Octile => dx.max(dz) + (DIAGONAL_COST - 1.0) * dx.min(dz),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    cell: Cell,
    f_cost: f32,
    h_cost: f32,
    insertion_order: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    // reversed: BinaryHeap is a max-heap and we want the lowest f first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.h_cost.total_cmp(&self.h_cost))
            .then_with(|| other.insertion_order.cmp(&self.insertion_order))
    }
}

/// World-space path between two positions.
///
/// Waypoints are cell centres from the first step after the start cell up to
/// and including the goal cell, at the start's height. An empty result means
/// the goal is unreachable, never "already there": a start inside the goal
/// cell yields the goal centre as a single waypoint.
pub fn find_path(grid: &GridMap, start: Vec3, goal: Vec3, heuristic: Heuristic) -> Vec<Vec3> {
    let start_cell = grid.world_to_cell(start.x, start.z);
    let goal_cell = grid.world_to_cell(goal.x, goal.z);
    find_cell_path(grid, start_cell, goal_cell, heuristic)
        .into_iter()
        .map(|cell| grid.cell_center(cell, start.y))
        .collect()
}

/// Cell-space A*. Excludes `start`, includes `goal`; empty when unreachable.
pub fn find_cell_path(grid: &GridMap, start: Cell, goal: Cell, heuristic: Heuristic) -> Vec<Cell> {
    if grid.is_blocked(goal) || !grid.in_bounds(start) {
        return Vec::new();
    }
    if start == goal {
        return vec![goal];
    }

    let width = grid.width();
    let node_count = width * grid.height();
    let index_of = |cell: Cell| cell.z as usize * width + cell.x as usize;

    let mut closed = vec![false; node_count];
    let mut best_g = vec![f32::INFINITY; node_count];
    let mut parent: Vec<Option<usize>> = vec![None; node_count];
    let mut open = BinaryHeap::new();
    let mut next_insertion = 0u64;

    let start_index = index_of(start);
    let goal_index = index_of(goal);
    best_g[start_index] = 0.0;
    let start_h = heuristic.estimate(start, goal);
    open.push(OpenNode {
        cell: start,
        f_cost: start_h,
        h_cost: start_h,
        insertion_order: next_insertion,
    });

    while let Some(current) = open.pop() {
        let current_index = index_of(current.cell);
        if closed[current_index] {
            continue;
        }
        closed[current_index] = true;

        if current_index == goal_index {
            return reconstruct(&parent, width, start_index, goal_index);
        }

        for (dx, dz) in NEIGHBORS {
            let next = Cell::new(current.cell.x + dx, current.cell.z + dz);
            if grid.is_blocked(next) {
                continue;
            }
            let diagonal = dx != 0 && dz != 0;
            if diagonal
                && (grid.is_blocked(Cell::new(current.cell.x + dx, current.cell.z))
                    || grid.is_blocked(Cell::new(current.cell.x, current.cell.z + dz)))
            {
                continue;
            }

            let next_index = index_of(next);
            if closed[next_index] {
                continue;
            }

            let step = if diagonal { DIAGONAL_COST } else { 1.0 };
            let tentative_g = best_g[current_index] + step;
            if tentative_g >= best_g[next_index] {
                continue;
            }

            best_g[next_index] = tentative_g;
            parent[next_index] = Some(current_index);
            let h_cost = heuristic.estimate(next, goal);
            next_insertion += 1;
            open.push(OpenNode {
                cell: next,
                f_cost: tentative_g + h_cost,
                h_cost,
                insertion_order: next_insertion,
            });
        }
    }

    Vec::new()
}

fn reconstruct(parent: &[Option<usize>], width: usize, start_index: usize, goal_index: usize) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut cursor = goal_index;
    while cursor != start_index {
        cells.push(Cell::new((cursor % width) as i32, (cursor / width) as i32));
        match parent[cursor] {
            Some(previous) => cursor = previous,
            None => return Vec::new(),
        }
    }
    cells.reverse();
    cells
}

/// Cost of walking a cell path from `start`
pub fn path_cost(start: Cell, path: &[Cell]) -> f32 {
    let mut previous = start;
    let mut cost = 0.0;
    for &cell in path {
        cost += if cell.x != previous.x && cell.z != previous.z {
            DIAGONAL_COST
        } else {
            1.0
        };
        previous = cell;
    }
    cost
}
