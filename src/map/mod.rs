//! Dungeon tile grid.
//!
//! Produced once per dungeon by the layout generator and read-only afterwards.
//! World coordinates are centred on the grid: world (0, 0) sits in the middle
//! of the map, X maps to columns and Z maps to rows.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

pub mod path_store;
pub mod pathfinder;

pub use path_store::{CachedPath, PathStore};
pub use pathfinder::{find_path, Heuristic};

/// Tile classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Floor,
    Wall,
    Void,
    Door,
}

impl Tile {
    pub fn is_blocked(self) -> bool {
        matches!(self, Tile::Wall | Tile::Void)
    }

    fn from_ascii(c: char) -> Self {
        match c {
            '#' => Tile::Wall,
            '+' => Tile::Door,
            ' ' => Tile::Void,
            _ => Tile::Floor,
        }
    }
}

/// Grid cell coordinate (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Immutable 2D tile map with world/grid mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMap {
    width: usize,
    height: usize,
    cell_size: f32,
    tiles: Vec<Tile>, // row-major, z * width + x
}

impl GridMap {
    pub fn new(width: usize, height: usize, cell_size: f32, tiles: Vec<Tile>) -> SimResult<Self> {
        let expected = width * height;
        if tiles.len() != expected || expected == 0 {
            return Err(SimError::InvalidGrid {
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cell_size,
            tiles,
        })
    }

    /// Build from text rows: `#` wall, `.` floor, `+` door, space void.
    /// Short rows are padded with void.
    pub fn from_ascii(rows: &[&str], cell_size: f32) -> SimResult<Self> {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut tiles = Vec::with_capacity(width * height);
        for row in rows {
            let mut count = 0;
            for c in row.chars() {
                tiles.push(Tile::from_ascii(c));
                count += 1;
            }
            tiles.extend(std::iter::repeat(Tile::Void).take(width - count));
        }
        Self::new(width, height, cell_size, tiles)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.z >= 0 && (cell.x as usize) < self.width && (cell.z as usize) < self.height
    }

    /// Tile at a cell; `None` outside the map
    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        self.in_bounds(cell)
            .then(|| self.tiles[cell.z as usize * self.width + cell.x as usize])
    }

    /// Out-of-bounds cells count as blocked
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.tile(cell).map_or(true, Tile::is_blocked)
    }

    pub fn world_to_cell(&self, world_x: f32, world_z: f32) -> Cell {
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;
        Cell {
            x: (world_x / self.cell_size + half_w).floor() as i32,
            z: (world_z / self.cell_size + half_h).floor() as i32,
        }
    }

    /// World-space centre of a cell at height `y`
    pub fn cell_center(&self, cell: Cell, y: f32) -> Vec3 {
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;
        Vec3::new(
            (cell.x as f32 - half_w + 0.5) * self.cell_size,
            y,
            (cell.z as f32 - half_h + 0.5) * self.cell_size,
        )
    }

    /// Is this world position blocked? Out-of-bounds counts as wall.
    pub fn is_wall(&self, world_x: f32, world_z: f32) -> bool {
        self.is_blocked(self.world_to_cell(world_x, world_z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> GridMap {
        GridMap::from_ascii(
            &[
                "#####", //
                "#...#", //
                "#.+.#", //
                "#...#", //
                "#####",
            ],
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let err = GridMap::new(3, 3, 1.0, vec![Tile::Floor; 8]).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidGrid {
                expected: 9,
                actual: 8
            }
        ));
    }

    #[test]
    fn test_origin_centered_mapping() {
        let map = room();
        // 5x5 map: world origin is the centre of cell (2, 2)
        assert_eq!(map.world_to_cell(0.0, 0.0), Cell::new(2, 2));
        assert_eq!(map.cell_center(Cell::new(2, 2), 0.0), Vec3::ZERO);
        assert_eq!(map.world_to_cell(-2.4, -2.4), Cell::new(0, 0));
        assert_eq!(map.cell_center(Cell::new(0, 0), 1.0), Vec3::new(-2.0, 1.0, -2.0));
    }

    #[test]
    fn test_cell_center_round_trips() {
        let map = GridMap::from_ascii(&["......", "......", "......", "......"], 2.0).unwrap();
        for z in 0..4 {
            for x in 0..6 {
                let cell = Cell::new(x, z);
                let center = map.cell_center(cell, 0.0);
                assert_eq!(map.world_to_cell(center.x, center.z), cell);
            }
        }
    }

    #[test]
    fn test_is_wall() {
        let map = room();
        assert!(!map.is_wall(0.0, 0.0)); // door in the middle
        assert!(!map.is_wall(-1.0, -1.0));
        assert!(map.is_wall(-2.0, 0.0));
        // out of bounds is wall
        assert!(map.is_wall(100.0, 0.0));
        assert!(map.is_wall(0.0, -100.0));
    }

    #[test]
    fn test_void_blocks_and_short_rows_pad() {
        let map = GridMap::from_ascii(&["...", ". "], 1.0).unwrap();
        assert_eq!(map.tile(Cell::new(1, 1)), Some(Tile::Void));
        assert_eq!(map.tile(Cell::new(2, 1)), Some(Tile::Void));
        assert!(map.is_blocked(Cell::new(2, 1)));
        assert!(!map.is_blocked(Cell::new(0, 1)));
    }
}
