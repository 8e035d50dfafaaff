//! Tile grid for a single level
//!
//! Grid dimensions are fixed at load; individual cells mutate when blocks are hit.

use serde::{Deserialize, Serialize};

use crate::consts::{EDGE_EPSILON, TILE_SIZE};
use crate::{Rect, to_tile};

/// Tile codes as stored in level data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Air,
    Ground,
    /// Documented as passable from below; solid unless `one_way_platforms` is set
    Platform,
    Brick,
    QuestionBlock,
    UsedBlock,
    Pipe,
}

impl Tile {
    /// Decode a level-data tile code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Tile::Air),
            1 => Some(Tile::Ground),
            2 => Some(Tile::Platform),
            3 => Some(Tile::Brick),
            4 => Some(Tile::QuestionBlock),
            5 => Some(Tile::UsedBlock),
            6 => Some(Tile::Pipe),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Tile::Air => 0,
            Tile::Ground => 1,
            Tile::Platform => 2,
            Tile::Brick => 3,
            Tile::QuestionBlock => 4,
            Tile::UsedBlock => 5,
            Tile::Pipe => 6,
        }
    }

    /// Fixed solidity predicate: everything except Air
    #[inline]
    pub fn is_solid(self) -> bool {
        self != Tile::Air
    }

    /// Whether a rising body striking this tile produces a block-hit event
    #[inline]
    pub fn is_hittable(self) -> bool {
        matches!(self, Tile::QuestionBlock | Tile::Brick)
    }
}

/// A row/column address in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub row: i32,
    pub col: i32,
}

/// Immutable dimensions plus mutable per-cell tile codes
#[derive(Debug, Clone)]
pub struct TileWorld {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
    one_way_platforms: bool,
}

impl TileWorld {
    /// Build from row-major rows; callers validate dimensions beforehand
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let cells = rows.into_iter().flatten().collect();
        Self {
            width,
            height,
            cells,
            one_way_platforms: false,
        }
    }

    /// Grid of Air with the given dimensions
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Tile::Air; width * height],
            one_way_platforms: false,
        }
    }

    pub fn with_one_way_platforms(mut self, enabled: bool) -> Self {
        self.one_way_platforms = enabled;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    #[inline]
    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }

    /// Tile at a cell; Air for any out-of-bounds index
    #[inline]
    pub fn tile_at(&self, row: i32, col: i32) -> Tile {
        self.index(row, col).map_or(Tile::Air, |i| self.cells[i])
    }

    /// Tile under a world pixel position
    #[inline]
    pub fn tile_at_point(&self, x: f32, y: f32) -> Tile {
        self.tile_at(to_tile(y), to_tile(x))
    }

    /// Solid for bodies moving down onto it (landing)
    #[inline]
    pub fn blocks_landing(&self, row: i32, col: i32) -> bool {
        self.tile_at(row, col).is_solid()
    }

    /// Solid for sideways and upward movement
    #[inline]
    pub fn blocks_passage(&self, row: i32, col: i32) -> bool {
        let tile = self.tile_at(row, col);
        if self.one_way_platforms && tile == Tile::Platform {
            return false;
        }
        tile.is_solid()
    }

    /// Replace a cell in place; out-of-bounds writes are ignored
    pub fn set(&mut self, row: i32, col: i32, tile: Tile) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Every tile that intersects a rectangle (clipped to the grid)
    pub fn tiles_in_rect(&self, rect: &Rect) -> impl Iterator<Item = (TileCoord, Tile)> + '_ {
        let row0 = to_tile(rect.top()).max(0);
        let row1 = to_tile(rect.bottom() - EDGE_EPSILON).min(self.height as i32 - 1);
        let col0 = to_tile(rect.left()).max(0);
        let col1 = to_tile(rect.right() - EDGE_EPSILON).min(self.width as i32 - 1);
        (row0..=row1).flat_map(move |row| {
            (col0..=col1).map(move |col| (TileCoord { row, col }, self.tile_at(row, col)))
        })
    }
}
