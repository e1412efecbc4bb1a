//! Sector tile storage
//!
//! Row-major table of tiles. Knows nothing about soldiers; passability that
//! accounts for occupants lives on the battlefield.

use serde::{Deserialize, Serialize};

use crate::battle::terrain::{Overlay, Tile, TileBase};
use crate::core::types::Position;

/// The full terrain of one sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a grid covered in plain grass
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::GRASS; (width * height) as usize],
        }
    }

    /// Check if coordinate is within grid bounds
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Get the tile at a position
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    /// Replace a tile. Out-of-bounds writes are ignored.
    pub(crate) fn set_tile(&mut self, pos: Position, tile: Tile) {
        if let Some(i) = self.index(pos) {
            self.tiles[i] = tile;
        }
    }

    pub(crate) fn set_overlay(&mut self, pos: Position, overlay: Overlay) {
        if let Some(i) = self.index(pos) {
            self.tiles[i].overlay = overlay;
        }
    }

    pub(crate) fn set_base(&mut self, pos: Position, base: TileBase) {
        if let Some(i) = self.index(pos) {
            self.tiles[i].base = base;
        }
    }

    /// In-bounds neighbours, diagonals included
    pub fn neighbors8(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors8().into_iter().filter(|p| self.in_bounds(*p))
    }

    /// In-bounds orthogonal neighbours
    pub fn neighbors4(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors4().into_iter().filter(|p| self.in_bounds(*p))
    }

    /// Every position, row by row
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
    }

    /// Count tiles matching a predicate
    pub fn count(&self, predicate: impl Fn(&Tile) -> bool) -> usize {
        self.tiles.iter().filter(|t| predicate(t)).count()
    }
}
