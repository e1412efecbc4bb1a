//! Tile types and their effects
//!
//! The base decides movement cost, the overlay decides passability and how
//! much sight and shots are attenuated.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    FLOOR_MOVE_COST, GRASS_MOVE_COST, OPEN_SIGHT_DROP, PATHWAY_MOVE_COST, TREE_SIGHT_DROP,
    WALL_SIGHT_DROP, WATER_MOVE_COST,
};

/// Ground a tile is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileBase {
    #[default]
    Grass,
    Water,
    Floor,
    Pathway,
}

impl TileBase {
    /// AP needed to step onto this ground
    pub fn movement_cost(&self) -> u32 {
        match self {
            TileBase::Grass => GRASS_MOVE_COST,
            TileBase::Water => WATER_MOVE_COST,
            TileBase::Floor => FLOOR_MOVE_COST,
            TileBase::Pathway => PATHWAY_MOVE_COST,
        }
    }
}

/// Something standing on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Overlay {
    #[default]
    None,
    Tree,
    Wall,
}

impl Overlay {
    /// Visibility lost when a sight line crosses this tile (hundredths)
    pub fn sight_drop(&self) -> u32 {
        match self {
            Overlay::None => OPEN_SIGHT_DROP,
            Overlay::Tree => TREE_SIGHT_DROP,
            Overlay::Wall => WALL_SIGHT_DROP,
        }
    }
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Tile {
    pub base: TileBase,
    pub overlay: Overlay,
}

impl Tile {
    pub const GRASS: Tile = Tile::new(TileBase::Grass, Overlay::None);
    pub const WATER: Tile = Tile::new(TileBase::Water, Overlay::None);

    pub const fn new(base: TileBase, overlay: Overlay) -> Self {
        Self { base, overlay }
    }

    /// Terrain allows standing here (soldiers are checked separately)
    pub fn is_open(&self) -> bool {
        self.overlay == Overlay::None
    }
}
