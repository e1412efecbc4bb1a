//! Battle rule constants - all tunable values in one place
//!
//! Action point costs are in AP units; probabilities are per traced cell.

// Action points
pub const MAX_APS: u32 = 25;
pub const MAX_AP_CARRY_OVER: u32 = 5;
pub const SHOT_AP_COST: u32 = 10;
pub const PICKUP_AP_COST: u32 = 4;

// Movement cost per tile base (AP)
pub const GRASS_MOVE_COST: u32 = 3;
pub const WATER_MOVE_COST: u32 = 7;
pub const FLOOR_MOVE_COST: u32 = 2;
pub const PATHWAY_MOVE_COST: u32 = 2;

// Sight drop per traversed tile, in hundredths of full visibility
pub const OPEN_SIGHT_DROP: u32 = 5;
pub const TREE_SIGHT_DROP: u32 = 35;
pub const WALL_SIGHT_DROP: u32 = 100;
pub const FULL_VISIBILITY: u32 = 100;

// Ballistics
pub const SHOT_MAX_CELLS: usize = 10;
pub const SHOT_MAX_RANGE: u32 = 10;
pub const SHOT_DAMAGE: u32 = 40;
pub const HIT_FALLOFF_PER_CELL: f64 = 0.05;
pub const TREE_BLOCK_PER_CELL: f64 = 0.1;
pub const MIN_AIM_LEVEL: u8 = 1;
pub const MAX_AIM_LEVEL: u8 = 4;

// Soldiers
pub const STAMINA_RANGE: std::ops::Range<u32> = 50..90;
pub const HEALTH_RANGE: std::ops::Range<u32> = 50..90;
pub const INVENTORY_SLOTS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
