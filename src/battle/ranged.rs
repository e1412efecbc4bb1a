//! Ballistic resolution rules
//!
//! A shot travels one traced cell per step. Soldiers on the line may be hit,
//! trees may stop it, walls always do.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{HIT_FALLOFF_PER_CELL, TREE_BLOCK_PER_CELL};
use crate::battle::terrain::Overlay;
use crate::core::types::{Position, SoldierId};

/// Chance to hit a soldier `distance` cells from the shooter
pub fn hit_probability(distance: u32) -> f64 {
    (1.0 - distance as f64 * HIT_FALLOFF_PER_CELL).clamp(0.0, 1.0)
}

/// Chance a tile stops a shot that has travelled `distance` cells
pub fn block_probability(overlay: Overlay, distance: u32) -> f64 {
    match overlay {
        Overlay::None => 0.0,
        Overlay::Tree => (distance as f64 * TREE_BLOCK_PER_CELL).min(1.0),
        Overlay::Wall => 1.0,
    }
}

/// A shot in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingShot {
    pub shooter: SoldierId,
    /// Cells still to be crossed, nearest first
    pub trace: VecDeque<Position>,
    /// Cells crossed so far
    pub travelled: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// Still flying; step again
    InFlight,
    Hit { victim: SoldierId, killed: bool },
    /// Stopped by terrain
    Blocked,
    /// Out of range or out of cells
    Missed,
}

/// Result of resolving one cell of a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotStep {
    pub at: Position,
    pub outcome: ShotOutcome,
}

impl ShotStep {
    pub fn is_final(&self) -> bool {
        self.outcome != ShotOutcome::InFlight
    }
}
