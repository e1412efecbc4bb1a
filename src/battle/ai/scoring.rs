//! Cover and attack scoring for agent decisions
//!
//! Both scores trace a line and inspect the cells strictly between its
//! endpoints. Higher is better in both cases.

use std::collections::BTreeSet;

use crate::battle::battlefield::Battlefield;
use crate::battle::constants::SHOT_MAX_RANGE;
use crate::battle::line;
use crate::battle::ranged::{block_probability, hit_probability};
use crate::battle::terrain::Overlay;
use crate::core::types::{Position, SoldierId};

/// Score when a wall stands between the enemy and the candidate
pub const WALL_COVER_SCORE: f64 = 10.0;

/// Contribution of each open cell on the line
pub const OPEN_COVER_SCORE: f64 = 0.05;

/// How far from a soldier trees are considered as cover
pub const COVER_SEARCH_RADIUS: i32 = 8;

/// Protection `candidate` gets from an enemy at `enemy`
///
/// Trees weigh `1 - progress`, so those right next to the candidate count
/// almost fully and those next to the enemy barely at all.
pub fn cover_score(bf: &Battlefield, enemy: Position, candidate: Position) -> f64 {
    let mut score = 0.0;
    for point in line::interior(enemy, candidate) {
        match bf.grid.tile(point.pos).map(|t| t.overlay) {
            Some(Overlay::Wall) => return WALL_COVER_SCORE,
            Some(Overlay::Tree) => score += 1.0 - point.progress as f64,
            _ => score += OPEN_COVER_SCORE,
        }
    }
    score
}

/// Expected chance for `shooter` standing at `from` to hit the soldier at `target`
///
/// Zero when out of ballistic range, behind a wall, or when a living team
/// mate stands on the line.
pub fn attack_score(bf: &Battlefield, shooter: SoldierId, from: Position, target: Position) -> f64 {
    let Some(team) = bf.soldier(shooter).map(|s| s.team) else {
        return 0.0;
    };
    let points = line::trace(from, target);
    let distance = points.len().saturating_sub(1) as u32;
    if distance == 0 || distance > SHOT_MAX_RANGE {
        return 0.0;
    }

    let mut clear = 1.0;
    for (travelled, point) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        if bf
            .soldier_at(point.pos)
            .is_some_and(|s| s.team == team && s.id != shooter)
        {
            return 0.0;
        }
        match bf.grid.tile(point.pos).map(|t| t.overlay) {
            Some(Overlay::Wall) => return 0.0,
            Some(Overlay::Tree) => clear *= 1.0 - block_probability(Overlay::Tree, travelled as u32),
            _ => {}
        }
    }

    hit_probability(distance) * clear
}

/// Passable cells just behind trees near `around`, as seen from each enemy
///
/// For every tree within the search radius and every enemy, the candidate
/// is the tree's neighbour one step further away from that enemy.
pub fn cover_candidates(bf: &Battlefield, around: Position, enemies: &[Position]) -> Vec<Position> {
    let mut candidates = BTreeSet::new();
    for dy in -COVER_SEARCH_RADIUS..=COVER_SEARCH_RADIUS {
        for dx in -COVER_SEARCH_RADIUS..=COVER_SEARCH_RADIUS {
            let tree = around.offset(dx, dy);
            if bf.grid.tile(tree).map(|t| t.overlay) != Some(Overlay::Tree) {
                continue;
            }
            for enemy in enemies {
                let behind = tree.offset((tree.x - enemy.x).signum(), (tree.y - enemy.y).signum());
                if behind != tree && bf.passable(behind) {
                    candidates.insert(behind);
                }
            }
        }
    }
    candidates.into_iter().collect()
}
