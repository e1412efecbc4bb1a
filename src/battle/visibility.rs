//! Line-of-sight queries
//!
//! Sight starts at full visibility and loses each crossed cell's overlay drop.
//! Nothing is cached: every query traces again against the current roster.

use std::collections::{BTreeMap, BTreeSet};

use crate::battle::battlefield::Battlefield;
use crate::battle::constants::FULL_VISIBILITY;
use crate::battle::line;
use crate::core::types::{ItemId, Position, SoldierId, TeamId};

impl Battlefield {
    /// Visibility left (hundredths) after crossing every cell strictly between the endpoints
    pub fn sight(&self, from: Position, to: Position) -> u32 {
        line::interior(from, to)
            .iter()
            .filter_map(|p| self.grid.tile(p.pos))
            .fold(FULL_VISIBILITY, |left, tile| left.saturating_sub(tile.overlay.sight_drop()))
    }

    pub fn sees(&self, from: Position, to: Position) -> bool {
        self.sight(from, to) > 0
    }

    /// Living enemies of `team` seen by at least one living member, roster order
    pub fn soldiers_seen_by(&self, team: TeamId) -> Vec<SoldierId> {
        let watchers = self.soldiers_in_team(team);
        self.soldiers()
            .iter()
            .filter(|s| s.alive() && s.team != team)
            .filter(|s| watchers.iter().any(|w| self.sees(w.position, s.position)))
            .map(|s| s.id)
            .collect()
    }

    /// Whether any living member of `team` sees this soldier
    pub fn soldier_seen_by_team(&self, soldier: SoldierId, team: TeamId) -> bool {
        let Some(target) = self.soldier(soldier).filter(|s| s.alive()) else {
            return false;
        };
        self.soldiers_in_team(team)
            .iter()
            .any(|w| w.id == target.id || self.sees(w.position, target.position))
    }

    /// Ground items seen by any living member of `team`, by cell
    pub fn items_seen_by_team(&self, team: TeamId) -> BTreeMap<Position, Vec<ItemId>> {
        let watchers = self.soldiers_in_team(team);
        self.ground_items()
            .filter(|(pos, _)| watchers.iter().any(|w| self.sees(w.position, *pos)))
            .map(|(pos, items)| (pos, items.iter().map(|i| i.id).collect()))
            .collect()
    }

    pub(crate) fn item_ids_seen_by_team(&self, team: TeamId) -> BTreeSet<ItemId> {
        self.items_seen_by_team(team)
            .into_values()
            .flatten()
            .collect()
    }
}
