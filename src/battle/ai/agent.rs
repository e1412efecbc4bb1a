//! Turn-taking agent for a computer-controlled team
//!
//! Drives the battlefield only through its public command, step and query
//! surface, exactly like a human player's input layer would.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::ai::personality::Personality;
use crate::battle::ai::scoring::{attack_score, cover_candidates, cover_score};
use crate::battle::battlefield::{Battlefield, EncounterStatus};
use crate::battle::constants::{MAX_APS, MIN_AIM_LEVEL, SHOT_AP_COST};
use crate::battle::ranged::ShotOutcome;
use crate::core::types::{Position, SoldierId, TeamId};

/// What one soldier did during an agent turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldierActivity {
    pub cells_moved: u32,
    pub shots_fired: u32,
    pub hits: u32,
    pub kills: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamAgent {
    team: TeamId,
    personalities: BTreeMap<SoldierId, Personality>,
    /// Advance toward the map centre when no enemy is in sight
    pub advance_when_idle: bool,
}

impl TeamAgent {
    /// Roll a personality for every soldier of `team` on the battlefield
    pub fn new(team: TeamId, bf: &Battlefield, rng: &mut impl Rng) -> Self {
        let personalities = bf
            .soldiers()
            .iter()
            .filter(|s| s.team == team)
            .map(|s| (s.id, Personality::random(rng)))
            .collect();
        Self {
            team,
            personalities,
            advance_when_idle: true,
        }
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn personality(&self, soldier: SoldierId) -> Option<Personality> {
        self.personalities.get(&soldier).copied()
    }

    /// Play every living soldier of the team once, then end the turn
    ///
    /// Does nothing when it is not this team's turn.
    pub fn take_turn(&mut self, bf: &mut Battlefield, rng: &mut impl Rng) -> EncounterStatus {
        if bf.current_team() != self.team {
            tracing::warn!("{:?} asked to act during {:?}'s turn", self.team, bf.current_team());
            return bf.encounter_status();
        }

        let roster: Vec<SoldierId> = bf.soldiers_in_team(self.team).iter().map(|s| s.id).collect();
        for id in roster {
            if bf.encounter_status().is_decided() {
                break;
            }
            if bf.set_current_soldier(id).is_err() {
                continue;
            }
            let personality = *self
                .personalities
                .entry(id)
                .or_insert_with(|| Personality::random(rng));
            let activity = self.play_soldier(bf, id, personality, rng);
            tracing::debug!("{:?} ({:?}) turn: {:?}", id, personality, activity);
        }

        match bf.encounter_status() {
            EncounterStatus::Ongoing => bf.end_turn(),
            decided => decided,
        }
    }

    fn play_soldier(
        &self,
        bf: &mut Battlefield,
        id: SoldierId,
        personality: Personality,
        rng: &mut impl Rng,
    ) -> SoldierActivity {
        let mut activity = SoldierActivity::default();

        let enemies = self.visible_enemy_positions(bf);
        let destination = if enemies.is_empty() {
            if self.advance_when_idle && personality == Personality::Offensive {
                self.rally_point(bf, id)
            } else {
                None
            }
        } else {
            self.best_cover(bf, id, personality, &enemies, rng)
        };

        if let Some(target) = destination {
            if bf.move_to(target).is_ok() {
                activity.cells_moved = walk(bf);
            }
        }

        self.fire_at_will(bf, id, rng, &mut activity);
        activity
    }

    fn visible_enemy_positions(&self, bf: &Battlefield) -> Vec<Position> {
        bf.soldiers_seen_by(self.team)
            .into_iter()
            .filter_map(|e| bf.soldier(e).map(|s| s.position))
            .collect()
    }

    /// Highest ranked reachable cover candidate
    fn best_cover(
        &self,
        bf: &Battlefield,
        id: SoldierId,
        personality: Personality,
        enemies: &[Position],
        rng: &mut impl Rng,
    ) -> Option<Position> {
        let from = bf.soldier(id)?.position;
        let mut candidates = cover_candidates(bf, from, enemies);
        candidates.shuffle(rng);

        let mut ranked: Vec<(Position, OrderedFloat<f64>)> = candidates
            .into_iter()
            .map(|c| {
                let score = match personality {
                    Personality::Defensive => enemies
                        .iter()
                        .map(|e| OrderedFloat(cover_score(bf, *e, c)))
                        .min(),
                    Personality::Offensive => enemies
                        .iter()
                        .map(|e| OrderedFloat(attack_score(bf, id, c, *e)))
                        .max(),
                };
                (c, score.unwrap_or_default())
            })
            .collect();
        // Stable sort keeps the shuffled order among equal scores
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .map(|(c, _)| c)
            .find(|c| bf.path(from, *c).is_some())
    }

    /// Passable cell closest to the centre of the map
    fn rally_point(&self, bf: &Battlefield, id: SoldierId) -> Option<Position> {
        let from = bf.soldier(id)?.position;
        let centre = Position::new(bf.grid.width as i32 / 2, bf.grid.height as i32 / 2);
        if from.chebyshev(&centre) <= 1 {
            return None;
        }
        bf.grid
            .positions()
            .filter(|p| p.chebyshev(&centre) <= 3 && bf.passable(*p))
            .min_by_key(|p| (p.manhattan(&centre), *p))
    }

    /// Shoot the most promising visible enemy until out of APs or targets
    fn fire_at_will(&self, bf: &mut Battlefield, id: SoldierId, rng: &mut impl Rng, activity: &mut SoldierActivity) {
        // Friendly encounters charge nothing, so cap volleys at what a full AP bar allows
        let max_volleys = MAX_APS / SHOT_AP_COST;
        while activity.shots_fired < max_volleys {
            let Some(shooter) = bf.soldier(id) else {
                break;
            };
            if !shooter.alive() || (!bf.is_friendly() && shooter.current_aps < SHOT_AP_COST) {
                break;
            }
            let from = shooter.position;

            let target = bf
                .soldiers_seen_by(self.team)
                .into_iter()
                .filter_map(|e| bf.soldier(e).map(|s| s.position))
                .map(|pos| (pos, OrderedFloat(attack_score(bf, id, from, pos))))
                .max_by_key(|(_, score)| *score);
            let Some((target, score)) = target else {
                break;
            };
            if score.0 <= 0.0 {
                break;
            }

            if bf.shoot(target, MIN_AIM_LEVEL).is_err() {
                break;
            }
            activity.shots_fired += 1;
            while let Some(step) = bf.advance_shot(rng) {
                if let ShotOutcome::Hit { killed, .. } = step.outcome {
                    activity.hits += 1;
                    activity.kills += u32::from(killed);
                }
                if step.is_final() {
                    break;
                }
            }
        }
    }
}

/// Step the pending move to completion; returns cells moved
fn walk(bf: &mut Battlefield) -> u32 {
    let mut moved = 0;
    loop {
        let step = bf.advance_movement();
        if step.moved {
            moved += 1;
        }
        if step.finished {
            return moved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::grid::Grid;
    use crate::battle::soldier::SoldierAttributes;
    use crate::battle::terrain::Overlay;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn attrs() -> SoldierAttributes {
        SoldierAttributes::new("Agent", 80, 85)
    }

    #[test]
    fn test_personalities_assigned_to_team_only() {
        let mut bf = Battlefield::new(Grid::new(20, 20), false);
        bf.add_soldier(TeamId::PLAYER, Position::new(0, 0), attrs()).unwrap();
        let e1 = bf.add_soldier(TeamId::ENEMY, Position::new(10, 10), attrs()).unwrap();
        let e2 = bf.add_soldier(TeamId::ENEMY, Position::new(11, 10), attrs()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let agent = TeamAgent::new(TeamId::ENEMY, &bf, &mut rng);
        assert!(agent.personality(e1).is_some());
        assert!(agent.personality(e2).is_some());
        assert_eq!(agent.personalities.len(), 2);
    }

    #[test]
    fn test_idle_when_not_our_turn() {
        let mut bf = Battlefield::new(Grid::new(20, 20), false);
        bf.add_soldier(TeamId::PLAYER, Position::new(0, 0), attrs()).unwrap();
        bf.add_soldier(TeamId::ENEMY, Position::new(10, 10), attrs()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut agent = TeamAgent::new(TeamId::ENEMY, &bf, &mut rng);
        assert_eq!(agent.take_turn(&mut bf, &mut rng), EncounterStatus::Ongoing);
        assert_eq!(bf.current_team(), TeamId::PLAYER);
    }

    #[test]
    fn test_agent_spends_aps_on_visible_enemy() {
        let mut bf = Battlefield::new(Grid::new(20, 5), false);
        let player = bf.add_soldier(TeamId::PLAYER, Position::new(2, 2), attrs()).unwrap();
        let enemy = bf.add_soldier(TeamId::ENEMY, Position::new(6, 2), attrs()).unwrap();
        bf.end_turn();
        bf.set_current_soldier(enemy).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let agent = TeamAgent::new(TeamId::ENEMY, &bf, &mut rng);
        let activity = agent.play_soldier(&mut bf, enemy, Personality::Offensive, &mut rng);

        // No trees means no cover to take: every shot goes at the player
        assert_eq!(activity.cells_moved, 0);
        assert_eq!(activity.shots_fired, 2);
        assert_eq!(bf.soldier(enemy).unwrap().current_aps, 0);
        let health = bf.soldier(player).unwrap().attributes.health;
        assert_eq!(health, 85 - 40 * activity.hits);
    }

    #[test]
    fn test_defensive_soldier_takes_cover() {
        let mut bf = Battlefield::new(Grid::new(30, 9), false);
        bf.add_soldier(TeamId::PLAYER, Position::new(2, 4), attrs()).unwrap();
        let enemy = bf.add_soldier(TeamId::ENEMY, Position::new(14, 4), attrs()).unwrap();
        bf.grid.set_overlay(Position::new(16, 4), Overlay::Tree);
        bf.end_turn();

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut agent = TeamAgent::new(TeamId::ENEMY, &bf, &mut rng);
        agent.personalities.insert(enemy, Personality::Defensive);
        agent.take_turn(&mut bf, &mut rng);

        assert_eq!(bf.soldier(enemy).unwrap().position, Position::new(17, 4));
    }

    #[test]
    fn test_offensive_soldier_advances_when_nothing_in_sight() {
        let mut bf = Battlefield::new(Grid::new(60, 11), false);
        bf.add_soldier(TeamId::PLAYER, Position::new(0, 5), attrs()).unwrap();
        let enemy = bf.add_soldier(TeamId::ENEMY, Position::new(59, 5), attrs()).unwrap();
        bf.end_turn();

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut agent = TeamAgent::new(TeamId::ENEMY, &bf, &mut rng);
        agent.personalities.insert(enemy, Personality::Offensive);
        agent.take_turn(&mut bf, &mut rng);

        let x = bf.soldier(enemy).unwrap().position.x;
        assert!(x < 59, "moved toward the centre");
        assert_eq!(bf.current_team(), TeamId::PLAYER);
    }
}
