//! The island: a grid of sectors with one active encounter
//!
//! Sectors are generated on first entry from seeds drawn up front, so the
//! island layout depends only on the island seed. The player's squad is the
//! only thing that moves between sectors; enemies stay where they spawned.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::battlefield::{Battlefield, IdAllocator};
use crate::battle::generation::generate_from_seed;
use crate::battle::grid::Grid;
use crate::battle::soldier::{Soldier, SoldierAttributes};
use crate::core::config::{GenerationConfig, IslandConfig};
use crate::core::error::{Result, SkirmishError};
use crate::core::types::{Direction, Position, TeamId};

#[derive(Debug, Serialize, Deserialize)]
pub struct Island {
    config: IslandConfig,
    rng: ChaCha8Rng,
    sector_seeds: Vec<u64>,
    /// Sectors left behind, row-major; the active one is taken out
    parked: Vec<Option<Battlefield>>,
    active: Battlefield,
    active_coord: Position,
    start_coord: Position,
}

impl Island {
    /// Lay out the island and put the squad in the start sector
    pub fn new(config: &IslandConfig, seed: u64) -> Result<Self> {
        config.validate().map_err(SkirmishError::InvalidConfig)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let count = (config.width * config.height) as usize;
        let sector_seeds: Vec<u64> = (0..count).map(|_| rng.gen()).collect();
        let start_coord = Position::new(0, config.height as i32 / 2);

        let mut island = Self {
            config: config.clone(),
            rng,
            sector_seeds,
            parked: (0..count).map(|_| None).collect(),
            active: Battlefield::new(Grid::new(0, 0), true),
            active_coord: start_coord,
            start_coord,
        };

        let mut start = island.build_sector(start_coord, IdAllocator::default())?;
        let squad = island.recruit_squad(&mut start);
        start.attach_soldiers(squad, Direction::West);
        start.start_turn(TeamId::PLAYER);
        island.active = start;

        tracing::info!(
            "Island {}x{} ready, squad of {} in sector {}",
            config.width,
            config.height,
            config.soldiers_per_team,
            start_coord
        );
        Ok(island)
    }

    pub fn config(&self) -> &IslandConfig {
        &self.config
    }

    pub fn active(&self) -> &Battlefield {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut Battlefield {
        &mut self.active
    }

    pub fn active_coord(&self) -> Position {
        self.active_coord
    }

    pub fn start_coord(&self) -> Position {
        self.start_coord
    }

    /// Seed the sector at `coord` is generated from
    pub fn sector_seed(&self, coord: Position) -> Option<u64> {
        self.index(coord).map(|i| self.sector_seeds[i])
    }

    /// Whether the sector was entered before (the active one counts)
    pub fn is_generated(&self, coord: Position) -> bool {
        coord == self.active_coord || self.index(coord).is_some_and(|i| self.parked[i].is_some())
    }

    /// Island RNG, for drivers that need randomness consistent with the snapshot
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Island RNG and active battlefield together
    pub fn active_with_rng(&mut self) -> (&mut Battlefield, &mut ChaCha8Rng) {
        (&mut self.active, &mut self.rng)
    }

    /// Move the squad into the neighbouring sector
    ///
    /// Refused while living enemies remain in a hostile sector. The squad
    /// enters along the edge facing the sector it came from.
    pub fn travel(&mut self, direction: Direction) -> Result<()> {
        if !self.active.is_friendly() && !self.active.soldiers_in_team(TeamId::ENEMY).is_empty() {
            return Err(SkirmishError::TravelBlocked);
        }
        let (dx, dy) = direction.delta();
        let target = self.active_coord.offset(dx, dy);
        let Some(target_index) = self.index(target) else {
            return Err(SkirmishError::OffIsland);
        };

        let ids = self.active.ids();
        let mut next = match self.parked[target_index].take() {
            Some(mut parked) => {
                let known = parked.ids();
                parked.set_ids(IdAllocator {
                    next_soldier: known.next_soldier.max(ids.next_soldier),
                    next_item: known.next_item.max(ids.next_item),
                });
                parked
            }
            None => self.build_sector(target, ids)?,
        };

        let mut squad = self.active.detach_team(TeamId::PLAYER);
        for soldier in &mut squad {
            soldier.refresh_aps();
        }
        let arrivals = squad.len();
        next.attach_soldiers(squad, direction.opposite());
        next.start_turn(TeamId::PLAYER);

        let previous = std::mem::replace(&mut self.active, next);
        if let Some(index) = self.index(self.active_coord) {
            self.parked[index] = Some(previous);
        }
        self.active_coord = target;

        tracing::info!("Squad of {} travelled {:?} to sector {}", arrivals, direction, target);
        Ok(())
    }

    fn index(&self, coord: Position) -> Option<usize> {
        let inside = coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.config.width
            && (coord.y as u32) < self.config.height;
        inside.then(|| coord.y as usize * self.config.width as usize + coord.x as usize)
    }

    /// Generation parameters for a sector, with coasts along the island border
    fn sector_generation(&self, coord: Position) -> GenerationConfig {
        let mut generation = self.config.generation.clone();
        generation.coasts = Direction::ALL
            .into_iter()
            .filter(|edge| {
                let (dx, dy) = edge.delta();
                self.index(coord.offset(dx, dy)).is_none()
            })
            .collect();
        generation
    }

    fn build_sector(&mut self, coord: Position, ids: IdAllocator) -> Result<Battlefield> {
        let seed = self.sector_seed(coord).ok_or(SkirmishError::OffIsland)?;
        let sector = generate_from_seed(&self.sector_generation(coord), seed);
        let friendly = coord == self.start_coord;

        let mut bf = Battlefield::from_sector(sector, friendly, ids, &mut self.rng);
        bf.set_interrupt_on_contact(self.config.interrupt_on_contact);
        if !friendly {
            let width = bf.grid.width as i32;
            bf.spawn_team(TeamId::ENEMY, self.config.enemies_per_sector, width / 2..width, &mut self.rng);
        }
        tracing::debug!("Sector {} generated (seed {}, friendly {})", coord, seed, friendly);
        Ok(bf)
    }

    /// Fresh squad lined up around the middle of the west edge
    fn recruit_squad(&mut self, bf: &mut Battlefield) -> Vec<Soldier> {
        let mut ids = bf.ids();
        let count = self.config.soldiers_per_team as i32;
        let top = bf.grid.height as i32 / 2 - count / 2;
        let squad = (0..count)
            .map(|i| {
                let attributes = SoldierAttributes::random(&mut self.rng);
                Soldier::new(ids.soldier(), TeamId::PLAYER, Position::new(0, top + i), attributes)
            })
            .collect();
        bf.set_ids(ids);
        squad
    }
}
