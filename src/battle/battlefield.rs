//! The battlefield aggregate
//!
//! Owns terrain, roster, ground items and the turn state. Moves and shots are
//! resolved one cell per step call so a collaborator can animate between
//! steps and react to first contact.
//!
//! Phase per soldier turn: `Idle -> AwaitingCommand -> {Moving | Shooting} -> Idle`.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Range;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    MAX_AIM_LEVEL, MAX_APS, MIN_AIM_LEVEL, PICKUP_AP_COST, SHOT_AP_COST, SHOT_DAMAGE, SHOT_MAX_CELLS,
    SHOT_MAX_RANGE,
};
use crate::battle::events::BattlefieldListener;
use crate::battle::generation::Sector;
use crate::battle::grid::Grid;
use crate::battle::items::{Item, ItemKind, WeaponKind};
use crate::battle::line;
use crate::battle::pathfinding;
use crate::battle::ranged::{block_probability, hit_probability, PendingShot, ShotOutcome, ShotStep};
use crate::battle::soldier::{Soldier, SoldierAttributes};
use crate::core::error::{Result, SkirmishError};
use crate::core::types::{Direction, ItemId, Position, SoldierId, TeamId};

/// What the acting soldier is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActorPhase {
    /// Last action resolved, or nobody is acting
    #[default]
    Idle,
    /// Soldier selected, nothing pending
    AwaitingCommand,
    Moving,
    Shooting,
}

/// Whether the encounter has a winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterStatus {
    Ongoing,
    Decided { winner: TeamId },
}

impl EncounterStatus {
    pub fn is_decided(&self) -> bool {
        matches!(self, EncounterStatus::Decided { .. })
    }
}

/// Result of one movement step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementStep {
    /// The soldier changed cell this step
    pub moved: bool,
    /// No APs left, or not enough for the next cell
    pub out_of_aps: bool,
    /// No move is pending any more
    pub finished: bool,
    /// The rest of the path was dropped because a new enemy came into view
    pub interrupted: bool,
    /// Enemies the mover's team sees now but did not before this step
    pub new_enemies: Vec<SoldierId>,
    /// Ground items the mover's team sees now but did not before this step
    pub new_items: Vec<ItemId>,
}

/// Identifier counters, shared across sectors so ids stay unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    pub next_soldier: u32,
    pub next_item: u32,
}

impl IdAllocator {
    pub fn soldier(&mut self) -> SoldierId {
        let id = SoldierId(self.next_soldier);
        self.next_soldier += 1;
        id
    }

    pub fn item(&mut self) -> ItemId {
        let id = ItemId(self.next_item);
        self.next_item += 1;
        id
    }
}

#[derive(Serialize, Deserialize)]
pub struct Battlefield {
    pub grid: Grid,
    soldiers: Vec<Soldier>,
    #[serde(with = "ground_stacks")]
    ground: BTreeMap<Position, Vec<Item>>,
    current_team: TeamId,
    current: Option<SoldierId>,
    phase: ActorPhase,
    move_path: Option<VecDeque<Position>>,
    shot: Option<PendingShot>,
    /// Scripted encounter: AP costs are ignored
    friendly: bool,
    interrupt_on_contact: bool,
    ids: IdAllocator,
    #[serde(skip)]
    listeners: Vec<Box<dyn BattlefieldListener>>,
}

/// Ground map as a list of `(cell, items)` pairs, since cells are not string keys
mod ground_stacks {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::battle::items::Item;
    use crate::core::types::Position;

    pub fn serialize<S: Serializer>(ground: &BTreeMap<Position, Vec<Item>>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(ground.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<Position, Vec<Item>>, D::Error> {
        let stacks: Vec<(Position, Vec<Item>)> = Vec::deserialize(deserializer)?;
        Ok(stacks.into_iter().collect())
    }
}

impl std::fmt::Debug for Battlefield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battlefield")
            .field("width", &self.grid.width)
            .field("height", &self.grid.height)
            .field("soldiers", &self.soldiers.len())
            .field("current_team", &self.current_team)
            .field("current", &self.current)
            .field("phase", &self.phase)
            .field("friendly", &self.friendly)
            .finish_non_exhaustive()
    }
}

impl Battlefield {
    pub fn new(grid: Grid, friendly: bool) -> Self {
        Self {
            grid,
            soldiers: Vec::new(),
            ground: BTreeMap::new(),
            current_team: TeamId::PLAYER,
            current: None,
            phase: ActorPhase::Idle,
            move_path: None,
            shot: None,
            friendly,
            interrupt_on_contact: true,
            ids: IdAllocator::default(),
            listeners: Vec::new(),
        }
    }

    /// Build from a generated sector, dropping a random weapon on its weapon spot
    pub fn from_sector(sector: Sector, friendly: bool, ids: IdAllocator, rng: &mut impl Rng) -> Self {
        let mut battlefield = Self::new(sector.grid, friendly);
        battlefield.ids = ids;
        if let Some(spot) = sector.weapon {
            let kind = *WeaponKind::ALL.choose(rng).unwrap_or(&WeaponKind::Rifle);
            battlefield.place_item(spot, ItemKind::Weapon(kind));
        }
        battlefield
    }

    pub fn is_friendly(&self) -> bool {
        self.friendly
    }

    pub fn set_interrupt_on_contact(&mut self, interrupt: bool) {
        self.interrupt_on_contact = interrupt;
    }

    pub fn ids(&self) -> IdAllocator {
        self.ids
    }

    pub fn set_ids(&mut self, ids: IdAllocator) {
        self.ids = ids;
    }

    /// Register a listener; it is told about the current soldier immediately
    pub fn add_listener(&mut self, mut listener: Box<dyn BattlefieldListener>) {
        listener.current_soldier_changed(self.current);
        self.listeners.push(listener);
    }

    fn notify_soldier_changed(&mut self) {
        let current = self.current;
        for listener in &mut self.listeners {
            listener.current_soldier_changed(current);
        }
    }

    fn notify_turn_ended(&mut self, next_team: TeamId) {
        for listener in &mut self.listeners {
            listener.turn_ended(next_team);
        }
    }

    // === SETUP ===

    /// Add a soldier on a passable cell
    ///
    /// The first soldier of the acting team becomes the current soldier.
    pub fn add_soldier(&mut self, team: TeamId, pos: Position, attributes: SoldierAttributes) -> Result<SoldierId> {
        if !self.passable(pos) {
            return Err(SkirmishError::Impassable(pos));
        }
        let id = self.ids.soldier();
        self.soldiers.push(Soldier::new(id, team, pos, attributes));
        self.select_if_idle(team);
        Ok(id)
    }

    /// Drop an item on the ground
    pub fn place_item(&mut self, pos: Position, kind: ItemKind) -> ItemId {
        let id = self.ids.item();
        self.ground.entry(pos).or_default().push(Item { id, kind });
        id
    }

    /// Put a new item straight into a soldier's inventory
    pub fn give_item(&mut self, soldier: SoldierId, kind: ItemKind) -> Result<ItemId> {
        let index = self
            .index_of(soldier)
            .ok_or(SkirmishError::SoldierNotFound(soldier))?;
        if self.soldiers[index].inventory_full() {
            return Err(SkirmishError::InventoryFull);
        }
        let id = self.ids.item();
        self.soldiers[index].add_item(Item { id, kind })?;
        Ok(id)
    }

    /// Spawn up to `count` random recruits on passable cells within `columns`
    pub fn spawn_team(&mut self, team: TeamId, count: u32, columns: Range<i32>, rng: &mut impl Rng) -> Vec<SoldierId> {
        let mut spawned = Vec::new();
        let columns = columns.start.max(0)..columns.end.min(self.grid.width as i32);
        if columns.is_empty() || self.grid.height == 0 {
            return spawned;
        }

        let free = columns
            .clone()
            .flat_map(|x| (0..self.grid.height as i32).map(move |y| Position::new(x, y)))
            .filter(|p| self.passable(*p))
            .count();
        let wanted = (count as usize).min(free);
        let mut attempts = wanted.saturating_mul(50);
        while spawned.len() < wanted && attempts > 0 {
            attempts -= 1;
            let pos = Position::new(
                rng.gen_range(columns.clone()),
                rng.gen_range(0..self.grid.height as i32),
            );
            if !self.passable(pos) {
                continue;
            }
            let attributes = SoldierAttributes::random(rng);
            if let Ok(id) = self.add_soldier(team, pos, attributes) {
                spawned.push(id);
            }
        }

        if spawned.len() < count as usize {
            tracing::warn!("Spawned only {} of {} soldiers for {:?}", spawned.len(), count, team);
        }
        spawned
    }

    /// Take every soldier of a team off this battlefield
    pub fn detach_team(&mut self, team: TeamId) -> Vec<Soldier> {
        self.clear_pending();
        let (leaving, staying): (Vec<_>, Vec<_>) = std::mem::take(&mut self.soldiers)
            .into_iter()
            .partition(|s| s.team == team);
        self.soldiers = staying;

        if self.current.is_some_and(|id| self.index_of(id).is_none()) {
            self.current = None;
            self.phase = ActorPhase::Idle;
            self.notify_soldier_changed();
        }
        leaving
    }

    /// Bring soldiers in along an edge, keeping their identity and state
    ///
    /// Living soldiers are placed on the nearest free cell to where they
    /// stood along that edge; dead ones just rejoin the roster.
    pub fn attach_soldiers(&mut self, soldiers: Vec<Soldier>, edge: Direction) {
        for mut soldier in soldiers {
            if soldier.alive() {
                match self.entry_cell(edge, soldier.position) {
                    Some(pos) => soldier.position = pos,
                    None => tracing::warn!("No entry cell for {:?} on {:?} edge", soldier.id, edge),
                }
            }
            self.ids.next_soldier = self.ids.next_soldier.max(soldier.id.0 + 1);
            for item in soldier.inventory.values() {
                self.ids.next_item = self.ids.next_item.max(item.id.0 + 1);
            }
            let team = soldier.team;
            self.soldiers.push(soldier);
            self.select_if_idle(team);
        }
    }

    fn entry_cell(&self, edge: Direction, previous: Position) -> Option<Position> {
        let (w, h) = (self.grid.width as i32, self.grid.height as i32);
        let (along_len, depth_len, preferred) = match edge {
            Direction::North | Direction::South => (w, h, previous.x),
            Direction::East | Direction::West => (h, w, previous.y),
        };
        let preferred = preferred.clamp(0, (along_len - 1).max(0));

        for depth in 0..depth_len {
            for spread in 0..along_len {
                for along in [preferred - spread, preferred + spread] {
                    if along < 0 || along >= along_len {
                        continue;
                    }
                    let pos = match edge {
                        Direction::North => Position::new(along, depth),
                        Direction::South => Position::new(along, h - 1 - depth),
                        Direction::West => Position::new(depth, along),
                        Direction::East => Position::new(w - 1 - depth, along),
                    };
                    if self.passable(pos) {
                        return Some(pos);
                    }
                }
            }
        }
        None
    }

    fn select_if_idle(&mut self, team: TeamId) {
        if self.current.is_none() && team == self.current_team {
            self.current = self.first_living(team);
            if self.current.is_some() {
                self.phase = ActorPhase::AwaitingCommand;
                self.notify_soldier_changed();
            }
        }
    }

    // === QUERIES ===

    /// Terrain is open and no living soldier stands here
    pub fn passable(&self, pos: Position) -> bool {
        self.grid.tile(pos).is_some_and(|t| t.is_open()) && self.soldier_at(pos).is_none()
    }

    /// AP cost of stepping onto a cell
    ///
    /// Asking for an impassable cell is a caller bug and yields
    /// `ImpassableTile`.
    pub fn movement_cost(&self, pos: Position) -> Result<u32> {
        match self.grid.tile(pos) {
            Some(tile) if self.passable(pos) => Ok(tile.base.movement_cost()),
            _ => Err(SkirmishError::ImpassableTile(pos)),
        }
    }

    /// Living soldier on a cell
    pub fn soldier_at(&self, pos: Position) -> Option<&Soldier> {
        self.soldiers.iter().find(|s| s.alive() && s.position == pos)
    }

    /// Any soldier on the roster, dead or alive
    pub fn soldier(&self, id: SoldierId) -> Option<&Soldier> {
        self.soldiers.iter().find(|s| s.id == id)
    }

    /// Full roster in join order
    pub fn soldiers(&self) -> &[Soldier] {
        &self.soldiers
    }

    /// Living members of a team
    pub fn soldiers_in_team(&self, team: TeamId) -> Vec<&Soldier> {
        self.soldiers
            .iter()
            .filter(|s| s.team == team && s.alive())
            .collect()
    }

    pub fn items_at(&self, pos: Position) -> &[Item] {
        self.ground.get(&pos).map_or(&[], |items| items.as_slice())
    }

    /// Every stack of items on the ground
    pub fn ground_items(&self) -> impl Iterator<Item = (Position, &[Item])> {
        self.ground
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(pos, items)| (*pos, items.as_slice()))
    }

    pub fn distance(&self, from: Position, to: Position) -> f32 {
        from.euclidean(&to)
    }

    pub fn current_team(&self) -> TeamId {
        self.current_team
    }

    pub fn current_soldier(&self) -> Option<&Soldier> {
        self.current.and_then(|id| self.soldier(id))
    }

    pub fn phase(&self) -> ActorPhase {
        self.phase
    }

    /// Remaining cells of the pending move, the mover's own cell first
    pub fn pending_move(&self) -> Option<&VecDeque<Position>> {
        self.move_path.as_ref()
    }

    pub fn pending_shot(&self) -> Option<&PendingShot> {
        self.shot.as_ref()
    }

    pub fn encounter_status(&self) -> EncounterStatus {
        let player_alive = !self.soldiers_in_team(TeamId::PLAYER).is_empty();
        let enemy_alive = !self.soldiers_in_team(TeamId::ENEMY).is_empty();
        match (player_alive, enemy_alive) {
            (true, false) => EncounterStatus::Decided { winner: TeamId::PLAYER },
            (false, true) => EncounterStatus::Decided { winner: TeamId::ENEMY },
            _ => EncounterStatus::Ongoing,
        }
    }

    /// Cheapest 8-neighbour route over passable cells
    pub fn path(&self, from: Position, to: Position) -> Option<Vec<Position>> {
        if !self.passable(to) {
            return None;
        }
        pathfinding::solve(
            from,
            |p| {
                self.grid
                    .neighbors8(*p)
                    .filter(|q| self.passable(*q))
                    .collect::<Vec<_>>()
            },
            |_, q| {
                self.grid
                    .tile(*q)
                    .map_or(pathfinding::Cost::MAX / 2, |t| t.base.movement_cost() as pathfinding::Cost)
            },
            pathfinding::manhattan(to),
            pathfinding::goal_at(to),
        )
    }

    /// AP cost of walking a path (its first cell is where the walker stands)
    pub fn path_cost(&self, path: &[Position]) -> u32 {
        path.iter()
            .skip(1)
            .filter_map(|p| self.grid.tile(*p))
            .map(|t| t.base.movement_cost())
            .sum()
    }

    pub(crate) fn index_of(&self, id: SoldierId) -> Option<usize> {
        self.soldiers.iter().position(|s| s.id == id)
    }

    fn first_living(&self, team: TeamId) -> Option<SoldierId> {
        self.soldiers
            .iter()
            .find(|s| s.team == team && s.alive())
            .map(|s| s.id)
    }

    /// Index of the current soldier, if alive
    fn acting_index(&self) -> Result<usize> {
        let id = self.current.ok_or(SkirmishError::NoCurrentSoldier)?;
        let index = self.index_of(id).ok_or(SkirmishError::NoCurrentSoldier)?;
        if !self.soldiers[index].alive() {
            return Err(SkirmishError::NotActingSoldier(id));
        }
        Ok(index)
    }

    fn clear_pending(&mut self) {
        self.move_path = None;
        self.shot = None;
    }

    // === COMMANDS ===

    /// Make a living soldier of the acting team the current soldier
    pub fn set_current_soldier(&mut self, id: SoldierId) -> Result<()> {
        let acceptable = self
            .soldier(id)
            .is_some_and(|s| s.alive() && s.team == self.current_team);
        if !acceptable {
            return Err(SkirmishError::NotActingSoldier(id));
        }
        self.clear_pending();
        self.current = Some(id);
        self.phase = ActorPhase::AwaitingCommand;
        self.notify_soldier_changed();
        Ok(())
    }

    /// Plan a move for the current soldier
    ///
    /// Rejected destinations leave any pending action untouched.
    pub fn move_to(&mut self, target: Position) -> Result<()> {
        let index = self.acting_index()?;
        if !self.passable(target) {
            return Err(SkirmishError::Impassable(target));
        }
        let from = self.soldiers[index].position;
        let path = self.path(from, target).ok_or(SkirmishError::Unreachable(target))?;

        tracing::debug!(
            "{:?} plans {} steps to {} costing {} AP",
            self.soldiers[index].id,
            path.len() - 1,
            target,
            self.path_cost(&path)
        );

        self.shot = None;
        self.move_path = Some(path.into());
        self.phase = ActorPhase::Moving;
        Ok(())
    }

    /// Resolve one cell of the pending move
    ///
    /// # Panics
    ///
    /// If the head of the pending path is not the mover's cell. That means
    /// the path was corrupted, not that a command was refused.
    pub fn advance_movement(&mut self) -> MovementStep {
        let mut step = MovementStep::default();

        let Some(mut path) = self.move_path.take() else {
            step.finished = true;
            return step;
        };
        let Ok(index) = self.acting_index() else {
            step.finished = true;
            self.phase = ActorPhase::Idle;
            return step;
        };

        let head = path.pop_front();
        let mover_pos = self.soldiers[index].position;
        assert_eq!(head, Some(mover_pos), "pending path does not start at the mover");

        let Some(&next) = path.front() else {
            step.finished = true;
            self.phase = ActorPhase::Idle;
            return step;
        };

        let cost = match self.movement_cost(next) {
            Ok(_) if self.friendly => 0,
            Ok(cost) => cost,
            Err(err) => {
                tracing::warn!("Move aborted: {}", err);
                step.finished = true;
                self.phase = ActorPhase::Idle;
                return step;
            }
        };

        if self.soldiers[index].current_aps < cost {
            step.out_of_aps = true;
            step.finished = true;
            self.phase = ActorPhase::Idle;
            return step;
        }

        let team = self.soldiers[index].team;
        let enemies_before: BTreeSet<SoldierId> = self.soldiers_seen_by(team).into_iter().collect();
        let items_before = self.item_ids_seen_by_team(team);

        self.soldiers[index].spend_aps(cost);
        self.soldiers[index].position = next;
        step.moved = true;

        step.new_enemies = self
            .soldiers_seen_by(team)
            .into_iter()
            .filter(|id| !enemies_before.contains(id))
            .collect();
        step.new_items = self
            .item_ids_seen_by_team(team)
            .into_iter()
            .filter(|id| !items_before.contains(id))
            .collect();
        step.out_of_aps = !self.friendly && self.soldiers[index].current_aps == 0;

        let contact = !step.new_enemies.is_empty() && self.interrupt_on_contact;
        if path.len() <= 1 || contact {
            step.finished = true;
            step.interrupted = contact && path.len() > 1;
            self.phase = ActorPhase::Idle;
            if step.interrupted {
                tracing::debug!("{:?} stops moving: enemy sighted", self.soldiers[index].id);
            }
        } else {
            self.move_path = Some(path);
        }

        step
    }

    /// Fire at a cell with the current soldier
    pub fn shoot(&mut self, target: Position, aim: u8) -> Result<()> {
        if !(MIN_AIM_LEVEL..=MAX_AIM_LEVEL).contains(&aim) {
            return Err(SkirmishError::InvalidAim(aim));
        }
        let index = self.acting_index()?;
        let from = self.soldiers[index].position;
        if target == from || !self.grid.in_bounds(target) {
            return Err(SkirmishError::InvalidTarget(target));
        }

        if !self.friendly {
            let available = self.soldiers[index].current_aps;
            if !self.soldiers[index].spend_aps(SHOT_AP_COST) {
                return Err(SkirmishError::InsufficientAps {
                    needed: SHOT_AP_COST,
                    available,
                });
            }
        }

        let trace: VecDeque<Position> = line::trace(from, target)
            .into_iter()
            .skip(1)
            .take(SHOT_MAX_CELLS)
            .map(|p| p.pos)
            .collect();

        tracing::debug!("{:?} fires at {} (aim {})", self.soldiers[index].id, target, aim);

        self.move_path = None;
        self.shot = Some(PendingShot {
            shooter: self.soldiers[index].id,
            trace,
            travelled: 0,
        });
        self.phase = ActorPhase::Shooting;
        Ok(())
    }

    /// Resolve one cell of the pending shot; `None` when no shot is pending
    pub fn advance_shot(&mut self, rng: &mut impl Rng) -> Option<ShotStep> {
        let (at, distance, last_cell) = {
            let shot = self.shot.as_mut()?;
            let Some(at) = shot.trace.pop_front() else {
                self.shot = None;
                self.phase = ActorPhase::Idle;
                return None;
            };
            shot.travelled += 1;
            (at, shot.travelled, shot.trace.is_empty())
        };

        let outcome = if distance > SHOT_MAX_RANGE {
            ShotOutcome::Missed
        } else if let Some(victim) = self.soldier_at(at).map(|s| s.id) {
            if rng.gen_bool(hit_probability(distance)) {
                let killed = self.apply_hit(victim);
                ShotOutcome::Hit { victim, killed }
            } else {
                ShotOutcome::InFlight
            }
        } else {
            let overlay = self.grid.tile(at).map(|t| t.overlay).unwrap_or_default();
            let chance = block_probability(overlay, distance);
            if chance > 0.0 && rng.gen_bool(chance) {
                ShotOutcome::Blocked
            } else {
                ShotOutcome::InFlight
            }
        };

        let outcome = match outcome {
            ShotOutcome::InFlight if last_cell => ShotOutcome::Missed,
            other => other,
        };
        if outcome != ShotOutcome::InFlight {
            self.shot = None;
            self.phase = ActorPhase::Idle;
        }

        Some(ShotStep { at, outcome })
    }

    fn apply_hit(&mut self, victim: SoldierId) -> bool {
        let Some(index) = self.index_of(victim) else {
            return false;
        };
        let soldier = &mut self.soldiers[index];
        let killed = soldier.take_damage(SHOT_DAMAGE);
        tracing::info!(
            "{} ({:?}) hit, health now {}{}",
            soldier.attributes.name,
            soldier.id,
            soldier.attributes.health,
            if killed { ", killed" } else { "" }
        );
        killed
    }

    /// Pick an item up from the current soldier's cell
    pub fn pickup(&mut self, item: ItemId) -> Result<char> {
        let index = self.acting_index()?;
        let pos = self.soldiers[index].position;

        let stack = self.items_at(pos);
        if stack.is_empty() {
            return Err(SkirmishError::NothingToPickUp);
        }
        let Some(item_index) = stack.iter().position(|i| i.id == item) else {
            return Err(SkirmishError::ItemNotFound(item));
        };

        let available = self.soldiers[index].current_aps;
        if !self.friendly && available < PICKUP_AP_COST {
            return Err(SkirmishError::InsufficientAps {
                needed: PICKUP_AP_COST,
                available,
            });
        }
        if self.soldiers[index].inventory_full() {
            return Err(SkirmishError::InventoryFull);
        }

        let Some(stack) = self.ground.get_mut(&pos) else {
            return Err(SkirmishError::NothingToPickUp);
        };
        let picked = stack.remove(item_index);
        if stack.is_empty() {
            self.ground.remove(&pos);
        }

        if !self.friendly {
            self.soldiers[index].spend_aps(PICKUP_AP_COST);
        }
        self.soldiers[index].add_item(picked)
    }

    /// Drop an item from the current soldier's inventory onto their cell
    pub fn drop_item(&mut self, slot: char) -> Result<ItemId> {
        let index = self.acting_index()?;
        let item = self.soldiers[index].remove_item(slot)?;
        let pos = self.soldiers[index].position;
        self.ground.entry(pos).or_default().push(item);
        Ok(item.id)
    }

    /// Hand the turn to the other team
    ///
    /// If the other team has nobody left standing the encounter is decided
    /// and the turn does not pass.
    pub fn end_turn(&mut self) -> EncounterStatus {
        self.clear_pending();

        let next_team = self.current_team.opponent();
        if self.soldiers_in_team(next_team).is_empty() {
            self.phase = ActorPhase::Idle;
            return EncounterStatus::Decided {
                winner: self.current_team,
            };
        }

        self.current_team = next_team;
        if next_team == TeamId::PLAYER {
            // New round: everyone left standing recovers
            for soldier in self.soldiers.iter_mut().filter(|s| s.alive()) {
                soldier.refresh_aps();
            }
        }
        self.start_turn(next_team);
        self.notify_turn_ended(next_team);

        tracing::debug!("Turn passes to {:?}", next_team);
        EncounterStatus::Ongoing
    }

    /// Give the turn to a team without ending anyone's turn
    pub fn start_turn(&mut self, team: TeamId) {
        self.clear_pending();
        self.current_team = team;
        self.current = self.first_living(team);
        self.phase = if self.current.is_some() {
            ActorPhase::AwaitingCommand
        } else {
            ActorPhase::Idle
        };
        self.notify_soldier_changed();
    }

    /// Test and replay hook: set a soldier's APs directly
    pub fn set_aps(&mut self, id: SoldierId, aps: u32) {
        if let Some(index) = self.index_of(id) {
            let soldier = &mut self.soldiers[index];
            soldier.current_aps = if soldier.alive() {
                aps.min(MAX_APS)
            } else {
                0
            };
        }
    }
}
