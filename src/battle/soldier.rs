//! Soldiers: attributes, action points and inventory
//!
//! Death is a state, not a removal. Dead soldiers keep their roster entry
//! with zero health and zero APs.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    HEALTH_RANGE, INVENTORY_SLOTS, MAX_APS, MAX_AP_CARRY_OVER, STAMINA_RANGE,
};
use crate::battle::items::Item;
use crate::core::error::{Result, SkirmishError};
use crate::core::types::{Position, SoldierId, TeamId};

const NAMES: &[&str] = &[
    "Anders", "Baker", "Castillo", "Dietrich", "Evans", "Farkas", "Garcia", "Haas", "Ivanov",
    "Jensen", "Kowalski", "Laine", "Moreau", "Novak", "Okafor", "Petrov", "Quinn", "Rossi",
    "Sato", "Tanaka", "Umberto", "Varga", "Weber", "Xu", "Yilmaz", "Zeller",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldierAttributes {
    pub name: String,
    pub stamina: u32,
    pub health: u32,
}

impl SoldierAttributes {
    pub fn new(name: impl Into<String>, stamina: u32, health: u32) -> Self {
        Self {
            name: name.into(),
            stamina,
            health,
        }
    }

    /// Roll a fresh recruit
    pub fn random(rng: &mut impl Rng) -> Self {
        let name = NAMES.choose(rng).copied().unwrap_or("Recruit");
        Self {
            name: name.to_string(),
            stamina: rng.gen_range(STAMINA_RANGE),
            health: rng.gen_range(HEALTH_RANGE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soldier {
    pub id: SoldierId,
    pub position: Position,
    pub team: TeamId,
    pub attributes: SoldierAttributes,
    pub current_aps: u32,
    pub inventory: BTreeMap<char, Item>,
    pub wielded: Option<char>,
}

impl Soldier {
    pub fn new(id: SoldierId, team: TeamId, position: Position, attributes: SoldierAttributes) -> Self {
        let mut soldier = Self {
            id,
            position,
            team,
            attributes,
            current_aps: 0,
            inventory: BTreeMap::new(),
            wielded: None,
        };
        soldier.current_aps = soldier.base_aps().min(MAX_APS);
        if !soldier.alive() {
            soldier.current_aps = 0;
        }
        soldier
    }

    pub fn alive(&self) -> bool {
        self.attributes.health > 0
    }

    /// APs granted per turn before any carry-over
    pub fn base_aps(&self) -> u32 {
        self.attributes.stamina * MAX_APS / 100
    }

    /// Start-of-turn refresh with up to 5 leftover APs carried over
    pub fn refresh_aps(&mut self) {
        if !self.alive() {
            self.current_aps = 0;
            return;
        }
        let carried = self.current_aps.min(MAX_AP_CARRY_OVER);
        self.current_aps = (self.base_aps() + carried).min(MAX_APS);
    }

    /// Spend APs if available. Returns false and spends nothing otherwise.
    pub fn spend_aps(&mut self, cost: u32) -> bool {
        if self.current_aps < cost {
            return false;
        }
        self.current_aps -= cost;
        true
    }

    /// Apply damage. Returns true if this killed the soldier.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_alive = self.alive();
        self.attributes.health = self.attributes.health.saturating_sub(amount);
        if !self.alive() {
            self.current_aps = 0;
        }
        was_alive && !self.alive()
    }

    pub fn inventory_full(&self) -> bool {
        self.inventory.len() >= INVENTORY_SLOTS.len()
    }

    /// Store an item in the first free slot
    ///
    /// The first weapon stored while nothing is wielded gets wielded.
    pub fn add_item(&mut self, item: Item) -> Result<char> {
        let slot = INVENTORY_SLOTS
            .chars()
            .find(|c| !self.inventory.contains_key(c))
            .ok_or(SkirmishError::InventoryFull)?;

        if self.wielded.is_none() && item.kind.is_weapon() {
            self.wielded = Some(slot);
        }
        self.inventory.insert(slot, item);
        Ok(slot)
    }

    pub fn remove_item(&mut self, slot: char) -> Result<Item> {
        let item = self
            .inventory
            .remove(&slot)
            .ok_or(SkirmishError::EmptySlot(slot))?;
        if self.wielded == Some(slot) {
            self.wielded = None;
        }
        Ok(item)
    }

    pub fn wielded_item(&self) -> Option<&Item> {
        self.wielded.and_then(|slot| self.inventory.get(&slot))
    }
}
