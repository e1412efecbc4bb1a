//! Items that can lie on the ground or be carried

use serde::{Deserialize, Serialize};

use crate::core::types::ItemId;

/// Ranged weapon catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Rifle,
    Carbine,
    Pistol,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Rifle, WeaponKind::Carbine, WeaponKind::Pistol];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::Rifle => "Assault Rifle",
            WeaponKind::Carbine => "Carbine",
            WeaponKind::Pistol => "Pistol",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon(WeaponKind),
    /// Ammunition for the given weapon
    Clip(WeaponKind),
}

impl ItemKind {
    pub fn is_weapon(&self) -> bool {
        matches!(self, ItemKind::Weapon(_))
    }
}

/// An item instance; two items of the same kind are still distinct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
}

impl Item {
    pub fn name(&self) -> String {
        match self.kind {
            ItemKind::Weapon(weapon) => weapon.name().to_string(),
            ItemKind::Clip(weapon) => format!("{} Clip", weapon.name()),
        }
    }
}
