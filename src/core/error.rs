use thiserror::Error;

use crate::core::types::{ItemId, Position, SoldierId};

#[derive(Error, Debug)]
pub enum SkirmishError {
    #[error("Not enough action points: need {needed}, have {available}")]
    InsufficientAps { needed: u32, available: u32 },

    #[error("Destination {0} is not passable")]
    Impassable(Position),

    #[error("No route to {0}")]
    Unreachable(Position),

    #[error("Movement cost requested for impassable tile {0}")]
    ImpassableTile(Position),

    #[error("Inventory is full")]
    InventoryFull,

    #[error("Nothing to pick up")]
    NothingToPickUp,

    #[error("Item not found here: {0:?}")]
    ItemNotFound(ItemId),

    #[error("Inventory slot '{0}' is empty")]
    EmptySlot(char),

    #[error("Aim level must be 1..=4, got {0}")]
    InvalidAim(u8),

    #[error("Invalid target {0}")]
    InvalidTarget(Position),

    #[error("No soldier is currently acting")]
    NoCurrentSoldier,

    #[error("No soldier with id {0:?}")]
    SoldierNotFound(SoldierId),

    #[error("Soldier {0:?} cannot act now")]
    NotActingSoldier(SoldierId),

    #[error("Cannot leave the sector while enemies remain")]
    TravelBlocked,

    #[error("No sector in that direction")]
    OffIsland,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkirmishError>;
