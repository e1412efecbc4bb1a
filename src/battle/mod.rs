//! Tactical battlefield: terrain, soldiers, movement, shooting and sight
//!
//! Everything here is single-threaded and step-driven. Commands validate and
//! queue an action; step calls resolve it one cell at a time.

pub mod ai;
pub mod battlefield;
pub mod constants;
pub mod events;
pub mod generation;
pub mod grid;
pub mod items;
pub mod line;
pub mod pathfinding;
pub mod ranged;
pub mod soldier;
pub mod terrain;
pub mod visibility;

pub use ai::{Personality, TeamAgent};
pub use battlefield::{ActorPhase, Battlefield, EncounterStatus, IdAllocator, MovementStep};
pub use events::{BattlefieldEvent, BattlefieldListener, EventRecorder};
pub use generation::{generate_from_seed, generate_sector, Sector};
pub use grid::Grid;
pub use items::{Item, ItemKind, WeaponKind};
pub use line::{trace, TracePoint};
pub use ranged::{PendingShot, ShotOutcome, ShotStep};
pub use soldier::{Soldier, SoldierAttributes};
pub use terrain::{Overlay, Tile, TileBase};
