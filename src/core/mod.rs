pub mod config;
pub mod error;
pub mod types;

pub use config::{GenerationConfig, IslandConfig};
pub use error::{Result, SkirmishError};
pub use types::{Direction, ItemId, Position, SoldierId, TeamId};
