//! Computer opponent for one team
//!
//! Each controlled soldier gets a fixed personality that picks how cover
//! candidates are ranked; shooting is the same for both.

mod agent;
mod personality;
pub mod scoring;

pub use agent::{SoldierActivity, TeamAgent};
pub use personality::Personality;
