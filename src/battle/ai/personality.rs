//! Fixed per-encounter temperament of an agent-controlled soldier

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    /// Ranks cover candidates by the worst cover against any visible enemy
    Defensive,
    /// Ranks cover candidates by the best shot at any visible enemy
    Offensive,
}

impl Personality {
    /// Even odds between the two
    pub fn random(rng: &mut impl Rng) -> Self {
        if rng.gen_bool(0.5) {
            Personality::Defensive
        } else {
            Personality::Offensive
        }
    }
}
