//! Generation and island configuration
//!
//! Fixed combat rules live in `battle::constants`. Everything here shapes how
//! sectors are built and populated, and can be loaded from TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SkirmishError};
use crate::core::types::Direction;

/// Parameters for building a single sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Sector width in tiles
    pub width: u32,

    /// Sector height in tiles
    pub height: u32,

    /// Chance for an inland tile to start as a tree
    ///
    /// Trees cost 0.35 visibility each, so at 0.1 a clear line of sight
    /// rarely extends past ten tiles through woodland.
    pub tree_chance: f64,

    /// Edges that get a coastline
    pub coasts: Vec<Direction>,

    /// Width of the water band painted along each coast before perturbation
    pub coast_width: u32,

    /// Number of random circles flipped along each coastline
    pub coast_perturbations: u32,

    /// Number of houses to attempt
    pub houses: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 40,
            tree_chance: 0.1,
            coasts: Vec::new(),
            coast_width: 5,
            coast_perturbations: 40,
            houses: 3,
        }
    }
}

impl GenerationConfig {
    /// Open, featureless field of the given size
    pub fn open_field(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tree_chance: 0.0,
            coasts: Vec::new(),
            houses: 0,
            ..Self::default()
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.width < 3 || self.height < 3 {
            return Err(format!(
                "sector must be at least 3x3, got {}x{}",
                self.width, self.height
            ));
        }

        if !(0.0..=1.0).contains(&self.tree_chance) {
            return Err(format!("tree_chance ({}) must be within 0..=1", self.tree_chance));
        }

        // Opposite coasts must leave land in the middle
        if self.coast_width * 2 >= self.width.min(self.height) && !self.coasts.is_empty() {
            return Err(format!(
                "coast_width ({}) leaves no land on a {}x{} sector",
                self.coast_width, self.width, self.height
            ));
        }

        Ok(())
    }
}

/// Configuration for a whole island campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    /// Sectors along the x axis
    pub width: u32,

    /// Sectors along the y axis
    pub height: u32,

    /// Size of the player's squad
    pub soldiers_per_team: u32,

    /// Enemies spawned in every hostile sector
    pub enemies_per_sector: u32,

    /// Abort a move as soon as it reveals a new enemy
    pub interrupt_on_contact: bool,

    /// Template for every sector; coasts are filled in per sector
    pub generation: GenerationConfig,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            width: 3,
            height: 3,
            soldiers_per_team: 4,
            enemies_per_sector: 4,
            interrupt_on_contact: true,
            generation: GenerationConfig::default(),
        }
    }
}

impl IslandConfig {
    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("island needs at least one sector".into());
        }

        if self.soldiers_per_team == 0 {
            return Err("soldiers_per_team must be positive".into());
        }

        // Soldiers enter along one edge, one per row
        if self.soldiers_per_team > self.generation.height {
            return Err(format!(
                "soldiers_per_team ({}) exceeds sector height ({})",
                self.soldiers_per_team, self.generation.height
            ));
        }

        let mut generation = self.generation.clone();
        generation.coasts = Direction::ALL.to_vec();
        generation.validate()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: IslandConfig = toml::from_str(contents)?;
        config.validate().map_err(SkirmishError::InvalidConfig)?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(GenerationConfig::default().validate().is_ok());
        assert!(IslandConfig::default().validate().is_ok());
    }

    #[test]
    fn test_open_field_has_no_features() {
        let config = GenerationConfig::open_field(80, 40);
        assert_eq!(config.tree_chance, 0.0);
        assert_eq!(config.houses, 0);
        assert!(config.coasts.is_empty());
    }

    #[test]
    fn test_rejects_bad_tree_chance() {
        let config = GenerationConfig {
            tree_chance: 1.5,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_coast_swallowing_sector() {
        let config = GenerationConfig {
            width: 10,
            height: 10,
            coast_width: 5,
            coasts: vec![Direction::North],
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = IslandConfig::from_toml_str(
            r#"
            width = 2
            enemies_per_sector = 6

            [generation]
            houses = 1
            "#,
        )
        .expect("valid config");

        assert_eq!(config.width, 2);
        assert_eq!(config.height, 3);
        assert_eq!(config.enemies_per_sector, 6);
        assert_eq!(config.generation.houses, 1);
        assert_eq!(config.generation.width, 80);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = IslandConfig::from_toml_str("width = 0").unwrap_err();
        assert!(matches!(err, SkirmishError::InvalidConfig(_)));

        let err = IslandConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, SkirmishError::Toml(_)));
    }

    #[test]
    fn test_sample_config_file_parses() {
        let config = IslandConfig::load("data/island.toml").expect("sample config loads");
        assert!(config.validate().is_ok());
    }
}
