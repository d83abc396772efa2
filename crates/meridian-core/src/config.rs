//! Game setup parameters.

use std::path::Path;

use meridian_protocol::{CivId, Difficulty, TechId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub map_width: u32,
    pub map_height: u32,
    /// Total civilizations, including the player.
    pub civ_count: u8,
    /// Index of the human civilization; `None` runs every civilization as AI.
    pub player_civ: Option<u8>,
    /// Negative values are BC.
    pub starting_year: i32,
    pub starting_gold: i32,
    pub seed: u64,
    /// Share of trade converted to science; the rest becomes gold.
    pub science_percent: i32,
    pub victory_tech: TechId,
    pub ai_explore_radius: u32,
    pub ai_enemy_radius: u32,
    /// Pause between AI actions in the async driver.
    pub ai_step_delay_ms: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            map_width: 40,
            map_height: 25,
            civ_count: 4,
            player_civ: Some(0),
            starting_year: -4000,
            starting_gold: 50,
            seed: 0x5eed_cafe,
            science_percent: 60,
            victory_tech: TechId::new("space_flight"),
            ai_explore_radius: 8,
            ai_enemy_radius: 5,
            ai_step_delay_ms: 0,
        }
    }
}

impl GameSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings: GameSettings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_width < 8 || self.map_height < 8 {
            return Err(ConfigError::Invalid(format!(
                "map must be at least 8x8, got {}x{}",
                self.map_width, self.map_height
            )));
        }
        if !(1..=8).contains(&self.civ_count) {
            return Err(ConfigError::Invalid(format!(
                "civ_count must be 1..=8, got {}",
                self.civ_count
            )));
        }
        if let Some(player) = self.player_civ {
            if player >= self.civ_count {
                return Err(ConfigError::Invalid(format!(
                    "player_civ {player} out of range for {} civilizations",
                    self.civ_count
                )));
            }
        }
        if !(0..=100).contains(&self.science_percent) {
            return Err(ConfigError::Invalid(format!(
                "science_percent must be 0..=100, got {}",
                self.science_percent
            )));
        }
        Ok(())
    }

    pub fn is_human(&self, civ: CivId) -> bool {
        self.player_civ == Some(civ.0)
    }
}
