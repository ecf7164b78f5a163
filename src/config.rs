//! Match and runner configuration.
//!
//! Both structs deserialize from JSON with every field optional, so a config
//! file only needs to name what it overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Configuration for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Seed for the match RNG. Same seed and responses give the same match.
    pub seed: u64,
    /// Turn limit; afterwards the healthier queen wins.
    pub max_turns: u32,
    /// Obstacle pair count N; the generator places N-1 mirrored pairs.
    pub obstacle_pairs: u32,
    /// Layouts tried before map generation gives up.
    pub map_attempts: u32,
    /// Relaxation passes per layout before it is discarded.
    pub relaxation_passes: u32,
    /// Resources each player starts with.
    pub starting_resources: i32,
    /// Starting queen health.
    pub queen_health: i32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_turns: 200,
            obstacle_pairs: 8,
            map_attempts: 64,
            relaxation_passes: 100,
            starting_resources: 100,
            queen_health: 100,
        }
    }
}

impl MatchConfig {
    /// Default config with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    /// Load overrides from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.obstacle_pairs < 1 {
            return Err(SimError::InvalidConfig("obstacle_pairs must be at least 1".into()));
        }
        if self.map_attempts == 0 {
            return Err(SimError::InvalidConfig("map_attempts must be at least 1".into()));
        }
        if self.relaxation_passes == 0 {
            return Err(SimError::InvalidConfig("relaxation_passes must be at least 1".into()));
        }
        if self.queen_health <= 0 {
            return Err(SimError::InvalidConfig("queen_health must be positive".into()));
        }
        Ok(())
    }
}

/// Configuration for driving external bot processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Response deadline for the first turn (includes bot start-up).
    pub first_turn_timeout_ms: u64,
    /// Response deadline for every later turn.
    pub turn_timeout_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            first_turn_timeout_ms: 1000,
            turn_timeout_ms: 50,
        }
    }
}

impl RunnerConfig {
    /// Deadline for the given turn (1-based).
    pub fn timeout_for_turn(&self, turn: u32) -> Duration {
        if turn <= 1 {
            Duration::from_millis(self.first_turn_timeout_ms)
        } else {
            Duration::from_millis(self.turn_timeout_ms)
        }
    }
}
