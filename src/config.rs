//! Scheduler configuration.
//!
//! Loaded from TOML (all keys optional) or built in code:
//!
//! ```toml
//! max_backtracks = 8
//! slot_buffer_ms = 300000
//!
//! [objective]
//! track_cohesion = 2
//! room_fit = 1
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Configuration for one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum undo-and-retry steps before reporting failure.
    pub max_backtracks: usize,
    /// Gap a presenter needs between talks (ms). Slots closer than this
    /// conflict for shared presenters.
    pub slot_buffer_ms: i64,
    /// Soft-objective weights used to order tied candidates.
    pub objective: ObjectiveWeights,
}

/// Weights of the soft objectives.
///
/// Each candidate (room, slot) gets a penalty
/// `track_cohesion * new_room_for_track + room_fit * undersized_room`;
/// lower penalties are tried first. Zero disables an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    /// Penalty for opening a room the paper's track has not used yet.
    pub track_cohesion: u32,
    /// Penalty for a room smaller than the expected attendance.
    pub room_fit: u32,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            track_cohesion: 1,
            room_fit: 1,
        }
    }
}

impl ObjectiveWeights {
    /// Weights that disable every soft objective.
    pub fn none() -> Self {
        Self {
            track_cohesion: 0,
            room_fit: 0,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_backtracks: 8,
            slot_buffer_ms: 0,
            objective: ObjectiveWeights::default(),
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backtracking bound.
    pub fn with_max_backtracks(mut self, max_backtracks: usize) -> Self {
        self.max_backtracks = max_backtracks;
        self
    }

    /// Sets the presenter buffer between slots.
    pub fn with_slot_buffer(mut self, slot_buffer_ms: i64) -> Self {
        self.slot_buffer_ms = slot_buffer_ms;
        self
    }

    /// Sets the soft-objective weights.
    pub fn with_objective(mut self, objective: ObjectiveWeights) -> Self {
        self.objective = objective;
        self
    }

    /// Parses a TOML document and validates it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Rejects values the engine cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_buffer_ms < 0 {
            return Err(ConfigError::Invalid(format!(
                "slot_buffer_ms must be >= 0, got {}",
                self.slot_buffer_ms
            )));
        }
        Ok(())
    }
}
