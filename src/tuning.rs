//! Data-driven game balance
//!
//! Every number that shapes difficulty lives here so it can be tweaked from a
//! JSON file without touching the simulation.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unreadable or rejected tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("could not read tuning file: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("points_per_level must be non-zero")]
    ZeroPointsPerLevel,
    #[error("min_spawn_interval_ticks ({min}) exceeds base_spawn_interval_ticks ({base})")]
    SpawnIntervalRange { min: u32, base: u32 },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Max horizontal player speed when steering toward a target (field widths/sec)
    pub player_speed: f32,
    /// Score for each asteroid that leaves the bottom of the field
    pub dodge_points: u32,
    /// Score needed per level
    pub points_per_level: u32,
    pub max_level: u32,

    /// Ticks between spawns at level 1
    pub base_spawn_interval_ticks: u32,
    /// Fastest spawn rate at any level
    pub min_spawn_interval_ticks: u32,
    /// Spawn interval reduction per level
    pub spawn_interval_step_ticks: u32,

    /// Fall speed at level 1 (field heights/sec)
    pub base_asteroid_speed: f32,
    /// Added fall speed per level
    pub asteroid_speed_step: f32,
    /// Random speed spread (fraction of the level speed, +/-)
    pub speed_jitter: f32,

    pub base_max_asteroids: u32,
    pub max_asteroids_step: u32,
    pub max_asteroids_cap: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 1.6,
            dodge_points: 10,
            points_per_level: 100,
            max_level: 20,

            base_spawn_interval_ticks: 45,
            min_spawn_interval_ticks: 10,
            spawn_interval_step_ticks: 3,

            base_asteroid_speed: 0.35,
            asteroid_speed_step: 0.05,
            speed_jitter: 0.25,

            base_max_asteroids: 6,
            max_asteroids_step: 1,
            max_asteroids_cap: 20,
        }
    }
}

/// Difficulty derived for a single level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelParams {
    pub spawn_interval_ticks: u32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub max_asteroids: u32,
}

impl Tuning {
    /// Check the values make a playable game
    pub fn validate(&self) -> Result<(), TuningError> {
        for (field, value) in [
            ("player_speed", self.player_speed),
            ("base_asteroid_speed", self.base_asteroid_speed),
            ("asteroid_speed_step", self.asteroid_speed_step),
            ("speed_jitter", self.speed_jitter),
        ] {
            if !value.is_finite() {
                return Err(TuningError::NonFinite { field, value });
            }
        }
        for (field, value) in [
            ("player_speed", self.player_speed),
            ("base_asteroid_speed", self.base_asteroid_speed),
        ] {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        if self.points_per_level == 0 {
            return Err(TuningError::ZeroPointsPerLevel);
        }
        if self.min_spawn_interval_ticks > self.base_spawn_interval_ticks {
            return Err(TuningError::SpawnIntervalRange {
                min: self.min_spawn_interval_ticks,
                base: self.base_spawn_interval_ticks,
            });
        }
        // Fastest level must still have a drawable speed range
        let hardest = self.level(self.max_level);
        if !hardest.max_speed.is_finite() {
            return Err(TuningError::NonFinite {
                field: "max_speed",
                value: hardest.max_speed,
            });
        }
        Ok(())
    }

    /// Level reached with a given score (1-based, capped at `max_level`)
    pub fn level_for_score(&self, score: u32) -> u32 {
        let per_level = self.points_per_level.max(1);
        (1 + score / per_level).min(self.max_level.max(1))
    }

    /// Difficulty parameters for a level (levels below 1 are treated as 1)
    pub fn level(&self, level: u32) -> LevelParams {
        let steps = level.max(1) - 1;

        let spawn_interval_ticks = self
            .base_spawn_interval_ticks
            .saturating_sub(steps.saturating_mul(self.spawn_interval_step_ticks))
            .max(self.min_spawn_interval_ticks)
            .max(1);

        let speed = self.base_asteroid_speed + steps as f32 * self.asteroid_speed_step.max(0.0);
        let jitter = self.speed_jitter.clamp(0.0, 0.9);

        let max_asteroids = self
            .base_max_asteroids
            .saturating_add(steps.saturating_mul(self.max_asteroids_step))
            .min(self.max_asteroids_cap)
            .max(1);

        LevelParams {
            spawn_interval_ticks,
            min_speed: speed * (1.0 - jitter),
            max_speed: speed * (1.0 + jitter),
            max_asteroids,
        }
    }

    /// Parse tuning from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a plain JSON tuning file, `Ok(None)` if it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>, TuningError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
