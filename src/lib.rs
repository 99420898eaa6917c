//! Space Dodger - a dodge-the-asteroids arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, game state)
//! - `viewmodel`: Observable state holder driven by the UI/frame loop
//! - `persistence`: Versioned JSON saves with backup rotation
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod viewmodel;

pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;
pub use viewmodel::{GameViewModel, SubscriptionId};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the accumulator will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player start position (normalized; y grows downward)
    pub const PLAYER_START_X: f32 = 0.5;
    pub const PLAYER_START_Y: f32 = 0.8;
    /// Player hit circle radius (normalized)
    pub const PLAYER_RADIUS: f32 = 0.04;

    /// Asteroid radius at size 1.0 (normalized)
    pub const ASTEROID_BASE_RADIUS: f32 = 0.035;
    pub const ASTEROID_MIN_SIZE: f32 = 0.5;
    pub const ASTEROID_MAX_SIZE: f32 = 1.5;

    /// Star sizes in pixels
    pub const STAR_MIN_SIZE: f32 = 1.0;
    pub const STAR_MAX_SIZE: f32 = 3.0;
}

/// Clamp a value to the normalized play field [0, 1]
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
