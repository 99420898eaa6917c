//! Game state and core simulation types
//!
//! All state that must be persisted for Continue/determinism lives here.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A falling asteroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    /// Unique id (stable ordering and per-spawn randomness)
    pub id: u32,
    pub x: f32,
    pub y: f32,
    /// Fall speed (field heights per second)
    pub speed: f32,
    /// Relative size (0.5 to 1.5)
    #[serde(default = "default_size")]
    pub size: f32,
}

fn default_size() -> f32 {
    1.0
}

impl Asteroid {
    pub fn new(id: u32, x: f32, y: f32, speed: f32) -> Self {
        Self {
            id,
            x,
            y,
            speed,
            size: default_size(),
        }
    }

    /// Hit circle radius (normalized)
    pub fn radius(&self) -> f32 {
        ASTEROID_BASE_RADIUS * self.size
    }

    /// Fully below the bottom edge of the field
    pub fn is_past_bottom(&self) -> bool {
        self.y - self.radius() > 1.0
    }
}

/// A background star
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    /// Size in pixels (1.0 to 3.0)
    pub size: f32,
    /// Parallax scroll speed
    pub speed: f32,
}

/// Things that happened during a tick, for the UI, audio and leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    AsteroidSpawned { id: u32 },
    AsteroidDodged { id: u32 },
    LevelUp { level: u32 },
    Collision { id: u32 },
    GameOver { score: u32 },
    NewHighScore { score: u32 },
    Paused,
    Resumed,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Horizontal player position (0.0 = left, 1.0 = right)
    pub player_x: f32,
    /// Vertical player position (0.0 = top, 1.0 = bottom)
    pub player_y: f32,
    /// Asteroids on screen (sorted by id)
    pub asteroids: Vec<Asteroid>,
    pub score: u32,
    pub level: u32,
    pub is_paused: bool,
    pub is_game_over: bool,
    pub high_score: u32,

    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ticks until the next spawn attempt
    pub spawn_cooldown_ticks: u32,
    /// Asteroids that made it past the player this run
    pub dodged: u32,
    /// Next entity ID
    next_id: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            player_x: PLAYER_START_X,
            player_y: PLAYER_START_Y,
            asteroids: Vec::new(),
            score: 0,
            level: 1,
            is_paused: false,
            is_game_over: false,
            high_score: 0,
            seed,
            time_ticks: 0,
            spawn_cooldown_ticks: 0,
            dodged: 0,
            next_id: 1,
        }
    }

    /// New run carrying over the best score
    pub fn with_high_score(seed: u64, high_score: u32) -> Self {
        Self {
            high_score,
            ..Self::new(seed)
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// RNG for a single entity, derived from the run seed and the entity id
    ///
    /// Keeps spawning reproducible after a save/load without serializing RNG
    /// internals.
    pub fn entity_rng(&self, id: u32) -> Pcg32 {
        let mix = (id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Pcg32::seed_from_u64(self.seed ^ mix)
    }

    /// Seconds of play (ticks * SIM_DT)
    pub fn elapsed_secs(&self) -> f32 {
        self.time_ticks as f32 * SIM_DT
    }

    /// Whether the simulation should advance
    pub fn is_running(&self) -> bool {
        !self.is_paused && !self.is_game_over
    }

    /// Ensure asteroids are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.asteroids.sort_by_key(|a| a.id);
    }
}
