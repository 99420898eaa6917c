//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod starfield;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, first_collision, player_hits_asteroid};
pub use starfield::Starfield;
pub use state::{Asteroid, GameEvent, GameState, Star};
pub use tick::{TickInput, autopilot_target, tick};
