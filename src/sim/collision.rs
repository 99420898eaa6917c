//! Collision detection between the player ship and asteroids
//!
//! Both are treated as circles in normalized field coordinates.

use glam::Vec2;

use super::state::{Asteroid, GameState};
use crate::consts::PLAYER_RADIUS;

/// Check whether two circles overlap (touching counts as a hit)
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) <= reach * reach
}

/// Player position as a vector
#[inline]
pub fn player_pos(state: &GameState) -> Vec2 {
    Vec2::new(state.player_x, state.player_y)
}

/// Check a single asteroid against the player
pub fn player_hits_asteroid(state: &GameState, asteroid: &Asteroid) -> bool {
    circles_overlap(
        player_pos(state),
        PLAYER_RADIUS,
        Vec2::new(asteroid.x, asteroid.y),
        asteroid.radius(),
    )
}

/// Id of the first asteroid (lowest id) touching the player, if any
pub fn first_collision(state: &GameState) -> Option<u32> {
    state
        .asteroids
        .iter()
        .filter(|a| player_hits_asteroid(state, a))
        .map(|a| a.id)
        .min()
}

/// Time (seconds) until an asteroid falls to the player's height
///
/// Zero while it is level with the ship, `None` once it can no longer touch it.
pub fn time_to_reach_player(state: &GameState, asteroid: &Asteroid) -> Option<f32> {
    if asteroid.speed <= 0.0 || asteroid.y - asteroid.radius() > state.player_y + PLAYER_RADIUS {
        return None;
    }
    Some((state.player_y - asteroid.y).max(0.0) / asteroid.speed)
}
