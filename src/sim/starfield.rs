//! Scrolling parallax starfield behind the play field
//!
//! Purely cosmetic: never affects gameplay, so it owns its own RNG instead of
//! drawing from the run seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::Star;
use crate::consts::{STAR_MAX_SIZE, STAR_MIN_SIZE};

/// Scroll speed of a 1px star (field heights per second)
const BASE_STAR_SPEED: f32 = 0.02;

#[derive(Debug, Clone)]
pub struct Starfield {
    pub stars: Vec<Star>,
    rng: Pcg32,
}

impl Starfield {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = (0..count)
            .map(|_| {
                let size = rng.random_range(STAR_MIN_SIZE..=STAR_MAX_SIZE);
                Star {
                    x: rng.random::<f32>(),
                    y: rng.random::<f32>(),
                    size,
                    // Bigger stars are "closer" and scroll faster
                    speed: BASE_STAR_SPEED * size,
                }
            })
            .collect();
        Self { stars, rng }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Scroll stars down, wrapping those that leave the bottom back to the top
    pub fn update(&mut self, dt: f32) {
        for star in &mut self.stars {
            star.y += star.speed * dt;
            if star.y > 1.0 {
                star.y -= 1.0;
                star.x = self.rng.random::<f32>();
            }
        }
    }
}
