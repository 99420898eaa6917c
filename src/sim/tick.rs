//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use rand::Rng;

use super::collision::{first_collision, time_to_reach_player};
use super::state::{Asteroid, GameEvent, GameState};
use crate::clamp_unit;
use crate::consts::*;
use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal position to steer toward (drag/tilt/keys)
    pub target_x: Option<f32>,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Idle/demo mode - AI dodges for the player
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    tuning: &Tuning,
    dt: f32,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.pause && !state.is_game_over {
        state.is_paused = !state.is_paused;
        events.push(if state.is_paused {
            GameEvent::Paused
        } else {
            GameEvent::Resumed
        });
    }

    if !state.is_running() {
        return events;
    }

    state.time_ticks += 1;

    // Steering
    let target = if input.autopilot {
        Some(autopilot_target(state))
    } else {
        input.target_x
    };
    if let Some(target_x) = target.filter(|x| !x.is_nan()) {
        move_toward(state, target_x, tuning.player_speed * dt);
    }

    // Spawning
    let params = tuning.level(state.level);
    state.spawn_cooldown_ticks = state.spawn_cooldown_ticks.saturating_sub(1);
    if state.spawn_cooldown_ticks == 0 {
        if (state.asteroids.len() as u32) < params.max_asteroids {
            let id = spawn_asteroid(state, params.min_speed, params.max_speed);
            events.push(GameEvent::AsteroidSpawned { id });
        }
        state.spawn_cooldown_ticks = params.spawn_interval_ticks;
    }

    // Movement
    for asteroid in &mut state.asteroids {
        asteroid.y += asteroid.speed * dt;
    }

    // Collision ends the run immediately
    if let Some(id) = first_collision(state) {
        state.is_game_over = true;
        events.push(GameEvent::Collision { id });
        events.push(GameEvent::GameOver { score: state.score });
        if state.score > state.high_score {
            state.high_score = state.score;
            events.push(GameEvent::NewHighScore { score: state.score });
        }
        log::info!(
            "Game over: score {} at level {} after {:.1}s",
            state.score,
            state.level,
            state.elapsed_secs()
        );
        return events;
    }

    // Dodged asteroids leave the field and score
    let mut dodged = Vec::new();
    state.asteroids.retain(|a| {
        if a.is_past_bottom() {
            dodged.push(a.id);
            false
        } else {
            true
        }
    });
    for id in dodged {
        state.dodged += 1;
        state.score = state.score.saturating_add(tuning.dodge_points);
        events.push(GameEvent::AsteroidDodged { id });
    }

    // Level progression
    let level = tuning.level_for_score(state.score);
    if level > state.level {
        state.level = level;
        events.push(GameEvent::LevelUp { level });
        log::info!("Level {} reached (score {})", level, state.score);
    }

    // Ensure deterministic ordering
    state.normalize_order();

    events
}

/// Move the player toward `target_x` by at most `max_step`
fn move_toward(state: &mut GameState, target_x: f32, max_step: f32) {
    let target = clamp_unit(target_x);
    let delta = (target - state.player_x).clamp(-max_step, max_step);
    state.player_x = clamp_unit(state.player_x + delta);
}

/// Spawn one asteroid above the top edge and return its id
fn spawn_asteroid(state: &mut GameState, min_speed: f32, max_speed: f32) -> u32 {
    let id = state.next_entity_id();
    let mut rng = state.entity_rng(id);

    let size = rng.random_range(ASTEROID_MIN_SIZE..=ASTEROID_MAX_SIZE);
    let x = rng.random::<f32>();
    let speed = if min_speed.is_finite() && max_speed.is_finite() && max_speed > min_speed {
        rng.random_range(min_speed..=max_speed)
    } else if min_speed.is_finite() {
        min_speed
    } else {
        log::warn!("Unusable asteroid speed range {min_speed}..{max_speed}, using default");
        Tuning::default().base_asteroid_speed
    };

    let mut asteroid = Asteroid::new(id, x, 0.0, speed);
    asteroid.size = size;
    // Start just out of view
    asteroid.y = -asteroid.radius();

    log::debug!(
        "Spawned asteroid {} at x={:.2} speed={:.2} size={:.2}",
        id,
        x,
        speed,
        size
    );
    state.asteroids.push(asteroid);
    id
}

/// Horizontal distance the autopilot keeps from an asteroid
fn clearance(asteroid: &Asteroid) -> f32 {
    asteroid.radius() + PLAYER_RADIUS * 2.5
}

/// Pick a horizontal position away from the most urgent threat
///
/// Threats are asteroids that can still reach the ship and sit within
/// clearance of it horizontally; the one arriving soonest wins. With no
/// threat, drift back to center.
pub fn autopilot_target(state: &GameState) -> f32 {
    let threat = state
        .asteroids
        .iter()
        .filter(|a| (a.x - state.player_x).abs() < clearance(a))
        .filter_map(|a| time_to_reach_player(state, a).map(|t| (t, a)))
        .min_by(|(ta, _), (tb, _)| ta.total_cmp(tb));

    let Some((_, asteroid)) = threat else {
        return PLAYER_START_X;
    };

    let left = asteroid.x - clearance(asteroid);
    let right = asteroid.x + clearance(asteroid);

    // Prefer the side the player is already on, unless it runs off the field
    let go_left = if state.player_x <= asteroid.x {
        left >= 0.0
    } else {
        right > 1.0
    };
    clamp_unit(if go_left { left } else { right })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run_ticks(
        state: &mut GameState,
        input: &TickInput,
        tuning: &Tuning,
        n: usize,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(tick(state, input, tuning, SIM_DT));
        }
        events
    }

    #[test]
    fn test_first_tick_spawns() {
        let mut state = GameState::new(12345);
        let tuning = Tuning::default();
        let events = tick(&mut state, &TickInput::default(), &tuning, SIM_DT);
        assert_eq!(state.asteroids.len(), 1);
        assert!(matches!(events[0], GameEvent::AsteroidSpawned { .. }));
        assert_eq!(state.spawn_cooldown_ticks, tuning.level(1).spawn_interval_ticks);

        let asteroid = &state.asteroids[0];
        assert!((0.0..=1.0).contains(&asteroid.x));
        assert!(asteroid.y < 0.0);
        assert!((ASTEROID_MIN_SIZE..=ASTEROID_MAX_SIZE).contains(&asteroid.size));
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(12345);
        let tuning = Tuning::default();
        tick(&mut state, &TickInput::default(), &tuning, SIM_DT);
        let snapshot = state.clone();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        let events = tick(&mut state, &pause, &tuning, SIM_DT);
        assert!(state.is_paused);
        assert_eq!(events, vec![GameEvent::Paused]);

        // Nothing moves while paused
        run_ticks(&mut state, &TickInput::default(), &tuning, 30);
        assert_eq!(state.time_ticks, snapshot.time_ticks);
        assert_eq!(state.asteroids, snapshot.asteroids);

        // Unpause
        let events = tick(&mut state, &pause, &tuning, SIM_DT);
        assert!(!state.is_paused);
        assert_eq!(events[0], GameEvent::Resumed);
        assert_eq!(state.time_ticks, snapshot.time_ticks + 1);
    }

    #[test]
    fn test_collision_ends_game() {
        let mut state = GameState::with_high_score(1, 5);
        state.score = 40;
        state.spawn_cooldown_ticks = 1000;
        state.asteroids.push(Asteroid::new(77, 0.5, 0.79, 0.3));

        let events = tick(&mut state, &TickInput::default(), &Tuning::default(), SIM_DT);
        assert!(state.is_game_over);
        assert_eq!(state.high_score, 40);
        assert_eq!(
            events,
            vec![
                GameEvent::Collision { id: 77 },
                GameEvent::GameOver { score: 40 },
                GameEvent::NewHighScore { score: 40 },
            ]
        );

        // Frozen afterwards, and pause does nothing
        let ticks = state.time_ticks;
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        assert!(tick(&mut state, &pause, &Tuning::default(), SIM_DT).is_empty());
        assert_eq!(state.time_ticks, ticks);
        assert!(!state.is_paused);
    }

    #[test]
    fn test_collision_below_high_score() {
        let mut state = GameState::with_high_score(1, 500);
        state.score = 40;
        state.spawn_cooldown_ticks = 1000;
        state.asteroids.push(Asteroid::new(3, 0.5, 0.8, 0.3));

        let events = tick(&mut state, &TickInput::default(), &Tuning::default(), SIM_DT);
        assert_eq!(state.high_score, 500);
        assert!(!events.contains(&GameEvent::NewHighScore { score: 40 }));
    }

    #[test]
    fn test_dodged_asteroid_scores() {
        let mut state = GameState::new(1);
        let tuning = Tuning::default();
        state.spawn_cooldown_ticks = 1000;
        state.asteroids.push(Asteroid::new(9, 0.05, 1.2, 0.3));

        let events = tick(&mut state, &TickInput::default(), &tuning, SIM_DT);
        assert!(state.asteroids.is_empty());
        assert_eq!(state.score, tuning.dodge_points);
        assert_eq!(state.dodged, 1);
        assert_eq!(events, vec![GameEvent::AsteroidDodged { id: 9 }]);
    }

    #[test]
    fn test_level_up() {
        let mut state = GameState::new(1);
        let tuning = Tuning::default();
        state.spawn_cooldown_ticks = 1000;
        state.score = tuning.points_per_level - tuning.dodge_points;
        state.asteroids.push(Asteroid::new(2, 0.05, 1.2, 0.3));

        let events = tick(&mut state, &TickInput::default(), &tuning, SIM_DT);
        assert_eq!(state.level, 2);
        assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_spawn_with_overflowing_speed_range() {
        // Unvalidated tuning: the jittered top speed overflows to infinity
        let tuning = Tuning {
            base_asteroid_speed: 3e38,
            ..Default::default()
        };
        assert!(tuning.level(1).max_speed.is_infinite());

        // Zero dt keeps the new asteroid on the field for inspection
        let mut state = GameState::new(12345);
        let events = tick(&mut state, &TickInput::default(), &tuning, 0.0);
        assert!(matches!(events[0], GameEvent::AsteroidSpawned { .. }));
        assert_eq!(state.asteroids.len(), 1);
        assert!(state.asteroids[0].speed.is_finite());
    }

    #[test]
    fn test_spawn_with_nan_speed_uses_default() {
        let tuning = Tuning {
            base_asteroid_speed: f32::NAN,
            ..Default::default()
        };
        let mut state = GameState::new(7);
        tick(&mut state, &TickInput::default(), &tuning, SIM_DT);
        assert_eq!(state.asteroids.len(), 1);
        assert_eq!(state.asteroids[0].speed, Tuning::default().base_asteroid_speed);
    }

    #[test]
    fn test_respects_asteroid_cap() {
        let mut state = GameState::new(1);
        let tuning = Tuning {
            base_max_asteroids: 2,
            max_asteroids_cap: 2,
            base_spawn_interval_ticks: 1,
            min_spawn_interval_ticks: 1,
            // Slow enough that nothing reaches the player
            base_asteroid_speed: 0.01,
            ..Default::default()
        };
        run_ticks(&mut state, &TickInput::default(), &tuning, 20);
        assert_eq!(state.asteroids.len(), 2);
    }

    #[test]
    fn test_target_steering_is_rate_limited() {
        let mut state = GameState::new(1);
        let tuning = Tuning::default();
        state.spawn_cooldown_ticks = 1000;
        let input = TickInput {
            target_x: Some(0.0),
            ..Default::default()
        };
        tick(&mut state, &input, &tuning, SIM_DT);
        let expected = 0.5 - tuning.player_speed * SIM_DT;
        assert!((state.player_x - expected).abs() < 1e-5);

        run_ticks(&mut state, &input, &tuning, 120);
        assert_eq!(state.player_x, 0.0);
    }

    #[test]
    fn test_autopilot_avoids_threat() {
        let mut state = GameState::new(1);
        state.asteroids.push(Asteroid::new(1, 0.52, 0.3, 0.4));
        let target = autopilot_target(&state);
        let asteroid = &state.asteroids[0];
        assert!((target - asteroid.x).abs() >= asteroid.radius() + PLAYER_RADIUS);
    }

    #[test]
    fn test_autopilot_idle_returns_to_center() {
        let mut state = GameState::new(1);
        state.player_x = 0.1;
        assert_eq!(autopilot_target(&state), PLAYER_START_X);
    }

    #[test]
    fn test_autopilot_dodges_incoming_asteroid() {
        let mut state = GameState::new(2024);
        let tuning = Tuning::default();
        state.spawn_cooldown_ticks = u32::MAX;
        state.asteroids.push(Asteroid::new(1, 0.5, 0.0, 0.4));
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        run_ticks(&mut state, &input, &tuning, 60 * 4);
        assert!(!state.is_game_over);
        assert!(state.asteroids.is_empty());
        assert_eq!(state.score, tuning.dodge_points);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput {
                target_x: Some(0.2),
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                target_x: Some(0.9),
                ..Default::default()
            },
            TickInput {
                autopilot: true,
                ..Default::default()
            },
        ];

        for input in inputs.iter().cycle().take(600) {
            tick(&mut state1, input, &tuning, SIM_DT);
            tick(&mut state2, input, &tuning, SIM_DT);
        }

        assert_eq!(state1, state2);
    }

    #[test]
    fn test_resume_after_serde_is_deterministic() {
        let tuning = Tuning::default();
        let input = TickInput::default();
        let mut original = GameState::new(31337);
        run_ticks(&mut original, &input, &tuning, 90);

        let json = serde_json::to_string(&original).unwrap();
        let mut restored: GameState = serde_json::from_str(&json).unwrap();

        run_ticks(&mut original, &input, &tuning, 90);
        run_ticks(&mut restored, &input, &tuning, 90);
        assert_eq!(original, restored);
    }

    proptest! {
        #[test]
        fn prop_player_stays_on_field(targets in prop::collection::vec(-2.0f32..3.0, 1..200)) {
            let mut state = GameState::new(5);
            let tuning = Tuning::default();
            for target in targets {
                let input = TickInput { target_x: Some(target), ..Default::default() };
                tick(&mut state, &input, &tuning, SIM_DT);
                prop_assert!((0.0..=1.0).contains(&state.player_x));
            }
        }

        #[test]
        fn prop_asteroids_sorted_by_id(seed in any::<u64>(), n in 1usize..400) {
            let mut state = GameState::new(seed);
            let tuning = Tuning::default();
            run_ticks(&mut state, &TickInput::default(), &tuning, n);
            prop_assert!(state.asteroids.windows(2).all(|w| w[0].id < w[1].id));
        }
    }
}
