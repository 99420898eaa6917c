//! View-model: the observable game state the UI binds to
//!
//! Owns the [`GameState`] and everything around it that is not pure
//! simulation: the frame accumulator, steering input, the starfield,
//! the leaderboard and state-change listeners.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clamp_unit;
use crate::consts::*;
use crate::highscores::HighScores;
use crate::persistence::Storage;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, Star, Starfield, TickInput, tick};
use crate::tuning::Tuning;

/// Events kept for `drain_events`; older ones are dropped first
pub const MAX_PENDING_EVENTS: usize = 256;

/// Handle returned by [`GameViewModel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GameState)>;

pub struct GameViewModel {
    state: GameState,
    tuning: Tuning,
    settings: Settings,
    starfield: Starfield,
    input: TickInput,
    accumulator: f32,
    high_scores: HighScores,
    storage: Option<Storage>,
    /// Events since the last `drain_events` (at most `MAX_PENDING_EVENTS`)
    events: Vec<GameEvent>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for GameViewModel {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameViewModel {
    /// View-model with default tuning and settings and no persistence
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), Settings::default())
    }

    pub fn with_config(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        Self {
            state: GameState::new(seed),
            starfield: Starfield::new(settings.star_count(), star_seed(seed)),
            tuning,
            settings,
            input: TickInput::default(),
            accumulator: 0.0,
            high_scores: HighScores::new(),
            storage: None,
            events: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// View-model backed by a storage directory
    ///
    /// Settings and the leaderboard are loaded from it (defaults if absent),
    /// and finished runs are saved back.
    pub fn with_storage(seed: u64, tuning: Tuning, storage: Storage) -> Self {
        let settings = Settings::load(&storage);
        let high_scores = HighScores::load(&storage);
        let best = high_scores.top_score().unwrap_or(0);

        let mut vm = Self::with_config(seed, tuning, settings);
        vm.state = GameState::with_high_score(seed, best);
        vm.high_scores = high_scores;
        vm.storage = Some(storage);
        vm
    }

    /// Current state snapshot
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn stars(&self) -> &[Star] {
        &self.starfield.stars
    }

    /// Place the player at `x`, clamped to the field. NaN is ignored.
    pub fn move_player(&mut self, x: f32) {
        if x.is_nan() {
            return;
        }
        self.state.player_x = clamp_unit(x);
        self.notify();
    }

    /// Flip the paused flag
    pub fn toggle_pause(&mut self) {
        self.state.is_paused = !self.state.is_paused;
        self.queue_events([if self.state.is_paused {
            GameEvent::Paused
        } else {
            GameEvent::Resumed
        }]);
        log::debug!("Paused: {}", self.state.is_paused);
        self.notify();
    }

    /// Start a new run, keeping the best score
    pub fn restart(&mut self) {
        let seed = next_seed(self.state.seed);
        let best = self.state.high_score;
        self.state = GameState::with_high_score(seed, best);
        self.accumulator = 0.0;
        self.input = TickInput::default();
        log::info!("New run (seed {seed})");
        self.notify();
    }

    /// Continuous steering target used by `update` (None to hold position)
    pub fn set_target_x(&mut self, target_x: Option<f32>) {
        self.input.target_x = target_x;
    }

    /// Let the AI dodge (demo/idle mode)
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    pub fn set_settings(&mut self, settings: Settings) {
        if settings.star_count() != self.starfield.len() {
            self.starfield = Starfield::new(settings.star_count(), star_seed(self.state.seed));
        }
        self.settings = settings;
    }

    /// Advance by a frame's worth of wall-clock time
    ///
    /// Runs whole fixed ticks out of the accumulator and returns how many ran.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let tuning = Tuning {
            player_speed: self.tuning.player_speed * self.settings.effective_sensitivity(),
            ..self.tuning.clone()
        };

        let mut substeps = 0;
        let mut changed = false;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let ticks_before = self.state.time_ticks;
            let events = tick(&mut self.state, &self.input, &tuning, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
            changed |= self.state.time_ticks != ticks_before || !events.is_empty();

            // Clear one-shot inputs after processing
            self.input.pause = false;

            for event in &events {
                self.handle_event(*event);
            }
            self.queue_events(events);
        }

        if self.settings.effective_parallax() && self.state.is_running() {
            self.starfield.update(dt);
        }

        if changed {
            self.notify();
        }
        substeps
    }

    /// Take the events produced since the last call
    ///
    /// Callers that only `subscribe` can ignore this: the queue keeps the
    /// newest `MAX_PENDING_EVENTS` and drops the rest.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn queue_events(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        self.events.extend(events);
        if self.events.len() > MAX_PENDING_EVENTS {
            let excess = self.events.len() - MAX_PENDING_EVENTS;
            self.events.drain(..excess);
        }
    }

    /// Register a listener called after every state change
    pub fn subscribe(&mut self, listener: impl FnMut(&GameState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::GameOver { score } => self.record_score(score),
            GameEvent::NewHighScore { score } => log::info!("New high score: {score}"),
            _ => {}
        }
    }

    fn record_score(&mut self, score: u32) {
        let Some(rank) = self
            .high_scores
            .add_score(score, self.state.level, unix_now())
        else {
            return;
        };
        log::info!("Score {score} ranked #{rank}");

        if let Some(storage) = &self.storage {
            if let Err(e) = self.high_scores.save(storage) {
                log::warn!("Could not save high scores: {e}");
            }
        }
    }
}

fn star_seed(seed: u64) -> u64 {
    seed ^ 0x5745_4C4C_5354_4152
}

/// Next run seed, drawn from the previous one so restarts stay reproducible
fn next_seed(seed: u64) -> u64 {
    Pcg32::seed_from_u64(seed).random::<u64>()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
