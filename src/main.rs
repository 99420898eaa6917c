//! Space Dodger entry point
//!
//! Runs a headless session with the autopilot at a fixed frame rate and logs
//! the outcome. Rendering is left to a UI shell on top of `GameViewModel`.
//!
//! Usage: `space-dodger [seed] [seconds]`
//! Saves go to `$SPACE_DODGER_DATA_DIR` (default `.space-dodger`).

use std::path::PathBuf;

use space_dodger::persistence::Storage;
use space_dodger::sim::GameEvent;
use space_dodger::{GameViewModel, Tuning};

/// Simulated display refresh rate
const FRAME_DT: f32 = 1.0 / 60.0;
const DEFAULT_SECONDS: u32 = 120;

fn main() {
    env_logger::init();
    log::info!("Space Dodger (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x5EED);
    let seconds = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    let data_dir = std::env::var_os("SPACE_DODGER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".space-dodger"));
    let tuning = match Tuning::load(&data_dir.join("tuning.json")) {
        Ok(Some(tuning)) => {
            log::info!("Loaded tuning overrides");
            tuning
        }
        Ok(None) => Tuning::default(),
        Err(e) => {
            log::warn!("Ignoring tuning file: {e}");
            Tuning::default()
        }
    };
    let storage = Storage::new(data_dir);

    let mut vm = GameViewModel::with_storage(seed, tuning, storage);
    vm.set_autopilot(true);
    log::info!(
        "Seed {seed}, {} stars, best score {}",
        vm.stars().len(),
        vm.state().high_score
    );

    let frames = seconds.saturating_mul(60);
    for _ in 0..frames {
        vm.update(FRAME_DT);
        for event in vm.drain_events() {
            match event {
                GameEvent::LevelUp { level } => println!("Level {level}"),
                GameEvent::NewHighScore { score } => println!("New high score: {score}"),
                _ => {}
            }
        }
        if vm.state().is_game_over {
            break;
        }
    }

    let state = vm.state();
    println!(
        "{}: score {} | level {} | dodged {} | {:.1}s",
        if state.is_game_over { "Game over" } else { "Time up" },
        state.score,
        state.level,
        state.dodged,
        state.elapsed_secs()
    );
    for (rank, entry) in vm.high_scores().entries.iter().enumerate() {
        println!("  #{:<2} {:>6}  (level {})", rank + 1, entry.score, entry.level);
    }
}
