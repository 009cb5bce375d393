//! Merge Arena entry point
//!
//! Runs the game headless under the autopilot and prints the final arena.

use merge_arena::Settings;
use merge_arena::game::Game;
use merge_arena::platform::HeadlessPlatform;

fn run(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let platform = HeadlessPlatform::new(settings);
    let mut game = Game::new(platform, settings.seed)?;
    game.run(settings.frame_limit)?;

    let played = game.platform().audio_manager().backend().played.len();
    log::info!("{} cues played over {} frames", played, game.frames());

    println!("{}", serde_json::to_string_pretty(&game.state().snapshot())?);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Merge Arena (headless) starting...");

    let settings = Settings::load();
    log::info!("Game initialized with seed: {:#x}", settings.seed);

    if let Err(err) = run(&settings) {
        log::error!("Halting: {err}");
        std::process::exit(1);
    }
}
