//! Quiz Flyer entry point
//!
//! The browser build is driven from JavaScript through `quiz_flyer::web`.
//! Natively this runs a headless demo: the autopilot plays one run on a
//! hand-driven clock and the result is logged.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use quiz_flyer::consts::SIM_DT_MS;
    use quiz_flyer::sim::{Deck, GameEvent, GameMode, RunState, autopilot};
    use quiz_flyer::{Engine, EngineConfig};

    #[derive(Parser, Debug)]
    #[command(name = "quiz-flyer")]
    #[command(about = "Headless Quiz Flyer run driven by the autopilot")]
    pub struct Cli {
        /// JSON engine config (missing fields keep their defaults)
        #[arg(long)]
        pub config: Option<PathBuf>,
        /// JSON question deck; arithmetic mode when omitted
        #[arg(long)]
        pub deck: Option<PathBuf>,
        /// Run seed (random when omitted)
        #[arg(long)]
        pub seed: Option<u64>,
        /// Hard stop so a perfect autopilot cannot run forever
        #[arg(long, default_value_t = 60 * 60 * 5)]
        pub frames: u32,
    }

    pub fn run(cli: Cli) -> Result<()> {
        let config = match &cli.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        let seed = cli.seed.unwrap_or_else(rand::random);
        log::info!("Movement: {}, seed: {}", config.movement.as_str(), seed);

        let mut engine = Engine::headless(config, seed)?;
        match &cli.deck {
            Some(path) => {
                engine.begin_loading()?;
                let deck = Deck::load(path, engine.config().shuffle_deck);
                engine
                    .finish_loading(deck)
                    .with_context(|| format!("failed to load deck {}", path.display()))?;
            }
            None => engine.start(GameMode::Arithmetic)?,
        }

        let mut now = 0.0;
        for _ in 0..cli.frames {
            if let Some(world) = engine.world() {
                let input = autopilot::steer(world, engine.config());
                engine.set_input(input);
            }
            engine.pump(now);
            now += SIM_DT_MS;

            for event in engine.drain_events() {
                match event {
                    GameEvent::QuestionChanged { prompt } => log::debug!("Question: {}", prompt),
                    GameEvent::CorrectHit { id, .. } => log::debug!("Caught carrier {}", id),
                    GameEvent::WrongHit { id, lives, .. } => {
                        log::debug!("Hit carrier {} ({} lives left)", id, lives)
                    }
                    _ => {}
                }
            }

            if engine.state() != RunState::Playing {
                break;
            }
        }

        if engine.state() == RunState::Playing {
            engine.exit()?;
        }
        if let Some(summary) = engine.last_summary() {
            log::info!(
                "Final score {} in {} mode ({} correct, {} misses, {:.1}s simulated)",
                summary.score,
                summary.mode.as_str(),
                summary.stats.correct_hits,
                summary.stats.misses,
                summary.stats.ticks as f64 * SIM_DT_MS / 1000.0
            );
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Quiz Flyer (headless) starting...");

    headless::run(headless::Cli::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is quiz_flyer::web, this is just to satisfy the compiler
}
