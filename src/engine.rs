//! Game engine: lifecycle callbacks over the simulation and clock
//!
//! The engine is the only writer of the [`World`]. Lifecycle calls run
//! between frames; ticks run inside [`Engine::on_frame`] (or
//! [`Engine::step`] for hosts that drive time themselves).

use crate::clock::{FrameId, FrameSource, ManualFrames, SimulationClock};
use crate::config::{EngineConfig, MovementModel};
use crate::error::{BankError, EngineError, TransitionError};
use crate::sim::{
    Action, ArithmeticGenerator, Deck, GameEvent, GameMode, QuestionBank, RunState, RunSummary,
    TickInput, TickOutcome, World, tick,
};
use crate::snapshot::Snapshot;

/// Golden-ratio increment for per-run seeds
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// One game instance
pub struct Engine<F: FrameSource> {
    config: EngineConfig,
    state: RunState,
    world: Option<World>,
    /// Mode of the current or most recent run (used by restart)
    mode: Option<GameMode>,
    deck: Option<Deck>,
    clock: SimulationClock,
    frames: F,
    input: TickInput,
    seed: u64,
    runs_started: u64,
    last_summary: Option<RunSummary>,
}

impl<F: FrameSource> Engine<F> {
    /// Build an idle engine. Rejects configs that would break the simulation.
    pub fn new(config: EngineConfig, frames: F, seed: u64) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            state: RunState::Menu,
            world: None,
            mode: None,
            deck: None,
            clock: SimulationClock::new(),
            frames,
            input: TickInput::default(),
            seed,
            runs_started: 0,
            last_summary: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn has_deck(&self) -> bool {
        self.deck.is_some()
    }

    /// Summary of the last run that ended (game over or exit)
    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// Swap the movement model; the next tick uses it
    pub fn set_movement(&mut self, movement: MovementModel) {
        if self.config.movement != movement {
            log::info!("Movement model: {}", movement.as_str());
            self.config.movement = movement;
        }
    }

    pub fn input(&self) -> TickInput {
        self.input
    }

    /// Latest input; sampled by every following tick
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Supply a deck for deck-mode runs
    pub fn set_deck(&mut self, deck: Deck) {
        log::info!("Deck ready ({} questions)", deck.len());
        self.deck = Some(deck);
    }

    // === Lifecycle ===

    /// Start a run in the given mode
    pub fn start(&mut self, mode: GameMode) -> Result<(), EngineError> {
        self.state.apply(Action::Start)?;
        let bank = self.build_bank(mode)?;
        self.begin_run(bank);
        Ok(())
    }

    /// Enter the loading state while a deck is fetched
    pub fn begin_loading(&mut self) -> Result<(), EngineError> {
        self.state = self.state.apply(Action::BeginLoading)?;
        log::info!("Loading question deck");
        Ok(())
    }

    /// Finish a deck fetch: start a deck run on success, back to the menu on failure
    pub fn finish_loading(&mut self, result: Result<Deck, BankError>) -> Result<(), EngineError> {
        if self.state != RunState::Loading {
            return Err(TransitionError {
                from: self.state,
                action: Action::Start,
            }
            .into());
        }
        match result {
            Ok(deck) => {
                self.set_deck(deck);
                self.start(GameMode::Deck)
            }
            Err(e) => {
                log::warn!("Question deck failed to load: {}", e);
                self.state = self.state.apply(Action::LoadFailed)?;
                Err(e.into())
            }
        }
    }

    /// Load a deck from the editor's JSON export and start a deck run
    pub fn load_deck_json(&mut self, json: &str) -> Result<(), EngineError> {
        if self.state != RunState::Loading {
            self.begin_loading()?;
        }
        let result = Deck::from_json(json, self.config.shuffle_deck);
        self.finish_loading(result)
    }

    /// Freeze the run. Pausing while paused changes nothing.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        let next = self.state.apply(Action::Pause)?;
        if self.state == RunState::Playing {
            self.clock.stop(&mut self.frames);
            log::info!("Paused");
        }
        self.state = next;
        Ok(())
    }

    /// Continue a paused run from exactly where it froze
    pub fn resume(&mut self) -> Result<(), EngineError> {
        let next = self.state.apply(Action::Resume)?;
        if self.state == RunState::Paused {
            self.state = next;
            self.clock.start(&mut self.frames);
            log::info!("Resumed");
        }
        Ok(())
    }

    /// Throw away the current run and start a fresh one in the same mode
    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.state.apply(Action::Restart)?;
        let mode = self.mode.unwrap_or(GameMode::Arithmetic);
        let bank = self.build_bank(mode)?;
        self.clock.stop(&mut self.frames);
        self.record_summary();
        self.begin_run(bank);
        Ok(())
    }

    /// Leave to the menu, discarding the run
    pub fn exit(&mut self) -> Result<(), EngineError> {
        self.state = self.state.apply(Action::Exit)?;
        self.clock.stop(&mut self.frames);
        self.record_summary();
        self.world = None;
        log::info!("Back to menu");
        Ok(())
    }

    // === Time ===

    /// Handle a frame callback from the frame source
    pub fn on_frame(&mut self, id: FrameId, now_ms: f64) {
        let Some(steps) = self.clock.begin_frame(id, now_ms) else {
            return;
        };
        if self.state != RunState::Playing {
            return;
        }
        for _ in 0..steps {
            self.run_tick();
            if self.state != RunState::Playing {
                return;
            }
        }
        self.clock.schedule_next(&mut self.frames);
    }

    /// Run exactly one tick if a run is playing
    pub fn step(&mut self) -> Option<TickOutcome> {
        if self.state != RunState::Playing {
            return None;
        }
        Some(self.run_tick())
    }

    // === Observation ===

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.state, self.world.as_ref())
    }

    /// Events since the last drain (audio/visual hooks)
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.world
            .as_mut()
            .map(|w| std::mem::take(&mut w.events))
            .unwrap_or_default()
    }

    // === Internals ===

    fn build_bank(&self, mode: GameMode) -> Result<QuestionBank, EngineError> {
        match mode {
            GameMode::Arithmetic => Ok(QuestionBank::Arithmetic(ArithmeticGenerator::new(
                self.config.max_operand,
            ))),
            GameMode::Deck => {
                let mut deck = self.deck.clone().ok_or(EngineError::DeckMissing)?;
                deck.rewind();
                Ok(QuestionBank::Deck(deck))
            }
        }
    }

    fn begin_run(&mut self, bank: QuestionBank) {
        let seed = self
            .seed
            .wrapping_add(self.runs_started.wrapping_mul(SEED_STRIDE));
        self.runs_started += 1;
        let mode = bank.mode();
        self.mode = Some(mode);
        self.world = Some(World::new(&self.config, bank, seed));
        self.state = RunState::Playing;
        self.clock.stop(&mut self.frames);
        self.clock.start(&mut self.frames);
        log::info!("Run {} started ({} mode, seed {})", self.runs_started, mode.as_str(), seed);
    }

    fn run_tick(&mut self) -> TickOutcome {
        let Some(world) = self.world.as_mut() else {
            return TickOutcome::default();
        };
        let outcome = tick(world, &self.input, &self.config);
        if outcome.run_ended() {
            self.end_run();
        }
        outcome
    }

    fn end_run(&mut self) {
        match self.state.apply(Action::LivesExhausted) {
            Ok(next) => self.state = next,
            Err(e) => {
                log::warn!("{}", e);
                return;
            }
        }
        self.clock.stop(&mut self.frames);
        self.record_summary();
        if let Some(summary) = &self.last_summary {
            log::info!(
                "Game over: score {} ({} correct, {} misses, {} ticks)",
                summary.score,
                summary.stats.correct_hits,
                summary.stats.misses,
                summary.stats.ticks
            );
        }
    }

    fn record_summary(&mut self) {
        if let Some(world) = &self.world {
            self.last_summary = Some(world.summary());
        }
    }
}

impl<F: FrameSource> Drop for Engine<F> {
    fn drop(&mut self) {
        self.clock.stop(&mut self.frames);
    }
}

impl Engine<ManualFrames> {
    /// Headless engine with a hand-driven frame source
    pub fn headless(config: EngineConfig, seed: u64) -> Result<Self, EngineError> {
        Self::new(config, ManualFrames::new(), seed)
    }

    /// Deliver every outstanding frame request at `now_ms`
    pub fn pump(&mut self, now_ms: f64) -> usize {
        let due = self.frames.take_pending();
        let count = due.len();
        for id in due {
            self.on_frame(id, now_ms);
        }
        count
    }
}
