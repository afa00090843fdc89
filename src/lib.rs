//! Quiz Flyer - an arcade quiz engine
//!
//! The player steers a flyer up and down while carriers drift in from the
//! right, each carrying a candidate answer. Fly into the right one to score,
//! hit a wrong one and lose a life.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, run state)
//! - `clock`: Frame scheduling with an owned cancellation handle
//! - `engine`: Lifecycle callbacks wrapping the simulation and clock
//! - `snapshot`: Read-only projection for the presentation layer
//! - `config`: Data-driven tuning

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod sim;
pub mod snapshot;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{FrameId, FrameSource, ManualFrames, SimulationClock};
pub use config::{EngineConfig, MovementModel};
pub use engine::Engine;
pub use error::{BankError, ConfigError, EngineError, TransitionError};
pub use snapshot::Snapshot;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Fixed timestep in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame gap we accept before clamping (ms)
    pub const MAX_FRAME_GAP_MS: f64 = 100.0;

    /// Playfield dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Player defaults - flyer sits near the left edge
    pub const PLAYER_X: f32 = 80.0;
    pub const PLAYER_WIDTH: f32 = 60.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;

    /// Velocity model (all per tick)
    pub const PLAYER_ACCEL: f32 = 0.9;
    pub const PLAYER_FRICTION: f32 = 0.92;
    pub const PLAYER_MAX_SPEED: f32 = 12.0;
    /// Fraction of speed kept (and inverted) when bouncing off an edge
    pub const PLAYER_BOUNCE: f32 = 0.4;
    /// Distance to target under which the velocity model stops pushing
    pub const TARGET_DEADZONE: f32 = 2.0;

    /// Lerp model: fraction of the remaining distance covered per tick
    pub const LERP_FACTOR: f32 = 0.15;
    /// How far a held key moves the lerp target per tick
    pub const KEY_TARGET_STEP: f32 = 8.0;

    /// Carrier defaults
    pub const CARRIER_WIDTH: f32 = 90.0;
    pub const CARRIER_HEIGHT: f32 = 50.0;
    /// Pixels per tick
    pub const CARRIER_SPEED: f32 = 3.0;
    /// Minimum vertical gap between a new carrier and a recent one
    pub const MIN_SPAWN_GAP: f32 = 60.0;
    /// Candidate positions tried before accepting the best one
    pub const SPAWN_ATTEMPTS: u32 = 6;

    /// Spawn pacing (simulation milliseconds)
    pub const SPAWN_INTERVAL_MS: f64 = 1500.0;
    pub const MIN_SPAWN_INTERVAL_MS: f64 = 600.0;
    pub const SPAWN_INTERVAL_STEP_MS: f64 = 100.0;
    pub const SCORE_PER_STEP: u32 = 50;

    /// Chance a carrier is correct when a correct one is already live
    pub const CORRECT_PROBABILITY: f64 = 0.4;

    /// Scoring
    pub const CORRECT_REWARD: u32 = 10;
    pub const STARTING_LIVES: u32 = 3;
    /// Shrinks the carrier hitbox on every side
    pub const HIT_PADDING: f32 = 6.0;

    /// Presentation stops drawing hit markers older than this (ms)
    pub const EFFECT_FADE_MS: f64 = 600.0;
    /// Hit markers retained by the store
    pub const MAX_EFFECTS: usize = 16;

    /// Default and largest operand for generated arithmetic
    pub const DEFAULT_MAX_OPERAND: u32 = 10;
    pub const MAX_OPERAND: u32 = 10_000;
}
