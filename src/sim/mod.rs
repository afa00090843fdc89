//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, scheduling, or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod machine;
pub mod physics;
pub mod question;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, resolve_collisions};
pub use machine::{Action, RunState};
pub use question::{ArithmeticGenerator, Deck, DeckEntry, GameMode, Question, QuestionBank};
pub use state::{
    GameEvent, HitEffect, Obstacle, Player, Rect, Run, RunStats, RunSummary, World,
};
pub use tick::{TickInput, TickOutcome, tick};
