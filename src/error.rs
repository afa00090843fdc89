//! Error types
//!
//! The simulation tick itself never fails. Errors only come from loading
//! external data (decks, config) and from lifecycle calls made in the wrong
//! state.

use thiserror::Error;

use crate::sim::machine::{Action, RunState};

/// Failure to obtain a usable question deck
#[derive(Debug, Error)]
pub enum BankError {
    #[error("question deck is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read question deck: {0}")]
    Io(#[from] std::io::Error),
    #[error("question source unavailable: {0}")]
    Unavailable(String),
}

/// Failure to load or validate engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A lifecycle action that the current run state does not accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} while {from}")]
pub struct TransitionError {
    pub from: RunState,
    pub action: Action,
}

/// Errors surfaced by the engine's lifecycle callbacks
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("no question deck loaded for deck mode")]
    DeckMissing,
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
