//! Run state machine
//!
//! Pure transition table. The engine performs the side effects (building a
//! fresh world, starting and stopping the clock) after a transition succeeds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// High-level lifecycle of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No active run, waiting for a mode to be picked
    #[default]
    Menu,
    /// Waiting on an external question deck
    Loading,
    /// Active run, clock ticking
    Playing,
    /// Active run, everything frozen
    Paused,
    /// Run ended, final score still visible
    #[serde(rename = "gameover")]
    GameOver,
}

impl RunState {
    /// Whether a run (score, lives, entities) exists in this state
    pub fn has_run(&self) -> bool {
        matches!(self, RunState::Playing | RunState::Paused | RunState::GameOver)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Menu => "menu",
            RunState::Loading => "loading",
            RunState::Playing => "playing",
            RunState::Paused => "paused",
            RunState::GameOver => "gameover",
        }
    }

    /// Apply an action, returning the next state
    pub fn apply(self, action: Action) -> Result<RunState, TransitionError> {
        use Action::*;
        use RunState::*;

        let next = match (self, action) {
            (Menu, BeginLoading) => Loading,
            (Loading, LoadFailed) => Menu,
            (Menu | Loading, Start) => Playing,

            (Playing | Paused, Pause) => Paused,
            (Paused | Playing, Resume) => Playing,

            (Playing, LivesExhausted) => GameOver,

            (Playing | Paused | GameOver, Restart) => Playing,
            (Loading | Playing | Paused | GameOver, Exit) => Menu,

            (from, action) => return Err(TransitionError { from, action }),
        };
        Ok(next)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triggers for run state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    BeginLoading,
    LoadFailed,
    Start,
    Pause,
    Resume,
    Restart,
    Exit,
    /// Internal: raised by collision resolution
    LivesExhausted,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::BeginLoading => "begin loading",
            Action::LoadFailed => "fail loading",
            Action::Start => "start",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::Restart => "restart",
            Action::Exit => "exit",
            Action::LivesExhausted => "end the run",
        };
        f.write_str(name)
    }
}
