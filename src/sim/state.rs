//! Entity store and core simulation types
//!
//! All mutable simulation state for one run lives in [`World`]. Only the tick
//! and the engine's lifecycle calls write to it; hosts read it through
//! [`crate::snapshot::Snapshot`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::question::{GameMode, Question, QuestionBank};
use crate::config::EngineConfig;
use crate::consts::MAX_EFFECTS;

/// Attempts at drawing a question different from the one just answered
const QUESTION_REDRAWS: u32 = 8;

/// Axis-aligned box, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// Shrink by `pad` on every side, never below zero size
    pub fn shrink(&self, pad: f32) -> Rect {
        let pad_x = pad.min(self.w / 2.0);
        let pad_y = pad.min(self.h / 2.0);
        Rect {
            x: self.x + pad_x,
            y: self.y + pad_y,
            w: self.w - 2.0 * pad_x,
            h: self.h - 2.0 * pad_y,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// The flyer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Vertical velocity (pixels per tick)
    pub vy: f32,
    /// Where the input wants the flyer's top edge to be
    pub target_y: f32,
}

impl Player {
    /// Player centred vertically at the configured column
    pub fn new(config: &EngineConfig) -> Self {
        let y = config.player_max_y() / 2.0;
        Self {
            pos: Vec2::new(config.player_x.clamp(0.0, config.player_max_x()), y),
            width: config.player_width,
            height: config.player_height,
            vy: 0.0,
            target_y: y,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}

/// A carrier drifting toward the player with a candidate answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Pixels per tick toward the player side
    pub speed: f32,
    pub value: String,
    /// Whether `value` was the active answer when spawned
    pub is_correct: bool,
}

impl Obstacle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}

/// Transient marker for the presentation layer to flash and fade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitEffect {
    pub pos: Vec2,
    /// Simulation time of the hit
    pub at_ms: f64,
    pub success: bool,
}

/// Things that happened during a tick (audio and visual hooks)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Spawned { id: u32, correct: bool },
    CorrectHit { id: u32, pos: Vec2 },
    WrongHit { id: u32, pos: Vec2, lives: u32 },
    QuestionChanged { prompt: String },
    GameOver { score: u32 },
}

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub correct_hits: u32,
    pub misses: u32,
    pub spawned: u32,
    pub ticks: u64,
}

/// Score, lives, and mode of the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub mode: GameMode,
    pub score: u32,
    pub lives: u32,
    pub stats: RunStats,
}

/// Final figures for a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: GameMode,
    pub seed: u64,
    pub score: u32,
    pub stats: RunStats,
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub bank: QuestionBank,
    /// The active question (always set while a run exists)
    pub question: Question,
    pub player: Player,
    /// Live carriers in spawn order
    pub obstacles: Vec<Obstacle>,
    pub run: Run,
    /// Recent hit markers, oldest first
    pub effects: Vec<HitEffect>,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
    /// Simulation time since the run started
    pub elapsed_ms: f64,
    pub last_spawn_ms: Option<f64>,
    next_id: u32,
}

impl World {
    /// Fresh run: full lives, zero score, no carriers, first question drawn
    pub fn new(config: &EngineConfig, mut bank: QuestionBank, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let question = bank.next_question(&mut rng);
        let run = Run {
            mode: bank.mode(),
            score: 0,
            lives: config.starting_lives,
            stats: RunStats::default(),
        };
        let events = vec![GameEvent::QuestionChanged {
            prompt: question.prompt.clone(),
        }];
        Self {
            seed,
            rng,
            bank,
            question,
            player: Player::new(config),
            obstacles: Vec::new(),
            run,
            effects: Vec::new(),
            events,
            elapsed_ms: 0.0,
            last_spawn_ms: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the active question with the bank's next one.
    ///
    /// Redraws a few times if the bank hands back the same prompt.
    pub fn advance_question(&mut self) {
        for _ in 0..QUESTION_REDRAWS {
            let next = self.bank.next_question(&mut self.rng);
            let repeated = next.prompt == self.question.prompt;
            self.question = next;
            if !repeated {
                break;
            }
        }
        self.events.push(GameEvent::QuestionChanged {
            prompt: self.question.prompt.clone(),
        });
    }

    /// Record a hit marker at the current simulation time
    pub fn push_effect(&mut self, pos: Vec2, success: bool) {
        self.effects.push(HitEffect {
            pos,
            at_ms: self.elapsed_ms,
            success,
        });
        if self.effects.len() > MAX_EFFECTS {
            let excess = self.effects.len() - MAX_EFFECTS;
            self.effects.drain(..excess);
        }
    }

    pub fn has_live_correct(&self) -> bool {
        self.obstacles.iter().any(|o| o.is_correct)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            mode: self.run.mode,
            seed: self.seed,
            score: self.run.score,
            stats: self.run.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::question::ArithmeticGenerator;

    fn world() -> World {
        let config = EngineConfig::default();
        World::new(&config, QuestionBank::Arithmetic(ArithmeticGenerator::new(10)), 42)
    }

    #[test]
    fn test_new_world() {
        let config = EngineConfig::default();
        let world = world();
        assert_eq!(world.run.score, 0);
        assert_eq!(world.run.lives, config.starting_lives);
        assert_eq!(world.run.mode, GameMode::Arithmetic);
        assert!(world.obstacles.is_empty());
        assert!(!world.question.prompt.is_empty());
        assert!(world.player.pos.y >= 0.0 && world.player.pos.y <= config.player_max_y());
        assert!(matches!(world.events[0], GameEvent::QuestionChanged { .. }));
    }

    #[test]
    fn test_same_seed_same_question() {
        assert_eq!(world().question, world().question);
    }

    #[test]
    fn test_advance_question_changes_prompt() {
        let mut world = world();
        for _ in 0..50 {
            let before = world.question.prompt.clone();
            world.advance_question();
            assert_ne!(world.question.prompt, before);
        }
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut world = world();
        let a = world.next_entity_id();
        let b = world.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_effects_are_capped() {
        let mut world = world();
        for i in 0..(MAX_EFFECTS + 5) {
            world.elapsed_ms = i as f64;
            world.push_effect(Vec2::ZERO, i % 2 == 0);
        }
        assert_eq!(world.effects.len(), MAX_EFFECTS);
        assert_eq!(world.effects[0].at_ms, 5.0);
    }

    #[test]
    fn test_rect_overlap_and_shrink() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(a.overlaps(&a));

        let s = a.shrink(2.0);
        assert_eq!(s, Rect::new(2.0, 2.0, 6.0, 6.0));
        let tiny = a.shrink(50.0);
        assert_eq!(tiny.w, 0.0);
        assert_eq!(tiny.center(), a.center());
    }
}
