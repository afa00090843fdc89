//! Read-only projection of engine state for the presentation layer
//!
//! Hosts take a snapshot after each frame and draw from it; nothing in a
//! snapshot points back into the live simulation.

use serde::{Deserialize, Serialize};

use crate::consts::EFFECT_FADE_MS;
use crate::sim::{GameMode, HitEffect, Rect, RunState, World};

/// A carrier as the presentation layer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierView {
    pub id: u32,
    pub rect: Rect,
    pub value: String,
}

/// Everything a renderer or HUD needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: RunState,
    pub mode: Option<GameMode>,
    pub score: u32,
    pub lives: u32,
    pub prompt: Option<String>,
    pub player: Option<Rect>,
    pub carriers: Vec<CarrierView>,
    /// Hit markers still inside their fade window
    pub effects: Vec<HitEffect>,
    /// Simulation time, the clock hit markers are stamped with
    pub elapsed_ms: f64,
}

impl Snapshot {
    pub fn capture(state: RunState, world: Option<&World>) -> Self {
        let Some(world) = world else {
            return Self {
                state,
                mode: None,
                score: 0,
                lives: 0,
                prompt: None,
                player: None,
                carriers: Vec::new(),
                effects: Vec::new(),
                elapsed_ms: 0.0,
            };
        };

        let fade_start = world.elapsed_ms - EFFECT_FADE_MS;
        Self {
            state,
            mode: Some(world.run.mode),
            score: world.run.score,
            lives: world.run.lives,
            prompt: Some(world.question.prompt.clone()),
            player: Some(world.player.rect()),
            carriers: world
                .obstacles
                .iter()
                .map(|o| CarrierView {
                    id: o.id,
                    rect: o.rect(),
                    value: o.value.clone(),
                })
                .collect(),
            effects: world
                .effects
                .iter()
                .filter(|e| e.at_ms > fade_start)
                .copied()
                .collect(),
            elapsed_ms: world.elapsed_ms,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    use crate::config::EngineConfig;
    use crate::sim::{ArithmeticGenerator, QuestionBank};

    #[test]
    fn test_empty_snapshot_in_menu() {
        let snap = Snapshot::capture(RunState::Menu, None);
        assert_eq!(snap.state, RunState::Menu);
        assert!(snap.player.is_none());
        assert!(snap.prompt.is_none());
        assert!(snap.carriers.is_empty());
    }

    #[test]
    fn test_snapshot_mirrors_world_and_fades_effects() {
        let config = EngineConfig::default();
        let mut world = World::new(&config, QuestionBank::Arithmetic(ArithmeticGenerator::new(9)), 3);
        world.push_effect(Vec2::new(1.0, 1.0), true);
        world.elapsed_ms = EFFECT_FADE_MS + 100.0;
        world.push_effect(Vec2::new(2.0, 2.0), false);

        let snap = Snapshot::capture(RunState::Playing, Some(&world));
        assert_eq!(snap.mode, Some(GameMode::Arithmetic));
        assert_eq!(snap.lives, config.starting_lives);
        assert_eq!(snap.prompt.as_deref(), Some(world.question.prompt.as_str()));
        assert_eq!(snap.player, Some(world.player.rect()));
        assert_eq!(snap.effects.len(), 1);
        assert!(!snap.effects[0].success);
    }

    #[test]
    fn test_json_shape() {
        let snap = Snapshot::capture(RunState::GameOver, None);
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"state\":\"gameover\""));
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
