//! Collision detection and resolution
//!
//! The player box is tested against every live carrier's box (shrunk by the
//! hit padding) in spawn order. A correct hit clears the field and moves on
//! to the next question; a wrong hit costs a life and removes only the
//! carrier that was struck.

use super::state::{GameEvent, World};
use crate::config::EngineConfig;

/// What collision resolution did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionResult {
    /// A correct carrier was hit and the field was cleared
    pub correct: bool,
    /// Number of wrong carriers hit
    pub wrong: u32,
    /// Lives reached zero; the run must end
    pub lives_exhausted: bool,
}

impl CollisionResult {
    pub fn any_hit(&self) -> bool {
        self.correct || self.wrong > 0
    }
}

/// Resolve every overlap between the player and live carriers
pub fn resolve_collisions(world: &mut World, config: &EngineConfig) -> CollisionResult {
    let mut result = CollisionResult::default();
    let player_box = world.player.rect();

    let mut i = 0;
    while i < world.obstacles.len() {
        let hitbox = world.obstacles[i].rect().shrink(config.hit_padding);
        if !player_box.overlaps(&hitbox) {
            i += 1;
            continue;
        }

        let carrier = world.obstacles.remove(i);
        let pos = carrier.rect().center();

        if world.question.is_answer(&carrier.value) {
            world.run.score = world.run.score.saturating_add(config.reward);
            world.run.stats.correct_hits += 1;
            world.obstacles.clear();
            world.push_effect(pos, true);
            world.events.push(GameEvent::CorrectHit { id: carrier.id, pos });
            log::debug!(
                "Correct hit on carrier {} ({}), score {}",
                carrier.id,
                carrier.value,
                world.run.score
            );
            world.advance_question();
            result.correct = true;
            break;
        }

        world.run.lives = world.run.lives.saturating_sub(1);
        world.run.score = world.run.score.saturating_sub(config.miss_penalty);
        world.run.stats.misses += 1;
        world.push_effect(pos, false);
        world.events.push(GameEvent::WrongHit {
            id: carrier.id,
            pos,
            lives: world.run.lives,
        });
        log::debug!(
            "Wrong hit on carrier {} ({}), {} lives left",
            carrier.id,
            carrier.value,
            world.run.lives
        );
        result.wrong += 1;

        if world.run.lives == 0 {
            world.events.push(GameEvent::GameOver {
                score: world.run.score,
            });
            result.lives_exhausted = true;
            break;
        }
        // `i` now points at the next carrier
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    use crate::sim::question::{Deck, DeckEntry, Question, QuestionBank};
    use crate::sim::state::Obstacle;

    fn setup() -> (World, EngineConfig) {
        let config = EngineConfig::default();
        let deck = Deck::from_entries(
            vec![
                DeckEntry::new("3 + 4", "7", ["6", "8"]),
                DeckEntry::new("5 + 5", "10", ["9", "11"]),
            ],
            false,
        );
        let world = World::new(&config, QuestionBank::Deck(deck), 1);
        (world, config)
    }

    fn carrier(world: &mut World, pos: Vec2, value: &str) -> u32 {
        let id = world.next_entity_id();
        let is_correct = world.question.is_answer(value);
        world.obstacles.push(Obstacle {
            id,
            pos,
            width: 90.0,
            height: 50.0,
            speed: 3.0,
            value: value.to_string(),
            is_correct,
        });
        id
    }

    #[test]
    fn test_miss_does_nothing() {
        let (mut world, config) = setup();
        carrier(&mut world, Vec2::new(600.0, 0.0), "7");
        let result = resolve_collisions(&mut world, &config);
        assert!(!result.any_hit());
        assert_eq!(world.obstacles.len(), 1);
    }

    #[test]
    fn test_correct_hit_clears_field_and_advances() {
        let (mut world, config) = setup();
        assert_eq!(world.question, Question::new("3 + 4", "7").with_distractors(["6", "8"]));
        let player = world.player.pos;
        carrier(&mut world, Vec2::new(600.0, 10.0), "8");
        carrier(&mut world, player, "7");
        carrier(&mut world, Vec2::new(700.0, 300.0), "6");

        let result = resolve_collisions(&mut world, &config);
        assert!(result.correct);
        assert_eq!(world.run.score, config.reward);
        assert!(world.obstacles.is_empty());
        assert_eq!(world.question.prompt, "5 + 5");
        assert_eq!(world.effects.len(), 1);
        assert!(world.effects[0].success);
        assert!(world.events.iter().any(|e| matches!(e, GameEvent::CorrectHit { .. })));
    }

    #[test]
    fn test_wrong_hit_costs_a_life_and_removes_only_that_carrier() {
        let (mut world, config) = setup();
        let player = world.player.pos;
        let far = carrier(&mut world, Vec2::new(600.0, 10.0), "7");
        let hit = carrier(&mut world, player, "6");

        let result = resolve_collisions(&mut world, &config);
        assert_eq!(result.wrong, 1);
        assert!(!result.lives_exhausted);
        assert_eq!(world.run.lives, config.starting_lives - 1);
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.obstacles[0].id, far);
        assert!(world.obstacles.iter().all(|o| o.id != hit));
        assert_eq!(world.question.prompt, "3 + 4");
        assert!(!world.effects[0].success);
    }

    #[test]
    fn test_last_life_ends_run_and_stops_processing() {
        let (mut world, config) = setup();
        world.run.lives = 1;
        let player = world.player.pos;
        carrier(&mut world, player, "6");
        carrier(&mut world, player, "8");

        let result = resolve_collisions(&mut world, &config);
        assert!(result.lives_exhausted);
        assert_eq!(result.wrong, 1);
        assert_eq!(world.run.lives, 0);
        assert_eq!(world.obstacles.len(), 1, "second overlap must not be resolved");
        assert!(matches!(world.events.last(), Some(GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_overlaps_resolve_in_spawn_order() {
        let (mut world, config) = setup();
        let player = world.player.pos;
        carrier(&mut world, player, "6");
        carrier(&mut world, player, "7");

        let result = resolve_collisions(&mut world, &config);
        assert_eq!(result.wrong, 1);
        assert!(result.correct);
        assert_eq!(world.run.lives, config.starting_lives - 1);
        assert_eq!(world.run.score, config.reward);
        assert!(world.obstacles.is_empty());
    }

    #[test]
    fn test_padding_makes_grazes_miss() {
        let (mut world, config) = setup();
        let p = world.player.rect();
        // Visual boxes overlap by less than the padding
        carrier(&mut world, Vec2::new(p.x + p.w - 2.0, p.y), "6");
        let result = resolve_collisions(&mut world, &config);
        assert!(!result.any_hit());
        assert_eq!(world.run.lives, config.starting_lives);
    }

    #[test]
    fn test_miss_penalty_saturates() {
        let (mut world, mut config) = setup();
        config.miss_penalty = 25;
        world.run.score = 10;
        let player = world.player.pos;
        carrier(&mut world, player, "8");
        resolve_collisions(&mut world, &config);
        assert_eq!(world.run.score, 0);
    }
}
