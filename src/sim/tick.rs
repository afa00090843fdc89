//! Fixed timestep simulation tick
//!
//! One tick runs the spawner, then physics, then collision resolution. The
//! order matters: collisions must see this tick's new carrier and the
//! player's updated position.

use glam::Vec2;

use super::collision::{CollisionResult, resolve_collisions};
use super::physics::{advance_obstacles, integrate_player};
use super::spawner::maybe_spawn;
use super::state::World;
use crate::config::EngineConfig;
use crate::consts::SIM_DT_MS;

/// Input sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Pointer position (the flyer's centre chases its y)
    pub target: Option<Vec2>,
    /// Held direction keys
    pub up: bool,
    pub down: bool,
}

impl TickInput {
    /// Pointer-only input
    pub fn aim(x: f32, y: f32) -> Self {
        Self {
            target: Some(Vec2::new(x, y)),
            ..Default::default()
        }
    }

    /// -1 for up, +1 for down, 0 for neither or both
    pub fn key_direction(&self) -> f32 {
        match (self.up, self.down) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub spawned: Option<u32>,
    pub collisions: CollisionResult,
}

impl TickOutcome {
    /// Lives ran out during this tick
    pub fn run_ended(&self) -> bool {
        self.collisions.lives_exhausted
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, config: &EngineConfig) -> TickOutcome {
    world.elapsed_ms += SIM_DT_MS;
    world.run.stats.ticks += 1;

    let spawned = maybe_spawn(world, config);
    integrate_player(&mut world.player, input, config);
    advance_obstacles(world);
    let collisions = resolve_collisions(world, config);

    TickOutcome {
        spawned,
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::question::{ArithmeticGenerator, QuestionBank};

    fn arithmetic(config: &EngineConfig, seed: u64) -> World {
        World::new(config, QuestionBank::Arithmetic(ArithmeticGenerator::new(10)), seed)
    }

    #[test]
    fn test_key_direction() {
        let both = TickInput {
            up: true,
            down: true,
            ..Default::default()
        };
        assert_eq!(both.key_direction(), 0.0);
        assert_eq!(TickInput { up: true, ..Default::default() }.key_direction(), -1.0);
        assert_eq!(TickInput { down: true, ..Default::default() }.key_direction(), 1.0);
    }

    #[test]
    fn test_tick_advances_clock_and_spawns() {
        let config = EngineConfig::default();
        let mut world = arithmetic(&config, 5);
        let outcome = tick(&mut world, &TickInput::default(), &config);
        assert!(outcome.spawned.is_some());
        assert_eq!(world.run.stats.ticks, 1);
        assert!((world.elapsed_ms - SIM_DT_MS).abs() < 1e-9);
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.obstacles[0].pos.x, config.canvas_width - config.carrier_speed);
    }

    #[test]
    fn test_collision_sees_fresh_spawn_same_tick() {
        // Player parked on the spawn edge of a one-lane field
        let config = EngineConfig {
            canvas_height: 50.0,
            player_height: 50.0,
            carrier_height: 50.0,
            player_x: 800.0,
            carrier_speed: 30.0,
            hit_padding: 0.0,
            ..EngineConfig::default()
        };
        let mut world = arithmetic(&config, 17);
        let first_prompt = world.question.prompt.clone();

        let outcome = tick(&mut world, &TickInput::default(), &config);
        assert!(outcome.spawned.is_some());
        assert!(outcome.collisions.correct, "first carrier is forced correct");
        assert_eq!(world.run.score, config.reward);
        assert!(world.obstacles.is_empty());
        assert_ne!(world.question.prompt, first_prompt);
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed and inputs stay identical
        let config = EngineConfig::default();
        let mut world1 = arithmetic(&config, 99999);
        let mut world2 = arithmetic(&config, 99999);

        let inputs = [
            TickInput::aim(0.0, 100.0),
            TickInput {
                down: true,
                ..Default::default()
            },
            TickInput::aim(0.0, 500.0),
            TickInput::default(),
        ];

        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut world1, input, &config);
            tick(&mut world2, input, &config);
        }

        assert_eq!(world1.run, world2.run);
        assert_eq!(world1.player, world2.player);
        assert_eq!(world1.obstacles, world2.obstacles);
        assert_eq!(world1.question, world2.question);
    }
}
