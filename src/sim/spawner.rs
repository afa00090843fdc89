//! Carrier spawning
//!
//! At most one carrier per tick, throttled by a spawn interval that shrinks as
//! the score grows. If no live carrier holds the right answer the next one is
//! forced to, so a correct target is never more than one interval away.

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, Obstacle, World};
use crate::config::EngineConfig;
use crate::consts::SPAWN_ATTEMPTS;

/// Current spawn interval for a given score
pub fn spawn_interval_ms(config: &EngineConfig, score: u32) -> f64 {
    if config.score_per_step == 0 {
        return config.spawn_interval_ms;
    }
    let steps = (score / config.score_per_step) as f64;
    (config.spawn_interval_ms - steps * config.interval_step_ms).max(config.min_spawn_interval_ms)
}

/// Spawn a carrier if the interval has elapsed. Returns the new carrier's id.
pub fn maybe_spawn(world: &mut World, config: &EngineConfig) -> Option<u32> {
    if let Some(last) = world.last_spawn_ms {
        if world.elapsed_ms - last < spawn_interval_ms(config, world.run.score) {
            return None;
        }
    }
    Some(spawn(world, config))
}

/// Spawn one carrier at the far edge, applying the fairness policy
pub fn spawn(world: &mut World, config: &EngineConfig) -> u32 {
    let want_correct = !world.has_live_correct() || world.rng.random_bool(config.correct_probability);

    let value = if want_correct {
        world.question.answer.clone()
    } else {
        // No distractors to offer means every carrier is correct
        world
            .bank
            .distractor(&world.question, &mut world.rng)
            .unwrap_or_else(|| world.question.answer.clone())
    };
    let is_correct = world.question.is_answer(&value);

    let y = pick_spawn_y(world, config);
    let id = world.next_entity_id();
    world.obstacles.push(Obstacle {
        id,
        pos: Vec2::new(config.canvas_width, y),
        width: config.carrier_width,
        height: config.carrier_height,
        speed: config.carrier_speed,
        value,
        is_correct,
    });
    world.last_spawn_ms = Some(world.elapsed_ms);
    world.run.stats.spawned += 1;
    world.events.push(GameEvent::Spawned {
        id,
        correct: is_correct,
    });
    log::debug!("Spawned carrier {} at y={:.0} (correct: {})", id, y, is_correct);
    id
}

/// Random height, nudged away from carriers still near the spawn edge
fn pick_spawn_y(world: &mut World, config: &EngineConfig) -> f32 {
    let max_y = (config.canvas_height - config.carrier_height).max(0.0);
    let edge = config.canvas_width - 2.0 * config.carrier_width;
    let nearby: Vec<f32> = world
        .obstacles
        .iter()
        .filter(|o| o.pos.x > edge)
        .map(|o| o.pos.y)
        .collect();

    let mut best = (f32::NEG_INFINITY, 0.0);
    for _ in 0..SPAWN_ATTEMPTS {
        let y = world.rng.random_range(0.0..=max_y);
        let gap = nearby
            .iter()
            .map(|other| (other - y).abs())
            .fold(f32::INFINITY, f32::min);
        if gap >= config.min_spawn_gap {
            return y;
        }
        if gap > best.0 {
            best = (gap, y);
        }
    }
    best.1
}
