//! Player integration and carrier motion
//!
//! Two movement models share one entry point: a lerp that closes a fixed
//! fraction of the gap each tick, and a velocity model with acceleration,
//! friction, a speed cap, and a soft bounce off the top and bottom edges.

use super::state::{Player, World};
use super::tick::TickInput;
use crate::config::{EngineConfig, MovementModel};
use crate::consts::TARGET_DEADZONE;

/// Advance the player by one tick. The result always lies inside the playfield.
pub fn integrate_player(player: &mut Player, input: &TickInput, config: &EngineConfig) {
    let max_y = config.player_max_y();

    // Pointer aims the flyer's centre
    if let Some(target) = input.target {
        if target.y.is_finite() {
            player.target_y = target.y - player.height / 2.0;
        }
    }
    let keys = input.key_direction();

    match config.movement {
        MovementModel::Lerp => {
            if keys != 0.0 {
                player.target_y += keys * config.key_step;
            }
            player.target_y = player.target_y.clamp(0.0, max_y);

            let old_y = player.pos.y;
            let y = player.pos.y + (player.target_y - player.pos.y) * config.lerp_factor;
            player.pos.y = y.clamp(0.0, max_y);
            player.vy = player.pos.y - old_y;
        }
        MovementModel::Velocity => {
            let dir = if keys != 0.0 {
                // Keys take over; releasing them should not snap back to a stale pointer
                player.target_y = player.pos.y;
                keys
            } else {
                let delta = player.target_y - player.pos.y;
                if delta.abs() > TARGET_DEADZONE {
                    delta.signum()
                } else {
                    0.0
                }
            };

            player.vy += config.accel * dir;
            player.vy *= config.friction;
            player.vy = player.vy.clamp(-config.max_speed, config.max_speed);
            player.pos.y += player.vy;

            if player.pos.y < 0.0 {
                player.pos.y = 0.0;
                player.vy = -player.vy * config.bounce;
            } else if player.pos.y > max_y {
                player.pos.y = max_y;
                player.vy = -player.vy * config.bounce;
            }
            player.target_y = player.target_y.clamp(0.0, max_y);
        }
    }

    player.pos.x = player.pos.x.clamp(0.0, config.player_max_x());
}

/// Move carriers toward the player side and drop the ones that left the screen
pub fn advance_obstacles(world: &mut World) {
    for obstacle in &mut world.obstacles {
        obstacle.pos.x -= obstacle.speed;
    }
    world.obstacles.retain(|o| o.pos.x + o.width > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    use crate::sim::question::{ArithmeticGenerator, QuestionBank};
    use crate::sim::state::Obstacle;

    fn player(config: &EngineConfig) -> Player {
        Player::new(config)
    }

    fn aim(y: f32) -> TickInput {
        TickInput {
            target: Some(Vec2::new(0.0, y)),
            ..Default::default()
        }
    }

    #[test]
    fn test_lerp_closes_fraction_of_gap() {
        let config = EngineConfig::with_movement(MovementModel::Lerp);
        let mut p = player(&config);
        p.pos.y = 100.0;
        // Centre target 220 -> top-edge target 200
        integrate_player(&mut p, &aim(220.0), &config);
        let expected = 100.0 + (200.0 - 100.0) * config.lerp_factor;
        assert!((p.pos.y - expected).abs() < 1e-4);
        assert!(p.vy > 0.0);
    }

    #[test]
    fn test_lerp_clamps_without_bounce() {
        let config = EngineConfig::with_movement(MovementModel::Lerp);
        let mut p = player(&config);
        for _ in 0..500 {
            integrate_player(&mut p, &aim(-5000.0), &config);
        }
        assert!(p.pos.y >= 0.0 && p.pos.y < 1e-3);
        assert!(p.vy <= 0.0 && p.vy.abs() < 1e-3);
    }

    #[test]
    fn test_velocity_accelerates_toward_target() {
        let config = EngineConfig::default();
        let mut p = player(&config);
        let start = p.pos.y;
        integrate_player(&mut p, &aim(start + 300.0), &config);
        assert!(p.vy > 0.0);
        assert!(p.pos.y > start);
        for _ in 0..100 {
            integrate_player(&mut p, &aim(start + 300.0), &config);
            assert!(p.vy.abs() <= config.max_speed);
        }
    }

    #[test]
    fn test_velocity_bounces_off_edge() {
        let config = EngineConfig::default();
        let mut p = player(&config);
        p.pos.y = 1.0;
        p.vy = -10.0;
        integrate_player(&mut p, &TickInput::default(), &config);
        assert_eq!(p.pos.y, 0.0);
        assert!(p.vy > 0.0, "velocity should invert on contact");
        assert!(p.vy < 10.0, "bounce should attenuate");
    }

    #[test]
    fn test_keys_override_pointer() {
        let config = EngineConfig::default();
        let mut p = player(&config);
        let start = p.pos.y;
        let input = TickInput {
            target: Some(Vec2::new(0.0, config.canvas_height)),
            up: true,
            ..Default::default()
        };
        for _ in 0..5 {
            integrate_player(&mut p, &input, &config);
        }
        assert!(p.pos.y < start);
    }

    #[test]
    fn test_non_finite_target_ignored() {
        let config = EngineConfig::default();
        let mut p = player(&config);
        let before = p.target_y;
        integrate_player(&mut p, &aim(f32::NAN), &config);
        assert_eq!(p.target_y, before);
        assert!(p.pos.y.is_finite());
    }

    #[test]
    fn test_obstacles_advance_and_cull() {
        let config = EngineConfig::default();
        let bank = QuestionBank::Arithmetic(ArithmeticGenerator::new(5));
        let mut world = World::new(&config, bank, 1);
        for (id, x) in [(1, 400.0), (2, -config.carrier_width + 1.0)] {
            world.obstacles.push(Obstacle {
                id,
                pos: Vec2::new(x, 100.0),
                width: config.carrier_width,
                height: config.carrier_height,
                speed: 3.0,
                value: "1".into(),
                is_correct: false,
            });
        }
        advance_obstacles(&mut world);
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.obstacles[0].id, 1);
        assert_eq!(world.obstacles[0].pos.x, 397.0);
    }

    proptest! {
        #[test]
        fn prop_player_stays_in_bounds(
            lerp in any::<bool>(),
            steps in prop::collection::vec((-2000.0f32..3000.0, any::<bool>(), any::<bool>()), 1..200),
        ) {
            let movement = if lerp { MovementModel::Lerp } else { MovementModel::Velocity };
            let config = EngineConfig::with_movement(movement);
            let mut p = player(&config);
            for (y, up, down) in steps {
                let input = TickInput { target: Some(Vec2::new(0.0, y)), up, down };
                integrate_player(&mut p, &input, &config);
                prop_assert!(p.pos.y >= 0.0 && p.pos.y <= config.player_max_y());
                prop_assert!(p.pos.x >= 0.0 && p.pos.x <= config.player_max_x());
                prop_assert!(p.vy.abs() <= config.max_speed.max(config.player_max_y()));
            }
        }
    }
}
