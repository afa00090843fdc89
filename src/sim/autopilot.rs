//! Demo mode - AI flies the game
//!
//! Chases the nearest correct carrier still ahead of the flyer. With nothing
//! worth chasing it dodges the closest wrong carrier sharing its lane, and
//! otherwise drifts back to the middle.

use super::state::World;
use super::tick::TickInput;
use crate::config::EngineConfig;

/// Pick this tick's input for the demo player
pub fn steer(world: &World, config: &EngineConfig) -> TickInput {
    let player = world.player.rect();
    let player_center = player.center();

    let ahead = world
        .obstacles
        .iter()
        .filter(|o| o.pos.x + o.width > player.x);

    let chase = ahead
        .clone()
        .filter(|o| o.is_correct)
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x));
    if let Some(target) = chase {
        let c = target.rect().center();
        return TickInput::aim(player_center.x, c.y);
    }

    let threat = ahead
        .filter(|o| !o.is_correct)
        .filter(|o| o.pos.y < player.y + player.h && player.y < o.pos.y + o.height)
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x));
    if let Some(threat) = threat {
        let c = threat.rect().center();
        // Dodge toward whichever side has more room
        let dodge_y = if c.y > config.canvas_height / 2.0 {
            c.y - threat.height - player.h
        } else {
            c.y + threat.height + player.h
        };
        return TickInput::aim(player_center.x, dodge_y);
    }

    TickInput::aim(player_center.x, config.canvas_height / 2.0)
}
