use nightgate_core::{InputMap, Rect};

use crate::config::{HunterConfig, PhysicsConfig};
use crate::state::{Platform, Player};

/// Advance the player one frame from held keys and the stage geometry.
///
/// Jump and attack are edge-triggered and handled by [`try_jump`] and
/// [`try_attack`], never here.
pub fn step_player(
    mut player: Player,
    input: &InputMap,
    platforms: &[Platform],
    stage_width: f32,
    cfg: &HunterConfig,
) -> Player {
    if player.is_knocked_down {
        return player;
    }
    let physics = &cfg.physics;
    let controls = &cfg.controls;

    // Ducking shrinks the hurtbox from the bottom; position is not re-anchored.
    player.is_ducking = input.any_down(&controls.duck);
    player.height = if player.is_ducking {
        physics.duck_height
    } else {
        physics.stand_height
    };

    if !player.is_attacking {
        if input.any_down(&controls.left) {
            player.velocity.x = -physics.move_speed;
            player.facing_right = false;
        } else if input.any_down(&controls.right) {
            player.velocity.x = physics.move_speed;
            player.facing_right = true;
        } else {
            player.velocity.x = 0.0;
        }
    }

    player.velocity.y += physics.gravity;
    player.position += player.velocity;

    let max_x = (stage_width - player.width).max(0.0);
    player.position.x = player.position.x.clamp(0.0, max_x);

    for platform in platforms {
        if let Some(y) = landing_y(
            player.rect(),
            player.velocity.y,
            &platform.bounds,
            physics.snap_tolerance,
        ) {
            player.position.y = y;
            player.velocity.y = 0.0;
        }
    }

    if player.is_attacking {
        player.attack_frame += 1;
        if player.attack_frame > cfg.combat.attack_duration {
            player.is_attacking = false;
            player.attack_frame = 0;
        }
    }

    player
}

/// Landing resolution shared by the player and enemies.
///
/// A falling body whose bottom edge lies in `[top, top + height + tolerance]`
/// while horizontally overlapping the surface is snapped onto it. Returns the
/// new top-left y, or `None` if the body does not land.
pub fn landing_y(body: Rect, velocity_y: f32, surface: &Rect, tolerance: f32) -> Option<f32> {
    let bottom = body.bottom();
    let lands = velocity_y > 0.0
        && body.overlaps_x(surface)
        && bottom >= surface.top()
        && bottom <= surface.bottom() + tolerance;
    lands.then(|| surface.top() - body.height)
}

/// Feet within `snap_tolerance` of some platform top the body stands over.
pub fn is_supported(body: Rect, platforms: &[Platform], physics: &PhysicsConfig) -> bool {
    platforms.iter().any(|p| {
        body.overlaps_x(&p.bounds)
            && (body.bottom() - p.bounds.top()).abs() < physics.snap_tolerance
    })
}

/// Jump if standing on a platform. Returns whether the jump happened.
pub fn try_jump(player: &mut Player, platforms: &[Platform], physics: &PhysicsConfig) -> bool {
    if player.is_knocked_down || !is_supported(player.rect(), platforms, physics) {
        return false;
    }
    player.velocity.y = physics.jump_force;
    true
}

/// Begin an attack swing unless one is already running.
pub fn try_attack(player: &mut Player) -> bool {
    if player.is_knocked_down || player.is_attacking {
        return false;
    }
    player.is_attacking = true;
    player.attack_frame = 0;
    true
}
