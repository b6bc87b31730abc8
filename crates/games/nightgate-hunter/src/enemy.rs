use rand::Rng;

use nightgate_core::{Millis, Rect, Vec2};

use crate::config::HunterConfig;
use crate::player::landing_y;
use crate::state::{
    Enemy, EnemyKind, EntityId, Heading, Life, Platform, Projectile, next_id, shot_delay,
};

/// Read-only world view plus the injected randomness an enemy step needs.
pub struct EnemyContext<'a, R: Rng + ?Sized> {
    pub now: Millis,
    pub platforms: &'a [Platform],
    pub cfg: &'a HunterConfig,
    pub rng: &'a mut R,
}

/// A projectile an enemy released this frame, before it is given an id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub owner_id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Result of advancing one enemy.
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyUpdate {
    Active { enemy: Enemy, shot: Option<Shot> },
    /// Death animation finished; drop the enemy.
    Removed,
}

/// Enemies and newly fired projectiles after one frame.
#[derive(Debug, Default)]
pub struct EnemyPhase {
    pub enemies: Vec<Enemy>,
    pub fired: Vec<Projectile>,
}

/// Advance every enemy, preserving order, and materialise their shots.
///
/// Shots are dropped once `id_counter` has no ids left.
pub fn step_enemies<R: Rng + ?Sized>(
    enemies: Vec<Enemy>,
    id_counter: &mut EntityId,
    ctx: &mut EnemyContext<'_, R>,
) -> EnemyPhase {
    let mut phase = EnemyPhase {
        enemies: Vec::with_capacity(enemies.len()),
        fired: Vec::new(),
    };
    for enemy in enemies {
        match step_enemy(enemy, ctx) {
            EnemyUpdate::Active { enemy, shot } => {
                if let Some(shot) = shot
                    && let Some(id) = next_id(id_counter)
                {
                    phase.fired.push(Projectile {
                        id,
                        position: shot.position,
                        velocity: shot.velocity,
                        width: ctx.cfg.enemies.projectile_width,
                        height: ctx.cfg.enemies.projectile_height,
                        owner_id: shot.owner_id,
                        dodged: false,
                    });
                }
                phase.enemies.push(enemy);
            },
            EnemyUpdate::Removed => {},
        }
    }
    phase
}

/// Advance a single enemy by one frame, dispatching on its variant.
pub fn step_enemy<R: Rng + ?Sized>(mut enemy: Enemy, ctx: &mut EnemyContext<'_, R>) -> EnemyUpdate {
    if let Life::Dying { frame } = enemy.life {
        let frame = frame + 1;
        if frame > ctx.cfg.enemies.death_anim_frames {
            return EnemyUpdate::Removed;
        }
        enemy.life = Life::Dying { frame };
        return EnemyUpdate::Active { enemy, shot: None };
    }

    let Some(own) = ctx.platforms.get(enemy.platform_index).map(|p| p.bounds) else {
        // Unreachable for validated states; freeze rather than guess.
        return EnemyUpdate::Active { enemy, shot: None };
    };

    let mut shot = None;
    let mut frozen = false;
    match &mut enemy.kind {
        EnemyKind::Melee => {},
        EnemyKind::Ranged(clock) => {
            let cfg = &ctx.cfg.enemies;
            match clock.charge_started {
                Some(started) if ctx.now >= started + cfg.charge_window_ms => {
                    clock.charge_started = None;
                    clock.last_shot = ctx.now;
                    clock.next_shot = ctx.now + shot_delay(ctx.rng, cfg);
                    shot = Some(muzzle(
                        &enemy.position,
                        enemy.width,
                        enemy.height,
                        enemy.heading,
                        enemy.id,
                        ctx.cfg,
                    ));
                },
                Some(_) => frozen = true,
                None if ctx.now >= clock.next_shot.saturating_sub(cfg.charge_window_ms) => {
                    clock.charge_started = Some(ctx.now);
                    frozen = true;
                },
                None => {},
            }
        },
        EnemyKind::Jumper => {
            let resting = enemy.velocity.y.abs() < f32::EPSILON
                && (enemy.position.y + enemy.height - own.top()).abs()
                    < ctx.cfg.physics.snap_tolerance;
            if resting && ctx.rng.random_bool(ctx.cfg.enemies.jump_chance) {
                enemy.velocity.y = ctx.cfg.enemies.jump_force;
            }
        },
    }

    if frozen {
        enemy.velocity.x = 0.0;
    } else {
        patrol(&mut enemy, ctx.platforms, &own, ctx.cfg.enemies.speed);
    }

    enemy.velocity.y += ctx.cfg.physics.gravity;
    enemy.position.y += enemy.velocity.y;
    if let Some(y) = landing_y(
        enemy.rect(),
        enemy.velocity.y,
        &own,
        ctx.cfg.physics.snap_tolerance,
    ) {
        enemy.position.y = y;
        enemy.velocity.y = 0.0;
    }

    EnemyUpdate::Active { enemy, shot }
}

/// Walk along the assigned platform, turning before a wall or the edge.
fn patrol(enemy: &mut Enemy, platforms: &[Platform], own: &Rect, speed: f32) {
    let mut vx = enemy.heading.sign() * speed;
    let tentative = Rect::new(
        enemy.position.x + vx,
        enemy.position.y,
        enemy.width,
        enemy.height,
    );
    let current = enemy.rect();
    // Only surfaces it would newly enter block it, so a jumper that came down
    // inside a barrier can still walk out.
    let blocked = platforms
        .iter()
        .any(|p| p.bounds.overlaps(&tentative) && !p.bounds.overlaps(&current));
    let off_edge = tentative.left() < own.left() || tentative.right() > own.right();
    if blocked || off_edge {
        enemy.heading = enemy.heading.flipped();
        vx = enemy.heading.sign() * speed;
    }
    enemy.velocity.x = vx;
    enemy.position.x += vx;
}

/// Spawn point and velocity of a shot: facing edge, upper third of the body.
fn muzzle(
    position: &Vec2,
    width: f32,
    height: f32,
    heading: Heading,
    owner_id: EntityId,
    cfg: &HunterConfig,
) -> Shot {
    let e = &cfg.enemies;
    let x = match heading {
        Heading::Right => position.x + width,
        Heading::Left => position.x - e.projectile_width,
    };
    let y = position.y + height / 3.0 - e.projectile_height / 2.0;
    Shot {
        owner_id,
        position: Vec2::new(x, y),
        velocity: Vec2::new(heading.sign() * e.projectile_speed(), 0.0),
    }
}
