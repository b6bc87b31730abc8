use nightgate_core::Millis;

use crate::config::HunterConfig;
use crate::events::{FrameEvent, HitSource};
use crate::state::{Enemy, EnemyClass, EntityId, GameState, Player, Projectile};

/// Apply every collision consequence for this frame, after all movement.
///
/// Three passes, in order: projectiles against the player, the attack swing
/// against enemies, then enemy bodies against the player. A knockdown ends
/// the resolution early.
pub fn resolve_collisions(
    mut state: GameState,
    now: Millis,
    cfg: &HunterConfig,
    events: &mut Vec<FrameEvent>,
) -> GameState {
    if state.player.is_knocked_down {
        return state;
    }

    let projectiles = std::mem::take(&mut state.projectiles);
    state.projectiles = projectile_hits(&mut state.player, projectiles, now, cfg, events);
    if knocked_down(&mut state, events) {
        return state;
    }

    let kills = attack_hits(&state.player, &mut state.enemies, cfg);
    for (enemy_id, class) in kills {
        state.score = state.score.saturating_add(cfg.combat.kill_score);
        state.kill_count += 1;
        events.push(FrameEvent::EnemyKilled {
            enemy_id,
            class,
            kill_count: state.kill_count,
        });
        if state.kill_count.checked_rem(cfg.combat.heal_every_kills) == Some(0)
            && heal(&mut state.player)
        {
            events.push(FrameEvent::Healed {
                hp: state.player.hp,
            });
        }
    }

    contact_hits(&mut state.player, &state.enemies, now, cfg, events);
    knocked_down(&mut state, events);
    state
}

/// Projectile vs player. Hits consume the projectile; dodged or blocked ones fly on.
fn projectile_hits(
    player: &mut Player,
    projectiles: Vec<Projectile>,
    now: Millis,
    cfg: &HunterConfig,
    events: &mut Vec<FrameEvent>,
) -> Vec<Projectile> {
    let mut survivors = Vec::with_capacity(projectiles.len());
    for mut p in projectiles {
        let body = player.rect();
        let bolt = p.rect();
        if !body.overlaps(&bolt) || player.is_invincible_at(now) {
            survivors.push(p);
            continue;
        }
        if player.is_ducking && body.top() > bolt.bottom() - cfg.combat.dodge_tolerance {
            if !p.dodged {
                p.dodged = true;
                events.push(FrameEvent::ShotDodged { projectile_id: p.id });
            }
            survivors.push(p);
            continue;
        }
        // Pushed the way the projectile was travelling.
        let push = if p.velocity.x < 0.0 { -1.0 } else { 1.0 };
        take_hit(player, push, now, cfg);
        events.push(FrameEvent::PlayerHit {
            source: HitSource::Projectile(p.id),
            hp: player.hp,
        });
    }
    survivors
}

/// Live enemies inside the active swing on the side the player faces.
/// All of them die; returns `(id, class)` per kill in enemy order.
fn attack_hits(
    player: &Player,
    enemies: &mut [Enemy],
    cfg: &HunterConfig,
) -> Vec<(EntityId, EnemyClass)> {
    if !player.attack_is_active(&cfg.combat) {
        return Vec::new();
    }
    let center = player.rect().center();
    let mut kills = Vec::new();
    for enemy in enemies.iter_mut().filter(|e| e.is_live()) {
        let target = enemy.rect().center();
        let in_range = (target.x - center.x).abs() < cfg.combat.attack_range
            && (target.y - center.y).abs() < cfg.combat.attack_vertical_range;
        let in_front = if player.facing_right {
            enemy.position.x > player.position.x
        } else {
            enemy.position.x < player.position.x
        };
        if in_range && in_front {
            enemy.kill();
            kills.push((enemy.id, enemy.kind.class()));
        }
    }
    kills
}

/// Enemy body vs player. Contact never harms the enemy.
fn contact_hits(
    player: &mut Player,
    enemies: &[Enemy],
    now: Millis,
    cfg: &HunterConfig,
    events: &mut Vec<FrameEvent>,
) {
    for enemy in enemies.iter().filter(|e| e.is_live()) {
        if player.is_invincible_at(now) {
            return;
        }
        if !enemy.rect().overlaps(&player.rect()) {
            continue;
        }
        let push = if enemy.position.x < player.position.x {
            1.0
        } else {
            -1.0
        };
        take_hit(player, push, now, cfg);
        events.push(FrameEvent::PlayerHit {
            source: HitSource::Contact(enemy.id),
            hp: player.hp,
        });
    }
}

/// One point of damage, a fresh invincibility window and a knockback impulse.
fn take_hit(player: &mut Player, push: f32, now: Millis, cfg: &HunterConfig) {
    player.hp = player.hp.saturating_sub(1);
    player.is_invincible = true;
    player.invincibility_end = now + cfg.combat.invincibility_ms;
    player.velocity.x = push * cfg.combat.knockback_x;
    player.velocity.y = cfg.combat.knockback_y;
}

/// Restore one hp up to the cap. Returns whether hp changed.
fn heal(player: &mut Player) -> bool {
    if player.hp >= player.max_hp {
        return false;
    }
    player.hp += 1;
    true
}

/// Flag the knockdown the moment hp runs out.
fn knocked_down(state: &mut GameState, events: &mut Vec<FrameEvent>) -> bool {
    if state.player.hp == 0 && !state.player.is_knocked_down {
        state.player.is_knocked_down = true;
        tracing::info!(score = state.score, stage = state.stage.name(), "Player knocked down");
        events.push(FrameEvent::KnockedDown { score: state.score });
    }
    state.player.is_knocked_down
}
