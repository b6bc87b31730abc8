use rand::Rng;

use nightgate_core::Millis;

use crate::config::HunterConfig;
use crate::events::FrameEvent;
use crate::stage::{next_stage_state, spawn_enemy};
use crate::state::{AmbientLights, GameState};

/// End-of-frame bookkeeping: timers, exit gate, camera and respawns.
///
/// Runs after collisions on a state that is not knocked down.
pub fn progress<R: Rng + ?Sized>(
    mut state: GameState,
    now: Millis,
    rng: &mut R,
    cfg: &HunterConfig,
    events: &mut Vec<FrameEvent>,
) -> GameState {
    if state.player.is_invincible && now > state.player.invincibility_end {
        state.player.is_invincible = false;
    }

    if now.saturating_sub(state.ambient.last_update) >= cfg.world.ambient_interval_ms {
        state.ambient = AmbientLights::generate(now, rng, cfg);
    }

    if state.player.rect().overlaps(&state.exit_gate) {
        return exit_stage(state, now, rng, cfg, events);
    }

    state.camera.x = camera_x(&state, cfg);

    let policy = state.stage.policy();
    if policy.respawn
        && state.live_enemy_count() < cfg.enemies.respawn_floor
        && let Some(enemy_id) = spawn_enemy(&mut state, cfg, now, rng)
        && let Some(enemy) = state.enemies.last()
    {
        events.push(FrameEvent::EnemySpawned {
            enemy_id,
            class: enemy.kind.class(),
        });
    }

    state
}

fn exit_stage<R: Rng + ?Sized>(
    state: GameState,
    now: Millis,
    rng: &mut R,
    cfg: &HunterConfig,
    events: &mut Vec<FrameEvent>,
) -> GameState {
    let from = state.stage;
    let score = state.score;
    let next = next_stage_state(state, cfg, now, rng);
    if next.is_game_ended {
        tracing::info!(score, "Final gate reached");
        events.push(FrameEvent::GameWon { score });
    } else {
        tracing::info!(from = from.name(), to = next.stage.name(), score, "Stage cleared");
        events.push(FrameEvent::StageCleared {
            from,
            to: next.stage,
        });
    }
    next
}

/// Centre the viewport on the player without showing past either stage edge.
pub fn camera_x(state: &GameState, cfg: &HunterConfig) -> f32 {
    let viewport = cfg.world.viewport_width;
    let max_x = (state.stage_width - viewport).max(0.0);
    (state.player.rect().center().x - viewport / 2.0).clamp(0.0, max_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AMBIENT_INTERVAL_MS, RESPAWN_FLOOR};
    use crate::stage::{StageId, build_stage};
    use nightgate_core::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cfg() -> HunterConfig {
        HunterConfig::default()
    }

    fn stage(id: StageId) -> (GameState, StdRng) {
        let mut rng = StdRng::seed_from_u64(11);
        let state = build_stage(id, &cfg(), 0, &mut rng);
        (state, rng)
    }

    #[test]
    fn invincibility_expires_after_end() {
        let (mut state, mut rng) = stage(StageId::Street);
        state.player.is_invincible = true;
        state.player.invincibility_end = 3_000;
        let state = progress(state, 3_000, &mut rng, &cfg(), &mut Vec::new());
        assert!(state.player.is_invincible);
        let state = progress(state, 3_001, &mut rng, &cfg(), &mut Vec::new());
        assert!(!state.player.is_invincible);
    }

    #[test]
    fn ambient_lights_refresh_on_interval() {
        let (state, mut rng) = stage(StageId::Street);
        let state = progress(state, AMBIENT_INTERVAL_MS - 1, &mut rng, &cfg(), &mut Vec::new());
        assert_eq!(state.ambient.last_update, 0);
        let state = progress(state, AMBIENT_INTERVAL_MS, &mut rng, &cfg(), &mut Vec::new());
        assert_eq!(state.ambient.last_update, AMBIENT_INTERVAL_MS);
        assert_eq!(state.ambient.lights.len(), cfg().world.ambient_light_count);
    }

    #[test]
    fn camera_follows_and_clamps() {
        let (mut state, mut rng) = stage(StageId::Street);
        let c = cfg();
        let state_at = |x: f32, mut s: GameState| {
            s.player.position.x = x;
            s
        };

        state = state_at(100.0, state);
        assert_eq!(camera_x(&state, &c), 0.0);

        state = state_at(4_000.0, state);
        assert_eq!(camera_x(&state, &c), 4_025.0 - 960.0);

        state = state_at(9_550.0, state);
        assert_eq!(camera_x(&state, &c), 9_600.0 - 1_920.0);

        let state = progress(state_at(4_000.0, state), 0, &mut rng, &c, &mut Vec::new());
        assert_eq!(state.camera.x, 3_065.0);
    }

    #[test]
    fn camera_pinned_on_narrow_stage() {
        let (mut state, _) = stage(StageId::Street);
        state.stage_width = 1_000.0;
        state.player.position.x = 900.0;
        assert_eq!(camera_x(&state, &cfg()), 0.0);
    }

    #[test]
    fn reaching_gate_moves_to_next_stage() {
        let (mut state, mut rng) = stage(StageId::Street);
        state.score = 120;
        state.kill_count = 12;
        state.player.hp = 4;
        state.player.position = Vec2::new(state.exit_gate.x + 10.0, 830.0);
        let mut events = Vec::new();
        let next = progress(state, 50, &mut rng, &cfg(), &mut events);
        assert_eq!(next.stage, StageId::Rooftops);
        assert_eq!(next.score, 120);
        assert_eq!(next.kill_count, 12);
        assert_eq!(next.player.hp, 4);
        assert!(next.projectiles.is_empty());
        assert_eq!(next.camera.x, 0.0);
        assert_eq!(
            events,
            vec![FrameEvent::StageCleared {
                from: StageId::Street,
                to: StageId::Rooftops
            }]
        );
    }

    #[test]
    fn reaching_final_gate_ends_game() {
        let (mut state, mut rng) = stage(StageId::Gate);
        state.score = 300;
        state.player.position = Vec2::new(state.exit_gate.x, 830.0);
        let mut events = Vec::new();
        let done = progress(state, 0, &mut rng, &cfg(), &mut events);
        assert!(done.is_game_ended);
        assert!(done.is_terminal());
        assert_eq!(done.stage, StageId::Gate);
        assert_eq!(events, vec![FrameEvent::GameWon { score: 300 }]);
    }

    #[test]
    fn respawns_one_enemy_below_floor() {
        let (mut state, mut rng) = stage(StageId::Street);
        state.enemies.truncate(2);
        let mut events = Vec::new();
        let state = progress(state, 0, &mut rng, &cfg(), &mut events);
        assert_eq!(state.live_enemy_count(), 3);
        assert!(matches!(events[..], [FrameEvent::EnemySpawned { .. }]));
        assert_eq!(state.validate(), Ok(()));
    }

    #[test]
    fn no_respawn_at_floor() {
        let (mut state, mut rng) = stage(StageId::Street);
        state.enemies.truncate(RESPAWN_FLOOR);
        let state = progress(state, 0, &mut rng, &cfg(), &mut Vec::new());
        assert_eq!(state.enemies.len(), RESPAWN_FLOOR);
    }

    #[test]
    fn dying_enemies_do_not_count_toward_floor() {
        let (mut state, mut rng) = stage(StageId::Street);
        state.enemies.truncate(RESPAWN_FLOOR);
        state.enemies[0].kill();
        let state = progress(state, 0, &mut rng, &cfg(), &mut Vec::new());
        assert_eq!(state.enemies.len(), RESPAWN_FLOOR + 1);
    }

    #[test]
    fn final_stage_never_respawns() {
        let (mut state, mut rng) = stage(StageId::Gate);
        state.enemies.clear();
        let state = progress(state, 0, &mut rng, &cfg(), &mut Vec::new());
        assert!(state.enemies.is_empty());
    }
}
