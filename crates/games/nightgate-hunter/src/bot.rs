use crate::config::HunterConfig;
use crate::state::{GameState, Player, Projectile};

/// Horizontal distance at which an incoming projectile is worth ducking for.
const THREAT_DISTANCE: f32 = 240.0;

/// Controls the autopilot wants this frame. Movement is held, jump and
/// attack are one-shot presses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BotIntent {
    pub left: bool,
    pub right: bool,
    pub duck: bool,
    pub jump: bool,
    pub attack: bool,
}

/// Scripted player for headless runs and soak tests. Picks controls for the
/// current frame: duck incoming shots, swing at anything in reach, otherwise
/// walk toward the gate.
pub fn autopilot(state: &GameState, cfg: &HunterConfig) -> BotIntent {
    let player = &state.player;
    if state.is_terminal() {
        return BotIntent::default();
    }

    if state.projectiles.iter().any(|p| is_threat(player, p, cfg)) {
        return BotIntent {
            duck: true,
            ..BotIntent::default()
        };
    }

    let center = player.rect().center();
    let nearest = state
        .enemies
        .iter()
        .filter(|e| e.is_live())
        .map(|e| (e, e.rect().center()))
        .filter(|(_, c)| (c.y - center.y).abs() < cfg.combat.attack_vertical_range)
        .min_by(|(_, a), (_, b)| (a.x - center.x).abs().total_cmp(&(b.x - center.x).abs()));

    let mut intent = BotIntent {
        right: true,
        ..BotIntent::default()
    };
    let Some((enemy, at)) = nearest else {
        return intent;
    };
    let dx = at.x - center.x;
    if dx.abs() >= cfg.combat.attack_range {
        return intent;
    }

    let in_front = if player.facing_right {
        enemy.position.x > player.position.x
    } else {
        enemy.position.x < player.position.x
    };
    if !in_front {
        // Turn around first; the swing comes next frame.
        intent.right = dx > 0.0;
        intent.left = dx < 0.0;
    } else if player.is_attacking {
        // Swing on cooldown and the enemy is closing in: hop over it.
        intent.jump = !player.attack_is_active(&cfg.combat);
    } else {
        intent.right = false;
        intent.attack = true;
    }
    intent
}

/// Moving toward the player, close, and at a height ducking avoids.
fn is_threat(player: &Player, p: &Projectile, cfg: &HunterConfig) -> bool {
    let body = player.rect();
    let bolt = p.rect();
    let dx = bolt.center().x - body.center().x;
    let approaching = dx * p.velocity.x < 0.0;
    let feet = player.feet();
    let standing_top = feet - cfg.physics.stand_height;
    let ducked_top = feet - cfg.physics.duck_height;
    approaching
        && dx.abs() < THREAT_DISTANCE
        && bolt.bottom() > standing_top
        && ducked_top > bolt.bottom() - cfg.combat.dodge_tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{StageId, build_stage};
    use crate::state::{Enemy, EnemyKind, Heading};
    use crate::HunterGame;
    use nightgate_core::{ManualClock, Simulation, Vec2};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cfg() -> HunterConfig {
        HunterConfig::default()
    }

    fn arena() -> GameState {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = build_stage(StageId::Street, &cfg(), 0, &mut rng);
        state.enemies.clear();
        state.player.position = Vec2::new(1_000.0, 830.0);
        state
    }

    fn add_enemy(state: &mut GameState, x: f32) {
        let id = state.alloc_id().unwrap();
        let ground = state.platforms[0];
        state.enemies.push(Enemy::on_platform(
            id,
            EnemyKind::Melee,
            0,
            &ground,
            x,
            Heading::Left,
            &cfg().enemies,
        ));
    }

    fn add_bolt(state: &mut GameState, x: f32, y: f32, vx: f32) {
        let id = state.alloc_id().unwrap();
        state.projectiles.push(Projectile {
            id,
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, 0.0),
            width: 16.0,
            height: 8.0,
            owner_id: 0,
            dodged: false,
        });
    }

    #[test]
    fn walks_toward_gate_when_clear() {
        let intent = autopilot(&arena(), &cfg());
        assert_eq!(
            intent,
            BotIntent {
                right: true,
                ..BotIntent::default()
            }
        );
    }

    #[test]
    fn ducks_incoming_shot() {
        let mut state = arena();
        add_bolt(&mut state, 1_200.0, 852.0, -4.0);
        assert!(autopilot(&state, &cfg()).duck);
    }

    #[test]
    fn ignores_receding_or_low_shots() {
        let mut state = arena();
        add_bolt(&mut state, 1_200.0, 852.0, 4.0);
        add_bolt(&mut state, 1_200.0, 885.0, -4.0);
        assert!(!autopilot(&state, &cfg()).duck);
    }

    #[test]
    fn attacks_enemy_in_front() {
        let mut state = arena();
        add_enemy(&mut state, 1_060.0);
        let intent = autopilot(&state, &cfg());
        assert!(intent.attack);
        assert!(!intent.right);
    }

    #[test]
    fn turns_to_face_enemy_behind() {
        let mut state = arena();
        add_enemy(&mut state, 950.0);
        let intent = autopilot(&state, &cfg());
        assert!(intent.left);
        assert!(!intent.attack);
    }

    #[test]
    fn idle_when_finished() {
        let mut state = arena();
        state.is_game_ended = true;
        assert_eq!(autopilot(&state, &cfg()), BotIntent::default());
    }

    #[test]
    fn autopilot_run_keeps_state_consistent() {
        let mut game = HunterGame::new(ManualClock::new(0), 21, cfg());
        for _ in 0..3_000 {
            let intent = autopilot(game.state(), game.config());
            for (held, key) in [(intent.left, "a"), (intent.right, "d"), (intent.duck, "s")] {
                if held {
                    game.key_down(key);
                } else {
                    game.key_up(key);
                }
            }
            for (pressed, key) in [(intent.jump, "w"), (intent.attack, "space")] {
                if pressed {
                    game.key_down(key);
                    game.key_up(key);
                }
            }
            game.update();
            game.clock().advance(17);
            let s = game.state();
            assert!(s.validate().is_ok());
            assert_eq!(s.score, s.kill_count * cfg().combat.kill_score);
            if game.is_finished() {
                break;
            }
        }
    }
}
