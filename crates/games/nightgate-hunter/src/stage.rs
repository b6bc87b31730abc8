use rand::Rng;
use serde::{Deserialize, Serialize};

use nightgate_core::{InputMap, Millis, Rect, Vec2};

use crate::config::HunterConfig;
use crate::state::{
    AmbientLights, Camera, Enemy, EnemyClass, EntityId, GameState, Heading, Platform,
    PlatformKind, Player,
};

/// Top of the ground platform on every stage.
pub const GROUND_Y: f32 = 900.0;
pub const GROUND_HEIGHT: f32 = 100.0;
pub const STAGE_HEIGHT: f32 = 1080.0;
pub const LEDGE_HEIGHT: f32 = 30.0;
pub const GATE_WIDTH: f32 = 80.0;
pub const GATE_HEIGHT: f32 = 160.0;
/// Distance from the far edge of the stage to the gate's left edge.
pub const GATE_INSET: f32 = 200.0;
pub const PLAYER_SPAWN_X: f32 = 100.0;
/// Placement attempts before an enemy falls back to the ledge's left edge.
const SPAWN_ATTEMPTS: usize = 8;

/// Stages in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageId {
    Street,
    Rooftops,
    Gate,
}

impl StageId {
    pub const ALL: [StageId; 3] = [StageId::Street, StageId::Rooftops, StageId::Gate];

    pub fn next(self) -> Option<StageId> {
        match self {
            Self::Street => Some(Self::Rooftops),
            Self::Rooftops => Some(Self::Gate),
            Self::Gate => None,
        }
    }

    pub fn is_final(self) -> bool {
        self.next().is_none()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::Rooftops => "rooftops",
            Self::Gate => "gate",
        }
    }

    pub fn width(self) -> f32 {
        match self {
            Self::Street => 9_600.0,
            Self::Rooftops => 7_200.0,
            Self::Gate => 4_800.0,
        }
    }

    pub fn policy(self) -> StagePolicy {
        match self {
            Self::Street => StagePolicy {
                roster: 15,
                weights: SpawnWeights::new(5, 1, 1),
                respawn: true,
            },
            Self::Rooftops => StagePolicy {
                roster: 15,
                weights: SpawnWeights::new(3, 2, 2),
                respawn: true,
            },
            Self::Gate => StagePolicy {
                roster: 10,
                weights: SpawnWeights::new(2, 1, 1),
                respawn: false,
            },
        }
    }
}

/// Per-stage enemy population rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePolicy {
    /// Enemies placed when the stage is built.
    pub roster: usize,
    pub weights: SpawnWeights,
    /// Whether enemies keep spawning while the live count is low.
    pub respawn: bool,
}

/// Relative spawn odds per enemy class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnWeights {
    pub melee: u32,
    pub ranged: u32,
    pub jumper: u32,
}

impl SpawnWeights {
    pub const fn new(melee: u32, ranged: u32, jumper: u32) -> Self {
        Self {
            melee,
            ranged,
            jumper,
        }
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> EnemyClass {
        let total = self.melee + self.ranged + self.jumper;
        if total == 0 {
            return EnemyClass::Melee;
        }
        let roll = rng.random_range(0..total);
        if roll < self.melee {
            EnemyClass::Melee
        } else if roll < self.melee + self.ranged {
            EnemyClass::Ranged
        } else {
            EnemyClass::Jumper
        }
    }
}

/// Meta-progress that survives a stage transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Carry {
    pub score: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub kill_count: u32,
    pub input: InputMap,
    pub next_entity_id: EntityId,
}

impl Carry {
    pub fn fresh(cfg: &HunterConfig) -> Self {
        Self {
            score: 0,
            hp: cfg.combat.max_hp,
            max_hp: cfg.combat.max_hp,
            kill_count: 0,
            input: InputMap::new(),
            next_entity_id: 0,
        }
    }

    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.score,
            hp: state.player.hp,
            max_hp: state.player.max_hp,
            kill_count: state.kill_count,
            input: state.input.clone(),
            next_entity_id: state.next_entity_id,
        }
    }
}

/// Exit gate rectangle resting on the ground near the far edge.
pub fn exit_gate(width: f32) -> Rect {
    Rect::new(width - GATE_INSET, GROUND_Y - GATE_HEIGHT, GATE_WIDTH, GATE_HEIGHT)
}

/// Platform list for a stage. Index 0 is always the ground.
pub fn layout<R: Rng + ?Sized>(id: StageId, rng: &mut R) -> Vec<Platform> {
    let width = id.width();
    let mut platforms = vec![Platform::new(
        0.0,
        GROUND_Y,
        width,
        GROUND_HEIGHT,
        PlatformKind::Ground,
    )];

    match id {
        StageId::Street => {
            for i in 0..13 {
                let y = if i % 2 == 0 { 700.0 } else { 550.0 };
                platforms.push(ledge(500.0 + 700.0 * i as f32, y, 400.0));
            }
            // Crates on the 4th and 10th ledges.
            for &i in &[4usize, 10] {
                let l = platforms[i].bounds;
                platforms.push(crate_on(l, 60.0, 40.0));
            }
        },
        StageId::Rooftops => {
            let count = rng.random_range(8..=12u32);
            let mut x = 400.0;
            let limit = width - GATE_INSET - 200.0;
            for _ in 0..count {
                let w = rng.random_range(26..=46u32) as f32 * 10.0;
                if x + w > limit {
                    break;
                }
                let y = rng.random_range(48..=74u32) as f32 * 10.0;
                platforms.push(ledge(x, y, w));
                x += w + rng.random_range(12..=26u32) as f32 * 10.0;
            }
            // Chimneys on up to three of the widest roofs.
            let mut wide: Vec<Rect> = platforms[1..]
                .iter()
                .map(|p| p.bounds)
                .filter(|b| b.width >= 360.0)
                .collect();
            wide.sort_by(|a, b| b.width.total_cmp(&a.width));
            for roof in wide.into_iter().take(3) {
                platforms.push(crate_on(roof, 50.0, 50.0));
            }
        },
        StageId::Gate => {
            for &(x, y) in &[
                (600.0, 700.0),
                (1_300.0, 560.0),
                (2_000.0, 700.0),
                (2_700.0, 560.0),
                (3_400.0, 700.0),
            ] {
                platforms.push(ledge(x, y, 400.0));
            }
            let l = platforms[3].bounds;
            platforms.push(crate_on(l, 60.0, 40.0));
        },
    }

    platforms
}

fn ledge(x: f32, y: f32, width: f32) -> Platform {
    Platform::new(x, y, width, LEDGE_HEIGHT, PlatformKind::Ledge)
}

/// Barrier centred on top of a ledge.
fn crate_on(ledge: Rect, width: f32, height: f32) -> Platform {
    Platform::new(
        ledge.center().x - width / 2.0,
        ledge.top() - height,
        width,
        height,
        PlatformKind::Barrier,
    )
}

/// Build a fresh stage snapshot carrying meta-progress from `carry`.
pub fn build_stage_with<R: Rng + ?Sized>(
    id: StageId,
    carry: Carry,
    cfg: &HunterConfig,
    now: Millis,
    rng: &mut R,
) -> GameState {
    let platforms = layout(id, rng);
    let width = id.width();

    let mut player = Player::spawn(
        Vec2::new(PLAYER_SPAWN_X, GROUND_Y - cfg.physics.stand_height),
        &cfg.physics,
        &cfg.combat,
    );
    player.max_hp = carry.max_hp;
    player.hp = carry.hp.min(carry.max_hp);

    let mut state = GameState {
        player,
        enemies: Vec::new(),
        projectiles: Vec::new(),
        platforms,
        score: carry.score,
        camera: Camera::default(),
        input: carry.input,
        kill_count: carry.kill_count,
        stage: id,
        stage_width: width,
        stage_height: STAGE_HEIGHT,
        exit_gate: exit_gate(width),
        is_game_ended: false,
        ambient: AmbientLights::generate(now, rng, cfg),
        next_entity_id: carry.next_entity_id,
    };

    for _ in 0..id.policy().roster {
        spawn_enemy(&mut state, cfg, now, rng);
    }

    tracing::debug!(
        stage = id.name(),
        platforms = state.platforms.len(),
        enemies = state.enemies.len(),
        "Built stage"
    );
    state
}

/// Build `id` with fresh meta-progress.
pub fn build_stage<R: Rng + ?Sized>(
    id: StageId,
    cfg: &HunterConfig,
    now: Millis,
    rng: &mut R,
) -> GameState {
    build_stage_with(id, Carry::fresh(cfg), cfg, now, rng)
}

/// First stage, fresh run.
pub fn initial_state<R: Rng + ?Sized>(cfg: &HunterConfig, now: Millis, rng: &mut R) -> GameState {
    build_stage(StageId::Street, cfg, now, rng)
}

/// Following stage with score, hp, kills and input carried over.
///
/// On the final stage there is nothing to build; the run is marked won instead.
pub fn next_stage_state<R: Rng + ?Sized>(
    mut previous: GameState,
    cfg: &HunterConfig,
    now: Millis,
    rng: &mut R,
) -> GameState {
    match previous.stage.next() {
        Some(next) => build_stage_with(next, Carry::from_state(&previous), cfg, now, rng),
        None => {
            previous.is_game_ended = true;
            previous
        },
    }
}

/// Place one enemy on a random ledge using the stage's spawn weights.
///
/// Returns `None` when the stage has no ledges to spawn on or the id counter
/// is exhausted.
pub fn spawn_enemy<R: Rng + ?Sized>(
    state: &mut GameState,
    cfg: &HunterConfig,
    now: Millis,
    rng: &mut R,
) -> Option<EntityId> {
    let ledges: Vec<usize> = state
        .platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind == PlatformKind::Ledge && p.bounds.width >= cfg.enemies.width)
        .map(|(i, _)| i)
        .collect();
    if ledges.is_empty() {
        return None;
    }
    let id = state.alloc_id()?;

    let platform_index = ledges[rng.random_range(0..ledges.len())];
    let platform = state.platforms[platform_index];
    let class = state.stage.policy().weights.pick(rng);
    let kind = class.instantiate(now, rng, &cfg.enemies);
    let heading = Heading::random(rng);
    let x = spawn_x(&state.platforms, platform_index, cfg, rng);

    state.enemies.push(Enemy::on_platform(
        id,
        kind,
        platform_index,
        &platform,
        x,
        heading,
        &cfg.enemies,
    ));
    Some(id)
}

/// Random left edge on the ledge that does not start inside another surface.
fn spawn_x<R: Rng + ?Sized>(
    platforms: &[Platform],
    platform_index: usize,
    cfg: &HunterConfig,
    rng: &mut R,
) -> f32 {
    let ledge = platforms[platform_index].bounds;
    let span = (ledge.width - cfg.enemies.width).max(0.0);
    for _ in 0..SPAWN_ATTEMPTS {
        let x = ledge.x + rng.random::<f32>() * span;
        let body = Rect::new(
            x,
            ledge.top() - cfg.enemies.height,
            cfg.enemies.width,
            cfg.enemies.height,
        );
        if !platforms.iter().any(|p| p.bounds.overlaps(&body)) {
            return x;
        }
    }
    ledge.x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EnemyKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cfg() -> HunterConfig {
        HunterConfig::default()
    }

    #[test]
    fn every_stage_builds_valid_state() {
        let mut rng = StdRng::seed_from_u64(3);
        for id in StageId::ALL {
            let state = build_stage(id, &cfg(), 0, &mut rng);
            assert_eq!(state.validate(), Ok(()), "stage {id:?}");
            assert_eq!(state.platforms[0].kind, PlatformKind::Ground);
            assert_eq!(state.platforms[0].bounds.width, state.stage_width);
            assert_eq!(state.enemies.len(), id.policy().roster);
        }
    }

    #[test]
    fn enemies_never_spawn_on_ground() {
        let mut rng = StdRng::seed_from_u64(11);
        for id in StageId::ALL {
            let state = build_stage(id, &cfg(), 0, &mut rng);
            for enemy in &state.enemies {
                assert_ne!(enemy.platform_index, 0);
                let platform = state.platforms[enemy.platform_index];
                assert_eq!(platform.kind, PlatformKind::Ledge);
                assert_eq!(enemy.position.y + enemy.height, platform.bounds.top());
                assert!(enemy.position.x >= platform.bounds.left());
                assert!(enemy.position.x + enemy.width <= platform.bounds.right());
            }
        }
    }

    #[test]
    fn spawned_enemies_start_clear_of_barriers() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let state = build_stage(StageId::Street, &cfg(), 0, &mut rng);
            for enemy in &state.enemies {
                assert!(
                    !state.platforms.iter().any(|p| p.bounds.overlaps(&enemy.rect())),
                    "enemy {} starts inside a surface",
                    enemy.id
                );
            }
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(9);
        let state = build_stage(StageId::Street, &cfg(), 0, &mut rng);
        let mut ids: Vec<_> = state.enemies.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), state.enemies.len());
        assert_eq!(state.next_entity_id, state.enemies.len() as u64);
    }

    #[test]
    fn player_spawns_on_ground() {
        let mut rng = StdRng::seed_from_u64(0);
        let state = initial_state(&cfg(), 0, &mut rng);
        assert_eq!(state.stage, StageId::Street);
        assert_eq!(state.player.feet(), GROUND_Y);
        assert_eq!(state.player.hp, state.player.max_hp);
        assert_eq!(state.score, 0);
        assert_eq!(state.kill_count, 0);
        assert!(state.player.facing_right);
    }

    #[test]
    fn gate_sits_near_far_edge() {
        for id in StageId::ALL {
            let gate = exit_gate(id.width());
            assert_eq!(gate.bottom(), GROUND_Y);
            assert!(gate.right() < id.width());
            assert!(gate.left() > id.width() / 2.0);
        }
    }

    #[test]
    fn next_stage_carries_meta_progress() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut state = initial_state(&cfg(), 0, &mut rng);
        state.score = 120;
        state.kill_count = 12;
        state.player.hp = 4;
        state.input.set("d", true);

        let next = next_stage_state(state.clone(), &cfg(), 10_000, &mut rng);
        assert_eq!(next.stage, StageId::Rooftops);
        assert_eq!(next.score, 120);
        assert_eq!(next.kill_count, 12);
        assert_eq!(next.player.hp, 4);
        assert_eq!(next.player.max_hp, state.player.max_hp);
        assert!(next.input.is_down("d"));
        assert_ne!(next.platforms, state.platforms);
        assert!(next.projectiles.is_empty());
        // Ids keep counting so no id is reused across stages.
        assert!(next.enemies.iter().all(|e| e.id >= state.next_entity_id));
    }

    #[test]
    fn next_stage_after_final_ends_game() {
        let mut rng = StdRng::seed_from_u64(2);
        let state = build_stage(StageId::Gate, &cfg(), 0, &mut rng);
        let ended = next_stage_state(state.clone(), &cfg(), 0, &mut rng);
        assert!(ended.is_game_ended);
        assert_eq!(ended.stage, StageId::Gate);
        assert_eq!(ended.enemies, state.enemies);
    }

    #[test]
    fn rooftops_layout_is_seeded() {
        let a = layout(StageId::Rooftops, &mut StdRng::seed_from_u64(77));
        let b = layout(StageId::Rooftops, &mut StdRng::seed_from_u64(77));
        let c = layout(StageId::Rooftops, &mut StdRng::seed_from_u64(78));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().any(|p| p.kind == PlatformKind::Ledge));
    }

    #[test]
    fn ledges_stay_clear_of_gate() {
        let mut rng = StdRng::seed_from_u64(4);
        for id in StageId::ALL {
            let gate = exit_gate(id.width());
            for p in layout(id, &mut rng).iter().skip(1) {
                assert!(p.bounds.right() < gate.left(), "{id:?} ledge {p:?}");
            }
        }
    }

    #[test]
    fn weights_follow_distribution() {
        let weights = SpawnWeights::new(5, 1, 1);
        let mut rng = StdRng::seed_from_u64(13);
        let mut melee = 0;
        for _ in 0..7_000 {
            if weights.pick(&mut rng) == EnemyClass::Melee {
                melee += 1;
            }
        }
        // Expect ~5000.
        assert!((4_700..5_300).contains(&melee), "melee = {melee}");
    }

    #[test]
    fn zero_weights_fall_back_to_melee() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(SpawnWeights::new(0, 0, 0).pick(&mut rng), EnemyClass::Melee);
    }

    #[test]
    fn ranged_enemies_get_shot_clock() {
        let mut rng = StdRng::seed_from_u64(17);
        let state = build_stage(StageId::Rooftops, &cfg(), 500, &mut rng);
        for enemy in &state.enemies {
            if let EnemyKind::Ranged(clock) = enemy.kind {
                assert_eq!(clock.last_shot, 500);
                assert!(clock.next_shot >= 500 + cfg().enemies.min_shoot_interval_ms);
                assert!(!clock.is_charging());
            }
        }
    }

    #[test]
    fn spawn_stops_when_ids_run_out() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = build_stage(StageId::Street, &cfg(), 0, &mut rng);
        let before = state.enemies.len();
        state.next_entity_id = EntityId::MAX;
        assert_eq!(spawn_enemy(&mut state, &cfg(), 0, &mut rng), None);
        assert_eq!(state.enemies.len(), before);
    }
}
