use rand::Rng;
use serde::{Deserialize, Serialize};

use nightgate_core::{InputMap, Millis, Rect, Vec2};

use crate::config::{CombatConfig, EnemyConfig, HunterConfig, PhysicsConfig};
use crate::stage::StageId;

/// Identifier shared by enemies and projectiles, unique within a run.
pub type EntityId = u64;

/// The hunter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
    pub hp: u32,
    pub max_hp: u32,
    pub is_attacking: bool,
    pub attack_frame: u32,
    pub is_ducking: bool,
    pub is_knocked_down: bool,
    pub facing_right: bool,
    pub is_invincible: bool,
    pub invincibility_end: Millis,
}

impl Player {
    /// Standing at `position`, full health, facing right.
    pub fn spawn(position: Vec2, physics: &PhysicsConfig, combat: &CombatConfig) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            width: physics.player_width,
            height: physics.stand_height,
            hp: combat.max_hp,
            max_hp: combat.max_hp,
            is_attacking: false,
            attack_frame: 0,
            is_ducking: false,
            is_knocked_down: false,
            facing_right: true,
            is_invincible: false,
            invincibility_end: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }

    pub fn feet(&self) -> f32 {
        self.position.y + self.height
    }

    /// Whether damage is currently ignored. Expiry is exclusive of `invincibility_end`.
    pub fn is_invincible_at(&self, now: Millis) -> bool {
        self.is_invincible && now <= self.invincibility_end
    }

    /// Inside the damage window of an attack swing.
    pub fn attack_is_active(&self, combat: &CombatConfig) -> bool {
        self.is_attacking && self.attack_frame < combat.attack_active_frames
    }
}

/// Patrol heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    Left,
    Right,
}

impl Heading {
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Self::Right
        } else {
            Self::Left
        }
    }
}

/// Shot scheduling carried only by ranged enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotClock {
    pub last_shot: Millis,
    pub next_shot: Millis,
    /// When the current wind-up began; `None` while patrolling.
    pub charge_started: Option<Millis>,
}

impl ShotClock {
    pub fn new<R: Rng + ?Sized>(now: Millis, rng: &mut R, cfg: &EnemyConfig) -> Self {
        Self {
            last_shot: now,
            next_shot: now + shot_delay(rng, cfg),
            charge_started: None,
        }
    }

    pub fn is_charging(&self) -> bool {
        self.charge_started.is_some()
    }
}

/// Random delay until the next shot, drawn from the configured interval.
pub fn shot_delay<R: Rng + ?Sized>(rng: &mut R, cfg: &EnemyConfig) -> Millis {
    rng.random_range(cfg.min_shoot_interval_ms..=cfg.max_shoot_interval_ms)
}

/// Behaviour variant. Only the ranged variant carries shot timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Red demon: patrols and hurts on contact.
    Melee,
    /// Blue demon: patrols, winds up, fires projectiles.
    Ranged(ShotClock),
    /// Purple demon: patrols and hops at random.
    Jumper,
}

impl EnemyKind {
    pub fn class(&self) -> EnemyClass {
        match self {
            Self::Melee => EnemyClass::Melee,
            Self::Ranged(_) => EnemyClass::Ranged,
            Self::Jumper => EnemyClass::Jumper,
        }
    }
}

/// Which kind to spawn, before any per-enemy state exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyClass {
    Melee,
    Ranged,
    Jumper,
}

impl EnemyClass {
    pub fn instantiate<R: Rng + ?Sized>(
        self,
        now: Millis,
        rng: &mut R,
        cfg: &EnemyConfig,
    ) -> EnemyKind {
        match self {
            Self::Melee => EnemyKind::Melee,
            Self::Ranged => EnemyKind::Ranged(ShotClock::new(now, rng, cfg)),
            Self::Jumper => EnemyKind::Jumper,
        }
    }
}

/// Alive, or playing the death animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Life {
    Alive,
    Dying { frame: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
    pub hp: u32,
    pub heading: Heading,
    pub platform_index: usize,
    pub kind: EnemyKind,
    pub life: Life,
}

impl Enemy {
    /// A fresh enemy resting on top of `platform` with its left edge at `x`.
    pub fn on_platform(
        id: EntityId,
        kind: EnemyKind,
        platform_index: usize,
        platform: &Platform,
        x: f32,
        heading: Heading,
        cfg: &EnemyConfig,
    ) -> Self {
        Self {
            id,
            position: Vec2::new(x, platform.bounds.top() - cfg.height),
            velocity: Vec2::ZERO,
            width: cfg.width,
            height: cfg.height,
            hp: 1,
            heading,
            platform_index,
            kind,
            life: Life::Alive,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }

    /// Still a threat: can hurt the player and be hit.
    pub fn is_live(&self) -> bool {
        self.life == Life::Alive && self.hp > 0
    }

    /// Start the death animation.
    pub fn kill(&mut self) {
        self.hp = 0;
        self.velocity = Vec2::ZERO;
        self.life = Life::Dying { frame: 0 };
        if let EnemyKind::Ranged(clock) = &mut self.kind {
            clock.charge_started = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
    /// Enemy that fired it. Lookup only; the enemy may already be gone.
    pub owner_id: EntityId,
    /// Set once a ducking player has let it pass.
    #[serde(default)]
    pub dodged: bool,
}

impl Projectile {
    pub fn rect(&self) -> Rect {
        Rect::at(self.position, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Index 0, spans the stage.
    Ground,
    /// Floating platform enemies may patrol.
    Ledge,
    /// Short obstacle standing on the ground. Turns enemies, can be stood on.
    Barrier,
}

/// Static axis-aligned surface. Only its top edge is solid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub bounds: Rect,
    pub kind: PlatformKind,
}

impl Platform {
    pub const fn new(x: f32, y: f32, width: f32, height: f32, kind: PlatformKind) -> Self {
        Self {
            bounds: Rect::new(x, y, width, height),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
}

/// Decorative window lights. Never read by gameplay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbientLights {
    pub last_update: Millis,
    pub lights: Vec<bool>,
}

impl AmbientLights {
    pub fn generate<R: Rng + ?Sized>(now: Millis, rng: &mut R, cfg: &HunterConfig) -> Self {
        let lights = (0..cfg.world.ambient_light_count)
            .map(|_| rng.random_bool(cfg.world.ambient_light_chance))
            .collect();
        Self {
            last_update: now,
            lights,
        }
    }
}

/// Complete snapshot of one frame: everything the renderer draws. The
/// steppers take it by value and hand back the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub platforms: Vec<Platform>,
    pub score: u32,
    pub camera: Camera,
    pub input: InputMap,
    pub kill_count: u32,
    pub stage: StageId,
    pub stage_width: f32,
    pub stage_height: f32,
    pub exit_gate: Rect,
    pub is_game_ended: bool,
    pub ambient: AmbientLights,
    pub next_entity_id: EntityId,
}

impl GameState {
    /// Knocked down or won. `step` is the identity on terminal states.
    pub fn is_terminal(&self) -> bool {
        self.player.is_knocked_down || self.is_game_ended
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_live()).count()
    }

    /// Next unused entity id, or `None` once the counter is exhausted.
    pub fn alloc_id(&mut self) -> Option<EntityId> {
        next_id(&mut self.next_entity_id)
    }

    /// Check the preconditions the steppers rely on.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.platforms.is_empty() {
            return Err(StateError::NoPlatforms);
        }
        if !(self.stage_width > 0.0 && self.stage_height > 0.0) {
            return Err(StateError::InvalidStageSize {
                width: self.stage_width,
                height: self.stage_height,
            });
        }
        if self.player.hp > self.player.max_hp {
            return Err(StateError::HpOutOfRange {
                hp: self.player.hp,
                max_hp: self.player.max_hp,
            });
        }
        if let Some(enemy) = self
            .enemies
            .iter()
            .find(|e| e.platform_index >= self.platforms.len())
        {
            return Err(StateError::DanglingPlatformIndex {
                enemy_id: enemy.id,
                platform_index: enemy.platform_index,
            });
        }
        let max_id = self
            .enemies
            .iter()
            .map(|e| e.id)
            .chain(self.projectiles.iter().map(|p| p.id))
            .max();
        if let Some(max_id) = max_id
            && max_id >= self.next_entity_id
        {
            return Err(StateError::StaleIdCounter {
                next: self.next_entity_id,
                seen: max_id,
            });
        }
        Ok(())
    }
}

/// Take the id at `counter` and bump it. `None` when no id is left to hand out.
pub fn next_id(counter: &mut EntityId) -> Option<EntityId> {
    let id = *counter;
    *counter = id.checked_add(1)?;
    Some(id)
}

/// A snapshot the steppers cannot safely advance.
#[derive(Debug, Clone, PartialEq)]
pub enum StateError {
    NoPlatforms,
    DanglingPlatformIndex {
        enemy_id: EntityId,
        platform_index: usize,
    },
    InvalidStageSize {
        width: f32,
        height: f32,
    },
    HpOutOfRange {
        hp: u32,
        max_hp: u32,
    },
    StaleIdCounter {
        next: EntityId,
        seen: EntityId,
    },
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPlatforms => write!(f, "stage has no platforms"),
            Self::DanglingPlatformIndex {
                enemy_id,
                platform_index,
            } => write!(
                f,
                "enemy {enemy_id} patrols missing platform {platform_index}"
            ),
            Self::InvalidStageSize { width, height } => {
                write!(f, "stage size {width}x{height} is not positive")
            },
            Self::HpOutOfRange { hp, max_hp } => write!(f, "hp {hp} exceeds max hp {max_hp}"),
            Self::StaleIdCounter { next, seen } => {
                write!(f, "entity id {seen} is not below next id {next}")
            },
        }
    }
}

impl std::error::Error for StateError {}
