use serde::{Deserialize, Serialize};

/// Downward acceleration applied every frame (units/frame²).
pub const GRAVITY: f32 = 0.5;
/// Initial vertical velocity of a player jump (negative is up).
pub const JUMP_FORCE: f32 = -12.0;
/// Horizontal player speed while a direction is held.
pub const MOVE_SPEED: f32 = 5.0;
/// Distance from a platform top within which feet count as resting on it.
pub const SNAP_TOLERANCE: f32 = 10.0;
pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_STAND_HEIGHT: f32 = 70.0;
pub const PLAYER_DUCK_HEIGHT: f32 = 40.0;
pub const MAX_HP: u32 = 10;

/// Frames an attack animation lasts before the player can attack again.
pub const ATTACK_DURATION: u32 = 15;
/// Frames at the start of an attack during which it can hit.
pub const ATTACK_ACTIVE_FRAMES: u32 = 10;
pub const ATTACK_RANGE: f32 = 80.0;
pub const ATTACK_VERTICAL_RANGE: f32 = 80.0;
pub const KILL_SCORE: u32 = 10;
/// Every this many kills heals the player by one.
pub const HEAL_EVERY_KILLS: u32 = 5;
pub const INVINCIBILITY_DURATION_MS: u64 = 3_000;
pub const KNOCKBACK_X: f32 = 10.0;
pub const KNOCKBACK_Y: f32 = -8.0;
/// Slack below a projectile's bottom edge a ducking player's head may reach.
pub const DODGE_TOLERANCE: f32 = 10.0;

pub const ENEMY_SPEED: f32 = 2.0;
pub const ENEMY_WIDTH: f32 = 50.0;
pub const ENEMY_HEIGHT: f32 = 60.0;
/// Per-frame chance that a resting jumper leaps.
pub const JUMPER_JUMP_CHANCE: f64 = 0.01;
pub const JUMPER_JUMP_FORCE: f32 = -9.0;
pub const DEATH_ANIM_FRAMES: u32 = 20;
pub const CHARGE_WINDOW_MS: u64 = 1_000;
pub const MIN_SHOOT_INTERVAL_MS: u64 = 2_000;
pub const MAX_SHOOT_INTERVAL_MS: u64 = 4_000;
/// Projectile speed as a multiple of enemy patrol speed.
pub const PROJECTILE_SPEED_FACTOR: f32 = 2.0;
pub const PROJECTILE_WIDTH: f32 = 16.0;
pub const PROJECTILE_HEIGHT: f32 = 8.0;
/// Live enemy count below which a new enemy spawns each frame.
pub const RESPAWN_FLOOR: usize = 5;

pub const VIEWPORT_WIDTH: f32 = 1920.0;
pub const VIEWPORT_HEIGHT: f32 = 1080.0;
pub const OFF_SCREEN_MARGIN: f32 = 100.0;
pub const AMBIENT_INTERVAL_MS: u64 = 5_000;
pub const AMBIENT_LIGHT_COUNT: usize = 24;
pub const AMBIENT_LIGHT_CHANCE: f64 = 0.7;

/// Player movement and body tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub jump_force: f32,
    pub move_speed: f32,
    pub snap_tolerance: f32,
    pub player_width: f32,
    pub stand_height: f32,
    pub duck_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_force: JUMP_FORCE,
            move_speed: MOVE_SPEED,
            snap_tolerance: SNAP_TOLERANCE,
            player_width: PLAYER_WIDTH,
            stand_height: PLAYER_STAND_HEIGHT,
            duck_height: PLAYER_DUCK_HEIGHT,
        }
    }
}

/// Damage, attack and reward tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub max_hp: u32,
    pub attack_duration: u32,
    pub attack_active_frames: u32,
    pub attack_range: f32,
    pub attack_vertical_range: f32,
    pub kill_score: u32,
    pub heal_every_kills: u32,
    pub invincibility_ms: u64,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub dodge_tolerance: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            max_hp: MAX_HP,
            attack_duration: ATTACK_DURATION,
            attack_active_frames: ATTACK_ACTIVE_FRAMES,
            attack_range: ATTACK_RANGE,
            attack_vertical_range: ATTACK_VERTICAL_RANGE,
            kill_score: KILL_SCORE,
            heal_every_kills: HEAL_EVERY_KILLS,
            invincibility_ms: INVINCIBILITY_DURATION_MS,
            knockback_x: KNOCKBACK_X,
            knockback_y: KNOCKBACK_Y,
            dodge_tolerance: DODGE_TOLERANCE,
        }
    }
}

/// Enemy AI and projectile tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    pub jump_chance: f64,
    pub jump_force: f32,
    pub death_anim_frames: u32,
    pub charge_window_ms: u64,
    pub min_shoot_interval_ms: u64,
    pub max_shoot_interval_ms: u64,
    pub projectile_speed_factor: f32,
    pub projectile_width: f32,
    pub projectile_height: f32,
    pub respawn_floor: usize,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: ENEMY_SPEED,
            width: ENEMY_WIDTH,
            height: ENEMY_HEIGHT,
            jump_chance: JUMPER_JUMP_CHANCE,
            jump_force: JUMPER_JUMP_FORCE,
            death_anim_frames: DEATH_ANIM_FRAMES,
            charge_window_ms: CHARGE_WINDOW_MS,
            min_shoot_interval_ms: MIN_SHOOT_INTERVAL_MS,
            max_shoot_interval_ms: MAX_SHOOT_INTERVAL_MS,
            projectile_speed_factor: PROJECTILE_SPEED_FACTOR,
            projectile_width: PROJECTILE_WIDTH,
            projectile_height: PROJECTILE_HEIGHT,
            respawn_floor: RESPAWN_FLOOR,
        }
    }
}

impl EnemyConfig {
    pub fn projectile_speed(&self) -> f32 {
        self.speed * self.projectile_speed_factor
    }
}

/// Viewport, pruning and ambient tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub off_screen_margin: f32,
    pub ambient_interval_ms: u64,
    pub ambient_light_count: usize,
    pub ambient_light_chance: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            off_screen_margin: OFF_SCREEN_MARGIN,
            ambient_interval_ms: AMBIENT_INTERVAL_MS,
            ambient_light_count: AMBIENT_LIGHT_COUNT,
            ambient_light_chance: AMBIENT_LIGHT_CHANCE,
        }
    }
}

/// Logical controls mapped to lowercase key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub duck: Vec<String>,
    pub jump: Vec<String>,
    pub attack: Vec<String>,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        fn keys(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        }
        Self {
            left: keys(&["a", "arrowleft"]),
            right: keys(&["d", "arrowright"]),
            duck: keys(&["s", "arrowdown"]),
            jump: keys(&["w", "arrowup"]),
            attack: keys(&["space"]),
        }
    }
}

/// Top-level hunter tuning, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HunterConfig {
    pub physics: PhysicsConfig,
    pub combat: CombatConfig,
    pub enemies: EnemyConfig,
    pub world: WorldConfig,
    pub controls: ControlsConfig,
}

impl HunterConfig {
    /// Load from `NIGHTGATE_CONFIG` or `config/nightgate.toml`, falling back to
    /// defaults if the file is missing, unparseable or fails validation.
    pub fn load() -> Self {
        let path = std::env::var("NIGHTGATE_CONFIG")
            .unwrap_or_else(|_| "config/nightgate.toml".to_string());
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => {
                tracing::debug!(%path, "No hunter config found, using defaults");
                return Self::default();
            },
        };
        match Self::from_toml(&content) {
            Ok(cfg) => {
                tracing::info!(%path, "Loaded hunter config");
                cfg
            },
            Err(problems) => {
                for problem in &problems {
                    tracing::warn!(%path, "{problem}");
                }
                tracing::warn!(%path, "Ignoring hunter config, using defaults");
                Self::default()
            },
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, Vec<String>> {
        let cfg = toml::from_str::<Self>(content).map_err(|e| vec![format!("parse error: {e}")])?;
        let problems = cfg.validate();
        if problems.is_empty() {
            Ok(cfg)
        } else {
            Err(problems)
        }
    }

    /// Return every invariant the tuning violates. Empty means usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let p = &self.physics;
        let c = &self.combat;
        let e = &self.enemies;
        let w = &self.world;

        if p.gravity <= 0.0 {
            problems.push("physics.gravity must be > 0".to_string());
        }
        if p.jump_force >= 0.0 {
            problems.push("physics.jump_force must be negative (up)".to_string());
        }
        if p.move_speed <= 0.0 {
            problems.push("physics.move_speed must be > 0".to_string());
        }
        if p.snap_tolerance < 0.0 {
            problems.push("physics.snap_tolerance must be >= 0".to_string());
        }
        if p.player_width <= 0.0 || p.stand_height <= 0.0 {
            problems.push("physics player size must be positive".to_string());
        }
        if p.duck_height <= 0.0 || p.duck_height > p.stand_height {
            problems.push("physics.duck_height must be in (0, stand_height]".to_string());
        }
        if c.max_hp == 0 {
            problems.push("combat.max_hp must be > 0".to_string());
        }
        if c.attack_active_frames > c.attack_duration {
            problems.push(
                "combat.attack_active_frames must not exceed attack_duration".to_string(),
            );
        }
        if c.heal_every_kills == 0 {
            problems.push("combat.heal_every_kills must be > 0".to_string());
        }
        if e.speed <= 0.0 {
            problems.push("enemies.speed must be > 0".to_string());
        }
        if e.width <= 0.0 || e.height <= 0.0 {
            problems.push("enemies size must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&e.jump_chance) {
            problems.push("enemies.jump_chance must be within [0, 1]".to_string());
        }
        if e.min_shoot_interval_ms > e.max_shoot_interval_ms {
            problems.push(
                "enemies.min_shoot_interval_ms must not exceed max_shoot_interval_ms".to_string(),
            );
        }
        if e.charge_window_ms > e.min_shoot_interval_ms {
            problems.push(
                "enemies.charge_window_ms must not exceed min_shoot_interval_ms".to_string(),
            );
        }
        if e.projectile_speed_factor <= 1.0 {
            problems.push("enemies.projectile_speed_factor must be > 1".to_string());
        }
        if w.viewport_width <= 0.0 || w.viewport_height <= 0.0 {
            problems.push("world viewport must be positive".to_string());
        }
        if w.ambient_interval_ms == 0 {
            problems.push("world.ambient_interval_ms must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&w.ambient_light_chance) {
            problems.push("world.ambient_light_chance must be within [0, 1]".to_string());
        }
        problems
    }
}
