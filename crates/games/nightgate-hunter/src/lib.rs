pub mod bot;
pub mod collision;
pub mod config;
pub mod enemy;
pub mod events;
pub mod player;
pub mod progression;
pub mod projectile;
pub mod stage;
pub mod state;

use rand::SeedableRng;
use rand::rngs::StdRng;

use nightgate_core::input::normalize_key;
use nightgate_core::simulation_boilerplate;
use nightgate_core::snapshot::{self, SnapshotError};
use nightgate_core::{Clock, InputMap, SimMetadata, Simulation, SystemClock};

pub use config::HunterConfig;
pub use events::{FrameEvent, HitSource};
pub use stage::StageId;
pub use state::GameState;

use enemy::EnemyContext;

/// Injected collaborators for a run: time source, seeded randomness and tuning.
pub struct SimContext<C: Clock> {
    pub clock: C,
    pub rng: StdRng,
    pub config: HunterConfig,
}

impl<C: Clock> SimContext<C> {
    /// Tuning that fails [`HunterConfig::validate`] is replaced by the defaults.
    pub fn new(clock: C, seed: u64, config: HunterConfig) -> Self {
        let problems = config.validate();
        let config = if problems.is_empty() {
            config
        } else {
            for problem in &problems {
                tracing::warn!("{problem}");
            }
            tracing::warn!("Ignoring hunter config, using defaults");
            HunterConfig::default()
        };
        Self {
            clock,
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }
}

/// One advanced frame and what happened during it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub state: GameState,
    pub events: Vec<FrameEvent>,
}

/// Advance one frame.
///
/// The clock is read exactly once. Phases run in a fixed order: player,
/// enemies, projectiles, collisions, then progression (skipped if the
/// player was just knocked down). Terminal states come back unchanged.
pub fn advance<C: Clock>(state: GameState, input: &InputMap, ctx: &mut SimContext<C>) -> Frame {
    if state.is_terminal() {
        return Frame {
            state,
            events: Vec::new(),
        };
    }
    let now = ctx.clock.now_ms();
    let cfg = &ctx.config;
    let mut events = Vec::new();
    let mut state = state;
    state.input = input.clone();

    state.player = player::step_player(
        state.player,
        &state.input,
        &state.platforms,
        state.stage_width,
        cfg,
    );

    let enemies = std::mem::take(&mut state.enemies);
    let mut enemy_ctx = EnemyContext {
        now,
        platforms: &state.platforms,
        cfg,
        rng: &mut ctx.rng,
    };
    let phase = enemy::step_enemies(enemies, &mut state.next_entity_id, &mut enemy_ctx);
    state.enemies = phase.enemies;
    for shot in &phase.fired {
        events.push(FrameEvent::ProjectileFired {
            enemy_id: shot.owner_id,
            projectile_id: shot.id,
        });
    }

    let mut projectiles = std::mem::take(&mut state.projectiles);
    projectiles.extend(phase.fired);
    state.projectiles = projectile::step_projectiles(
        projectiles,
        state.stage_width,
        state.stage_height,
        cfg.world.off_screen_margin,
    );

    state = collision::resolve_collisions(state, now, cfg, &mut events);
    if state.player.is_knocked_down {
        return Frame { state, events };
    }

    state = progression::progress(state, now, &mut ctx.rng, cfg, &mut events);
    Frame { state, events }
}

/// [`advance`] without the event list.
pub fn step<C: Clock>(state: GameState, input: &InputMap, ctx: &mut SimContext<C>) -> GameState {
    advance(state, input, ctx).state
}

/// First stage of a fresh run.
pub fn initial_state<C: Clock>(ctx: &mut SimContext<C>) -> GameState {
    let now = ctx.clock.now_ms();
    stage::initial_state(&ctx.config, now, &mut ctx.rng)
}

/// The stage after `previous`, or `previous` marked won if it was the last.
pub fn next_stage_state<C: Clock>(previous: GameState, ctx: &mut SimContext<C>) -> GameState {
    let now = ctx.clock.now_ms();
    stage::next_stage_state(previous, &ctx.config, now, &mut ctx.rng)
}

/// Edge-triggered player actions, fired once per key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Jump,
    Attack,
}

impl Action {
    /// The action bound to `key`, if any.
    pub fn for_key(key: &str, cfg: &HunterConfig) -> Option<Self> {
        let key = normalize_key(key);
        let bound = |keys: &[String]| keys.iter().any(|k| normalize_key(k) == key);
        if bound(&cfg.controls.jump) {
            Some(Self::Jump)
        } else if bound(&cfg.controls.attack) {
            Some(Self::Attack)
        } else {
            None
        }
    }
}

/// Apply an action to a running state. Returns whether it took effect.
pub fn apply_action(state: &mut GameState, action: Action, cfg: &HunterConfig) -> bool {
    if state.is_terminal() {
        return false;
    }
    match action {
        Action::Jump => player::try_jump(&mut state.player, &state.platforms, &cfg.physics),
        Action::Attack => player::try_attack(&mut state.player),
    }
}

/// A hunt driven by key events and a per-tick [`Simulation::update`].
///
/// Held keys are tracked here and copied into the state each frame; they are
/// not part of the snapshot until the next update records them.
pub struct HunterGame<C: Clock = SystemClock> {
    ctx: SimContext<C>,
    state: GameState,
    held: InputMap,
    paused: bool,
}

impl HunterGame<SystemClock> {
    /// Wall-clock game with tuning from [`HunterConfig::load`].
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SystemClock::new(), seed, HunterConfig::load())
    }
}

impl<C: Clock> HunterGame<C> {
    /// Invalid tuning is logged and replaced by the defaults, see [`SimContext::new`].
    pub fn new(clock: C, seed: u64, config: HunterConfig) -> Self {
        let mut ctx = SimContext::new(clock, seed, config);
        let state = initial_state(&mut ctx);
        tracing::info!(seed, stage = state.stage.name(), "New hunt");
        Self {
            ctx,
            state,
            held: InputMap::new(),
            paused: false,
        }
    }

    pub fn clock(&self) -> &C {
        &self.ctx.clock
    }

    pub fn config(&self) -> &HunterConfig {
        &self.ctx.config
    }
}

impl<C: Clock> Simulation for HunterGame<C> {
    type State = GameState;
    type Event = FrameEvent;

    fn metadata(&self) -> SimMetadata {
        SimMetadata {
            name: "Nightgate".to_string(),
            description: "Fight through three stages of demons to reach the gate.".to_string(),
            controls: "A/D move, S duck, W jump, Space attack".to_string(),
        }
    }

    fn key_down(&mut self, key: &str) {
        let was_down = self.held.set(key, true);
        if was_down || self.paused {
            return;
        }
        if let Some(action) = Action::for_key(key, &self.ctx.config) {
            let applied = apply_action(&mut self.state, action, &self.ctx.config);
            tracing::trace!(?action, applied, "Key action");
        }
    }

    fn key_up(&mut self, key: &str) {
        self.held.set(key, false);
    }

    fn update(&mut self) -> Vec<FrameEvent> {
        if self.paused || self.state.is_terminal() {
            return Vec::new();
        }
        let frame = advance(self.state.clone(), &self.held, &mut self.ctx);
        for event in &frame.events {
            tracing::debug!(?event, "Frame event");
        }
        self.state = frame.state;
        frame.events
    }

    fn apply_state(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        let state: GameState = snapshot::decode(bytes)?;
        if let Err(e) = state.validate() {
            tracing::warn!(error = %e, "Rejected snapshot");
            return Err(SnapshotError::Invalid(e.to_string()));
        }
        self.state = state;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    simulation_boilerplate!(state_type: GameState);
}
