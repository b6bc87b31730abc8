use serde::Serialize;

use nightgate_core::time::frame_millis;
use nightgate_core::{ManualClock, Simulation};
use nightgate_hunter::bot::{BotIntent, autopilot};
use nightgate_hunter::config::ControlsConfig;
use nightgate_hunter::{FrameEvent, HunterConfig, HunterGame};

use crate::config::RunnerConfig;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    KnockedDown,
    /// Frame budget ran out first.
    Running,
}

/// Printed once at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub stage: &'static str,
    pub score: u32,
    pub kills: u32,
    pub hp: u32,
    pub frames: u64,
    pub elapsed_ms: u64,
    pub stages_cleared: u32,
    pub outcome: Outcome,
}

/// Simulate up to `config.frames` ticks on a manual clock, standing in for
/// the display scheduler.
pub fn run(config: &RunnerConfig, hunter: HunterConfig) -> RunSummary {
    let step_ms = frame_millis(config.tick_rate_hz);
    let mut game = HunterGame::new(ManualClock::new(0), config.seed, hunter);
    let controls = game.config().controls.clone();
    let mut frames = 0;
    let mut stages_cleared = 0;

    while frames < config.frames && !game.is_finished() {
        if config.autopilot {
            let intent = autopilot(game.state(), game.config());
            press(&mut game, &controls, intent);
        }
        for event in game.update() {
            if matches!(event, FrameEvent::StageCleared { .. }) {
                stages_cleared += 1;
            }
        }
        game.clock().advance(step_ms);
        frames += 1;
    }

    let state = game.state();
    let outcome = if state.is_game_ended {
        Outcome::Won
    } else if state.player.is_knocked_down {
        Outcome::KnockedDown
    } else {
        Outcome::Running
    };
    tracing::info!(?outcome, frames, score = state.score, "Run finished");

    RunSummary {
        seed: config.seed,
        stage: state.stage.name(),
        score: state.score,
        kills: state.kill_count,
        hp: state.player.hp,
        frames,
        elapsed_ms: frames * step_ms,
        stages_cleared,
        outcome,
    }
}

/// Translate bot intent into key events. Movement keys are held across
/// frames; jump and attack are tapped so each request is a fresh press.
fn press(game: &mut HunterGame<ManualClock>, controls: &ControlsConfig, intent: BotIntent) {
    let held = [
        (&controls.left, intent.left),
        (&controls.right, intent.right),
        (&controls.duck, intent.duck),
    ];
    for (keys, down) in held {
        let Some(key) = keys.first() else { continue };
        if down {
            game.key_down(key);
        } else {
            game.key_up(key);
        }
    }

    let taps = [(&controls.jump, intent.jump), (&controls.attack, intent.attack)];
    for (keys, tap) in taps {
        if let Some(key) = keys.first()
            && tap
        {
            game.key_down(key);
            game.key_up(key);
        }
    }
}
