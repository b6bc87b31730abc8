use serde::Deserialize;

/// Headless run settings, loaded from `nightgate-runner.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub seed: u64,
    /// Upper bound on simulated frames; the run stops early once finished.
    pub frames: u64,
    pub tick_rate_hz: f32,
    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,
    /// Drive the player with the built-in bot. Without it the player idles.
    pub autopilot: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            frames: 36_000,
            tick_rate_hz: 60.0,
            json_logs: false,
            autopilot: true,
        }
    }
}

impl RunnerConfig {
    /// Load from `NIGHTGATE_RUNNER_CONFIG` or `nightgate-runner.toml`, then
    /// apply `NIGHTGATE_SEED` and `NIGHTGATE_FRAMES` overrides.
    pub fn load() -> Self {
        let path = std::env::var("NIGHTGATE_RUNNER_CONFIG")
            .unwrap_or_else(|_| "nightgate-runner.toml".to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<RunnerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(%path, "Loaded runner configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    RunnerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!(%path, "No runner config found, using defaults");
                RunnerConfig::default()
            },
        };

        if let Ok(val) = std::env::var("NIGHTGATE_SEED")
            && let Ok(seed) = val.parse::<u64>()
        {
            config.seed = seed;
        }
        if let Ok(val) = std::env::var("NIGHTGATE_FRAMES")
            && let Ok(frames) = val.parse::<u64>()
        {
            config.frames = frames;
        }

        config
    }

    /// Every setting that makes a run impossible. Empty means usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.frames == 0 {
            problems.push("frames must be > 0".to_string());
        }
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            problems.push("tick_rate_hz must be a positive number".to_string());
        }
        problems
    }
}
