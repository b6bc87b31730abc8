mod config;
mod run;

use tracing_subscriber::EnvFilter;

use nightgate_hunter::HunterConfig;

use config::RunnerConfig;

fn main() {
    // Read before the subscriber exists, since it picks the log format.
    let config = RunnerConfig::load();

    let subscriber = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if config.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            tracing::error!("{problem}");
        }
        std::process::exit(1);
    }

    tracing::info!(seed = config.seed, frames = config.frames, "Nightgate runner starting");
    let summary = run::run(&config, HunterConfig::load());

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("Failed to encode run summary: {e}");
            std::process::exit(1);
        },
    }
}
