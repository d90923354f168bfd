//! Headless driver for the natural selection simulator.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `natsel-config.yaml` (or `NATSEL_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build and populate the simulation
//! 4. Install the Ctrl-C handler
//! 5. Run the tick loop until the tick limit or a stop
//! 6. Log the result

mod error;
mod stats_callback;

use std::path::PathBuf;
use std::sync::Arc;

use natsel_core::runner;
use natsel_core::{RunControl, Simulation, SimulationConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::stats_callback::StatsCallback;

const DEFAULT_CONFIG_PATH: &str = "natsel-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration loading or the run itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so report the source
    //    once the subscriber is installed.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("natsel-engine starting");
    info!(
        source = %source,
        width = config.world.width,
        height = config.world.height,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "Configuration loaded"
    );

    // 3. Build and populate the simulation.
    let control = Arc::new(RunControl::new(
        config.world.tick_interval_ms,
        config.world.max_ticks,
    ));
    let mut callback = StatsCallback::new(config.logging.stats_interval);
    let mut sim = Simulation::new(config).map_err(EngineError::from)?;
    sim.initialize();

    // 4. Stop cleanly on Ctrl-C.
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after the current tick");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 5. Run the simulation.
    let result = runner::run_simulation(&mut sim, &control, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 6. Log results.
    runner::log_simulation_end(&result);
    let stats = sim.stats();
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        foods = stats.food_count,
        preys = stats.prey_count,
        predators = stats.predator_count,
        "natsel-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// Reads the path in `NATSEL_CONFIG` if set, otherwise `natsel-config.yaml`
/// in the working directory. A missing default file falls back to built-in
/// defaults; a missing explicit file is an error.
fn load_config() -> Result<(SimulationConfig, String), EngineError> {
    let explicit = std::env::var_os("NATSEL_CONFIG").map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if explicit.is_some() || path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        Ok((SimulationConfig::default(), String::from("defaults")))
    }
}
