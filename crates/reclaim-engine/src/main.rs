//! Simulation binary for Reclaim.
//!
//! Wires configuration, world construction, the run loop, and the final
//! report together, then runs until the grid is clear or a bound is hit.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `reclaim-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Build the world: zones, seeded waste, robots in their strips
//! 4. Create run control from simulation bounds
//! 5. Install the Ctrl-C handler and the operator console
//! 6. Run the simulation loop
//! 7. Log the result and write the JSON report

mod error;
mod operator;
mod progress;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reclaim_core::config::{LoggingConfig, SimulationConfig};
use reclaim_core::control::RunControl;
use reclaim_core::report::WorldReport;
use reclaim_core::runner;
use reclaim_core::world::World;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Configuration file looked up in the working directory.
const DEFAULT_CONFIG: &str = "reclaim-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, world setup, the run, or writing the
/// report fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("reclaim-engine starting");
    info!(
        width = config.world.width,
        height = config.world.height,
        seed = config.world.seed,
        order = ?config.world.agent_order,
        max_ticks = config.simulation.max_ticks,
        "Configuration loaded"
    );

    // 3. Build the world.
    let mut world = World::new(&config.world_params()).map_err(EngineError::from)?;
    info!(
        robots = world.robots().len(),
        initial_units = world.initial_units(),
        "World ready"
    );

    // 4. Create run control.
    let control = Arc::new(RunControl::new(&config.simulation));
    info!(
        max_ticks = control.max_ticks(),
        max_real_time_seconds = control.max_real_time_seconds(),
        tick_interval_ms = control.tick_interval_ms(),
        "Run control initialized"
    );

    // 5. Stop cleanly on Ctrl-C; take pause/resume/speed from stdin.
    let signal_control = Arc::clone(&control);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping after the current tick");
                signal_control.request_stop();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
    let console = tokio::spawn(operator::drive(
        operator::spawn_stdin_reader(),
        Arc::clone(&control),
    ));

    // 6. Run the simulation.
    let mut callback = ProgressCallback::new(config.logging.progress_interval);
    let result = runner::run_simulation(&mut world, &control, &mut callback)
        .await
        .map_err(EngineError::from)?;

    console.abort();

    // 7. Log results and write the report.
    runner::log_simulation_end(&result);
    if let Some(path) = &config.report.path {
        write_report(&result.report, path)?;
        info!(path = %path.display(), "Report written");
    }

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "reclaim-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// An explicit path must exist. Without one, `reclaim-config.yaml` in the
/// working directory is used when present, defaults otherwise. Environment
/// overrides apply in every case.
fn load_config(explicit: Option<&Path>) -> Result<SimulationConfig, EngineError> {
    let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG));
    if explicit.is_some() || path.exists() {
        return Ok(SimulationConfig::from_file(path)?);
    }
    let mut config = SimulationConfig::default();
    config.apply_env_overrides()?;
    Ok(config)
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn write_report(report: &WorldReport, path: &Path) -> Result<(), EngineError> {
    let json = report.to_json_pretty()?;
    std::fs::write(path, json).map_err(|source| EngineError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_config_is_an_error() {
        let result = load_config(Some(Path::new("does/not/exist.yaml")));
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }

    #[test]
    fn report_is_written_as_json() {
        let world = World::new(&SimulationConfig::default().world_params()).unwrap();
        let path = std::env::temp_dir().join(format!("reclaim-report-{}.json", std::process::id()));
        write_report(&world.report(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["initial_units"], 28);
        assert_eq!(value["tick"], 0);
        std::fs::remove_file(&path).unwrap();
    }
}
