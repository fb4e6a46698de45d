//! The async run loop.
//!
//! [`run_simulation`] drives [`run_tick`] until the world is clear or a
//! bound is hit, honouring the [`RunControl`] between ticks:
//!
//! - **All clear**: checked before the first tick and after every tick
//! - **Bounded run**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Pause/resume** and **variable tick speed**
//! - **Stop**: clean stop before the next tick (the engine wires Ctrl-C here)
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use tracing::{info, warn};

use crate::control::{RunControl, SimulationEndReason};
use crate::report::WorldReport;
use crate::tick::{self, TickError, TickSummary};
use crate::world::World;

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// How a run ended.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Why the run ended.
    pub end_reason: SimulationEndReason,
    /// Ticks executed by this run.
    pub total_ticks: u64,
    /// Summary of the last tick, if any ran.
    pub final_summary: Option<TickSummary>,
    /// Snapshot of the world at the end.
    pub report: WorldReport,
}

/// Observer invoked after each tick.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, world: &World);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _world: &World) {}
}

fn finish(
    world: &World,
    end_reason: SimulationEndReason,
    total_ticks: u64,
    final_summary: Option<TickSummary>,
) -> SimulationResult {
    SimulationResult {
        end_reason,
        total_ticks,
        final_summary,
        report: world.report(),
    }
}

/// Run until the world is clear, a bound is reached, or a stop is requested.
pub async fn run_simulation(
    world: &mut World,
    control: &Arc<RunControl>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = control.max_ticks(),
        max_real_time_seconds = control.max_real_time_seconds(),
        tick_interval_ms = control.tick_interval_ms(),
        robots = world.robots().len(),
        "Simulation starting"
    );

    if world.is_all_clear() {
        info!(tick = world.tick(), "Nothing to collect");
        return Ok(finish(world, SimulationEndReason::AllClear, total_ticks, None));
    }

    loop {
        // --- Pause ---
        if control.is_paused() {
            info!("Simulation paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Simulation resumed");
        }

        // --- Stop request (before tick) ---
        if control.is_stop_requested() {
            info!(tick = world.tick(), "Stop requested");
            return Ok(finish(world, SimulationEndReason::Stopped, total_ticks, last_summary));
        }

        // --- Time limit (before tick) ---
        if control.time_limit_reached() {
            info!(
                max_seconds = control.max_real_time_seconds(),
                elapsed = control.elapsed_seconds(),
                "Real-time limit reached"
            );
            return Ok(finish(
                world,
                SimulationEndReason::MaxRealTimeReached,
                total_ticks,
                last_summary,
            ));
        }

        // --- Tick ---
        let summary = tick::run_tick(world)?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, world);

        // --- All clear ---
        if summary.all_clear {
            info!(tick = summary.tick, "All clear");
            return Ok(finish(
                world,
                SimulationEndReason::AllClear,
                total_ticks,
                Some(summary),
            ));
        }

        // --- Tick limit (after tick) ---
        if control.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            return Ok(finish(
                world,
                SimulationEndReason::MaxTicksReached,
                total_ticks,
                Some(summary),
            ));
        }

        last_summary = Some(summary);

        // --- Pace ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Log how a run ended.
pub fn log_simulation_end(result: &SimulationResult) {
    let report = &result.report;
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = report.tick,
        first_all_clear_tick = ?report.first_all_clear_tick,
        disposed_units = report.disposed_units,
        residual = report.residual_total(),
        "Simulation ended"
    );

    if result.final_summary.is_none() {
        warn!("Simulation ended with no ticks executed");
    }
    for agent in &report.agents {
        info!(
            agent_id = %agent.id,
            tier = %agent.tier,
            position = %agent.position,
            distance = agent.distance_travelled,
            carried = agent.inventory.len(),
            "Final robot state"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reclaim_types::PerTier;

    use super::*;
    use crate::config::SimulationBounds;
    use crate::world::WorldParams;

    fn control(max_ticks: u64) -> Arc<RunControl> {
        Arc::new(RunControl::new(&SimulationBounds {
            max_ticks,
            max_real_time_seconds: 0,
            tick_interval_ms: 0,
        }))
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut world = World::new(&WorldParams::default()).unwrap();
        let result = run_simulation(&mut world, &control(5), &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.report.tick, 5);
    }

    #[tokio::test]
    async fn stop_before_first_tick() {
        let mut world = World::new(&WorldParams::default()).unwrap();
        let control = control(0);
        control.request_stop();
        let result = run_simulation(&mut world, &control, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::Stopped);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn empty_world_ends_immediately() {
        let params = WorldParams {
            waste: PerTier::new(0, 0, 0),
            ..WorldParams::default()
        };
        let mut world = World::new(&params).unwrap();
        let result = run_simulation(&mut world, &control(0), &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::AllClear);
        assert_eq!(result.total_ticks, 0);
        assert_eq!(result.report.first_all_clear_tick, Some(0));
    }

    #[tokio::test]
    async fn callback_sees_every_tick() {
        struct Count(u64);
        impl TickCallback for Count {
            fn on_tick(&mut self, summary: &TickSummary, world: &World) {
                assert_eq!(summary.tick, world.tick());
                self.0 = self.0.saturating_add(1);
            }
        }

        let mut world = World::new(&WorldParams::default()).unwrap();
        let mut count = Count(0);
        run_simulation(&mut world, &control(3), &mut count)
            .await
            .unwrap();
        assert_eq!(count.0, 3);
    }
}
