//! Tick callback that logs run progress.
//!
//! Every tick is logged at debug level. A progress line goes out at info
//! level every `interval` ticks and whenever units reach the disposal
//! column.

use reclaim_core::runner::TickCallback;
use reclaim_core::tick::TickSummary;
use reclaim_core::world::World;
use tracing::{debug, info};

/// Callback that reports progress through `tracing`.
pub struct ProgressCallback {
    interval: u64,
    last_disposed: u64,
}

impl ProgressCallback {
    /// Create a callback logging every `interval` ticks (0 disables the
    /// periodic line).
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            last_disposed: 0,
        }
    }

    const fn is_checkpoint(&self, tick: u64) -> bool {
        matches!(tick.checked_rem(self.interval), Some(0))
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, world: &World) {
        debug!(
            tick = summary.tick,
            actions = summary.actions.len(),
            effective = summary.effective_actions(),
            messages = summary.messages_delivered,
            "Tick complete"
        );

        if summary.disposed_units > self.last_disposed {
            info!(
                tick = summary.tick,
                units = summary.disposed_units.saturating_sub(self.last_disposed),
                disposed_units = summary.disposed_units,
                initial_units = world.initial_units(),
                "Waste disposed"
            );
            self.last_disposed = summary.disposed_units;
        }

        if self.is_checkpoint(summary.tick) {
            info!(
                tick = summary.tick,
                green = summary.residual_waste.green,
                yellow = summary.residual_waste.yellow,
                red = summary.residual_waste.red,
                carried = summary.carried,
                disposed_units = summary.disposed_units,
                "Progress"
            );
        }
    }
}
