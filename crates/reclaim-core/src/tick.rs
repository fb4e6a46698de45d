//! The tick cycle.
//!
//! Each tick runs in three phases:
//!
//! 1. **Advance** -- bump the clock and deliver the mail posted last tick.
//! 2. **Act** -- unless the world is already clear, every robot runs its
//!    perceive/deliberate/act step in turn order. The arbitrator mutates the
//!    grid in place, so each robot perceives the effects of the robots that
//!    acted before it.
//! 3. **Settle** -- drop mail nobody collected, check for all-clear and
//!    summarise the tick.

use std::collections::BTreeMap;

use reclaim_types::{ActionResult, AgentId, PerTier};
use tracing::debug;

use crate::arbitrator::ArbitratorError;
use crate::clock::ClockError;
use crate::world::World;

/// Errors that abort a tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The arbitrator's bookkeeping failed while applying an action.
    #[error("arbitration failed for robot {agent_id}: {source}")]
    Arbitrator {
        /// The robot whose action was being applied.
        agent_id: AgentId,
        /// The underlying arbitrator error.
        source: ArbitratorError,
    },
}

/// What happened during one tick.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The tick that ran.
    pub tick: u64,
    /// Each robot's action and outcome. Empty when the world was already
    /// clear at the start of the tick.
    pub actions: BTreeMap<AgentId, ActionResult>,
    /// Messages delivered at the start of the tick.
    pub messages_delivered: usize,
    /// Delivered messages left uncollected at the end of the tick.
    pub messages_discarded: usize,
    /// Waste on the grid after the tick, per tier.
    pub residual_waste: PerTier<u64>,
    /// Units carried after the tick.
    pub carried: u64,
    /// Weighted units disposed so far.
    pub disposed_units: u64,
    /// Whether nothing is left on the grid or carried.
    pub all_clear: bool,
}

impl TickSummary {
    /// Number of actions that changed the world.
    pub fn effective_actions(&self) -> usize {
        self.actions
            .values()
            .filter(|r| r.outcome.had_effect())
            .count()
    }
}

/// Run one tick.
pub fn run_tick(world: &mut World) -> Result<TickSummary, TickError> {
    // --- Advance ---
    let tick = world.clock.advance()?;
    let messages_delivered = world.arbitrator.begin_tick(tick);
    debug!(tick, messages_delivered, "Tick started");

    // --- Act ---
    let mut actions = BTreeMap::new();
    if !world.is_all_clear() {
        for agent_id in world.turn_order() {
            let Some(robot) = world.robots.get_mut(&agent_id) else {
                continue;
            };
            let result = robot
                .step(&mut world.arbitrator)
                .map_err(|source| TickError::Arbitrator { agent_id, source })?;
            actions.insert(agent_id, result);
        }
    }

    // --- Settle ---
    let messages_discarded = world.arbitrator.end_tick();
    let all_clear = world.check_all_clear();
    let summary = TickSummary {
        tick,
        actions,
        messages_delivered,
        messages_discarded,
        residual_waste: world.grid().waste_counts(),
        carried: world.carried_counts().total(),
        disposed_units: world.arbitrator.disposed_units(),
        all_clear,
    };
    debug!(
        tick,
        effective = summary.effective_actions(),
        residual = summary.residual_waste.total(),
        carried = summary.carried,
        disposed_units = summary.disposed_units,
        "Tick complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reclaim_types::{Message, MessageContent, Position, Tier};

    use super::*;
    use crate::world::WorldParams;

    #[test]
    fn tick_advances_clock_and_runs_every_robot() {
        let mut world = World::new(&WorldParams::default()).unwrap();
        let summary = run_tick(&mut world).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(world.tick(), 1);
        assert_eq!(summary.actions.len(), 3);
        assert_eq!(summary.messages_delivered, 0);
        assert_eq!(summary.messages_discarded, 0);
        assert!(!summary.all_clear);
    }

    #[test]
    fn mail_for_a_clear_world_is_discarded() {
        let params = WorldParams {
            waste: PerTier::new(0, 0, 0),
            ..WorldParams::default()
        };
        let mut world = World::new(&params).unwrap();
        let recipient = *world.robots().keys().next().unwrap();
        let content = MessageContent {
            waste_pos: Position::new(2, 2),
            waste_tier: Tier::Green,
            waste_id: None,
            sender_pos: Position::new(2, 2),
        };
        world.post_message(Message::request(AgentId::new(99), recipient, content, 0));

        // Robots skip their turn once the grid is clear, so nobody reads it.
        let summary = run_tick(&mut world).unwrap();
        assert_eq!(summary.messages_delivered, 1);
        assert_eq!(summary.messages_discarded, 1);

        let next = run_tick(&mut world).unwrap();
        assert_eq!(next.messages_delivered, 0);
        assert_eq!(next.messages_discarded, 0);
        assert_eq!(world.report().messages_delivered, 1);
    }

    #[test]
    fn robots_collect_their_mail_before_it_is_discarded() {
        let mut world = World::new(&WorldParams::default()).unwrap();
        let mut discarded: usize = 0;
        for _ in 0..80 {
            let summary = run_tick(&mut world).unwrap();
            discarded = discarded.saturating_add(summary.messages_discarded);
            if summary.all_clear {
                break;
            }
        }
        assert_eq!(discarded, 0);
    }

    #[test]
    fn clear_world_skips_robots() {
        let params = WorldParams {
            waste: PerTier::new(0, 0, 0),
            ..WorldParams::default()
        };
        let mut world = World::new(&params).unwrap();
        let summary = run_tick(&mut world).unwrap();
        assert!(summary.actions.is_empty());
        assert!(summary.all_clear);
        assert_eq!(world.first_all_clear_tick(), Some(0));
    }

    #[test]
    fn units_are_conserved_every_tick() {
        let mut world = World::new(&WorldParams::default()).unwrap();
        let initial = world.initial_units();
        for _ in 0..60 {
            run_tick(&mut world).unwrap();
            assert_eq!(world.weighted_units(), initial);
        }
    }
}
