//! Deliberation: choosing one action from knowledge alone.
//!
//! [`deliberate`] is a pure function of [`Knowledge`]. It never looks at the
//! grid and never mutates anything; the motion state it wants committed is
//! returned in the [`Plan`] for both possible verdicts of the arbitrator.
//!
//! Priority order, first match wins:
//!
//! 1. Gather robots holding two raw units consolidate them (once per load).
//! 2. Carrying a unit to relay and standing on the relay column: drop it if
//!    the cell holds no waste, otherwise sidestep vertically.
//! 3. Carrying a unit to relay elsewhere: step east, or sidestep if a robot
//!    is in the way.
//! 4. Spare capacity and collectable waste underfoot: pick it up.
//! 5. Spare capacity and collectable waste in view: move onto it.
//! 6. Spare capacity and a claimed target: step toward it.
//! 7. Otherwise sweep the patrol rectangle.
//!
//! Any movement chosen while the stuck counter is over the threshold is
//! replaced by a deadlock-recovery move.

use reclaim_types::{Action, CellView, Position, Tier};

use crate::config::Variant;
use crate::error::AgentError;
use crate::knowledge::Knowledge;
use crate::movement::{self, MotionState};

/// Deliberation policy, selected by tier and variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Collect two units of `collect`, consolidate into one `product`, and
    /// relay the product east.
    Gather {
        /// Tier picked up.
        collect: Tier,
        /// Tier produced and relayed.
        product: Tier,
    },
    /// Relay single units of `carry` east untransformed.
    Courier {
        /// Tier picked up and relayed.
        carry: Tier,
    },
}

impl Policy {
    /// Select the policy for a robot of `tier` playing `variant`.
    pub const fn for_variant(tier: Tier, variant: Variant) -> Result<Self, AgentError> {
        match variant {
            Variant::Courier => Ok(Self::Courier { carry: tier }),
            Variant::Gather => match tier.next() {
                Some(product) => Ok(Self::Gather {
                    collect: tier,
                    product,
                }),
                None => Err(AgentError::NoTransformProduct { tier }),
            },
        }
    }

    /// Tier this robot picks up.
    pub const fn collects(&self) -> Tier {
        match self {
            Self::Gather { collect, .. } => *collect,
            Self::Courier { carry } => *carry,
        }
    }

    /// Tier this robot relays to its boundary column.
    pub const fn relays(&self) -> Tier {
        match self {
            Self::Gather { product, .. } => *product,
            Self::Courier { carry } => *carry,
        }
    }

    /// Maximum units carried.
    pub const fn capacity(&self) -> usize {
        match self {
            Self::Gather { .. } => 2,
            Self::Courier { .. } => 1,
        }
    }

    /// The consolidation this robot may perform, as `(from, to)`.
    pub const fn transform(&self) -> Option<(Tier, Tier)> {
        match self {
            Self::Gather { collect, product } => Some((*collect, *product)),
            Self::Courier { .. } => None,
        }
    }
}

/// The chosen action plus the motion state to commit for either verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    /// Action to submit.
    pub action: Action,
    /// Motion state if the action takes effect.
    pub on_success: MotionState,
    /// Motion state if the action is absorbed.
    pub on_failure: MotionState,
}

impl Plan {
    /// A non-movement action: motion is untouched either way.
    const fn hold(action: Action, motion: MotionState) -> Self {
        Self {
            action,
            on_success: motion,
            on_failure: motion,
        }
    }

    /// A move: success adopts `next` and clears the counter, failure keeps
    /// `current` and bumps it.
    const fn travel(action: Action, next: MotionState, current: MotionState) -> Self {
        Self {
            action,
            on_success: next.succeeded(),
            on_failure: current.failed(),
        }
    }

    /// No legal move: submit a stationary move, which the arbitrator absorbs.
    const fn stay(position: Position, after: MotionState) -> Self {
        Self {
            action: Action::Move { to: position },
            on_success: after,
            on_failure: after.failed(),
        }
    }
}

/// Choose one action from `knowledge`.
pub fn deliberate(knowledge: &Knowledge) -> Plan {
    if let Some(plan) = consolidate(knowledge) {
        return plan;
    }
    if knowledge.is_relaying() {
        return relay(knowledge);
    }
    if knowledge.has_spare_capacity() {
        if knowledge.here().is_some_and(|v| knowledge.is_collectable(v)) {
            return Plan::hold(
                Action::Pickup {
                    tier: knowledge.policy.collects(),
                },
                knowledge.motion,
            );
        }
        if let Some(to) = nearest_visible_waste(knowledge) {
            return moving(knowledge, Action::Move { to }, knowledge.motion);
        }
        if let Some(claim) = knowledge.target_claim {
            if let Some(to) = movement::step_toward(knowledge, claim.waste_pos) {
                return moving(knowledge, Action::Move { to }, knowledge.motion);
            }
        }
    }
    patrol(knowledge)
}

fn consolidate(knowledge: &Knowledge) -> Option<Plan> {
    let (from, to) = knowledge.policy.transform()?;
    (!knowledge.has_transformed && knowledge.inventory.count(from) >= 2)
        .then_some(Plan::hold(Action::Transform { from, to }, knowledge.motion))
}

fn relay(knowledge: &Knowledge) -> Plan {
    let tier = knowledge.policy.relays();
    if knowledge.at_relay_column() {
        if knowledge.here().is_some_and(CellView::has_waste) {
            return dodge(knowledge);
        }
        return Plan::hold(Action::Drop { tier }, knowledge.motion);
    }
    match knowledge.position.offset(1, 0) {
        Some(east) if knowledge.can_enter(east) => {
            moving(knowledge, Action::MoveEast { to: east }, knowledge.motion)
        }
        _ => dodge(knowledge),
    }
}

fn dodge(knowledge: &Knowledge) -> Plan {
    if knowledge.motion.is_stuck(knowledge.tuning.stuck_threshold) {
        return recover(knowledge);
    }
    match movement::vertical_dodge(knowledge) {
        Some((to, next)) => Plan::travel(Action::MoveVertical { to }, next, knowledge.motion),
        None => Plan::stay(knowledge.position, knowledge.motion),
    }
}

fn patrol(knowledge: &Knowledge) -> Plan {
    if knowledge.motion.is_stuck(knowledge.tuning.stuck_threshold) {
        return recover(knowledge);
    }
    let step = movement::sweep(
        knowledge.position,
        knowledge.motion,
        &knowledge.patrol,
        knowledge.movement,
    );
    match step.to {
        Some(to) if on_grid(knowledge, to) => {
            Plan::travel(Action::Move { to }, step.motion, knowledge.motion)
        }
        Some(_) => Plan::stay(knowledge.position, knowledge.motion.inverted()),
        None => Plan::stay(knowledge.position, step.motion),
    }
}

fn moving(knowledge: &Knowledge, action: Action, next: MotionState) -> Plan {
    if knowledge.motion.is_stuck(knowledge.tuning.stuck_threshold) {
        return recover(knowledge);
    }
    Plan::travel(action, next, knowledge.motion)
}

fn recover(knowledge: &Knowledge) -> Plan {
    match movement::recovery(knowledge) {
        Some((to, next)) => Plan::travel(Action::Move { to }, next, knowledge.motion),
        None => Plan::stay(knowledge.position, knowledge.motion),
    }
}

const fn on_grid(knowledge: &Knowledge, pos: Position) -> bool {
    pos.x >= 0
        && pos.y >= 0
        && pos.x < knowledge.layout.width()
        && pos.y < knowledge.layout.height()
}

/// Nearest neighboring cell with collectable waste that the robot may enter.
fn nearest_visible_waste(knowledge: &Knowledge) -> Option<Position> {
    knowledge
        .percepts
        .iter()
        .filter(|v| v.position != knowledge.position)
        .filter(|v| knowledge.is_collectable(v) && !v.has_robot())
        .filter(|v| knowledge.can_enter(v.position))
        .min_by_key(|v| v.position.manhattan(knowledge.position))
        .map(|v| v.position)
}
