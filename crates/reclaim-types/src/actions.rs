//! Actions robots propose and the outcomes the arbitrator returns.
//!
//! Robots never touch the grid. They hand an [`Action`] to the arbitrator,
//! which validates it against the authoritative state and answers with an
//! [`ActionResult`]: the outcome plus fresh percepts around the robot's
//! (possibly new) position.

use serde::{Deserialize, Serialize};

use crate::enums::{RejectionReason, Tier};
use crate::geometry::Position;
use crate::ids::AgentId;
use crate::occupant::Waste;
use crate::perception::CellView;

/// A proposed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Move to `to`: a sweep or approach step, or a recovery stride.
    Move {
        /// Destination cell.
        to: Position,
    },
    /// Carry a product one step east.
    MoveEast {
        /// Destination cell, one column east.
        to: Position,
    },
    /// Sidestep north or south to get around a blocker.
    MoveVertical {
        /// Destination cell, one row away.
        to: Position,
    },
    /// Pick up one unit of `tier` from the current cell.
    Pickup {
        /// Tier to pick up.
        tier: Tier,
    },
    /// Drop one held unit of `tier` on the current cell.
    Drop {
        /// Tier to drop.
        tier: Tier,
    },
    /// Consolidate two held units of `from` into one unit of `to`.
    Transform {
        /// Source tier.
        from: Tier,
        /// Product tier.
        to: Tier,
    },
}

impl Action {
    /// Destination for movement actions.
    pub const fn destination(&self) -> Option<Position> {
        match self {
            Self::Move { to } | Self::MoveEast { to } | Self::MoveVertical { to } => Some(*to),
            Self::Pickup { .. } | Self::Drop { .. } | Self::Transform { .. } => None,
        }
    }

    /// Whether this action moves the robot.
    pub const fn is_movement(&self) -> bool {
        self.destination().is_some()
    }
}

/// What applying an action did to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The robot moved.
    Moved {
        /// Previous cell.
        from: Position,
        /// New cell.
        to: Position,
    },
    /// A waste unit left the grid and entered the inventory.
    PickedUp {
        /// The unit picked up.
        waste: Waste,
    },
    /// A held unit was placed on the grid.
    Dropped {
        /// The new waste unit on the grid.
        waste: Waste,
    },
    /// A held unit was dropped on a disposal cell and left the world.
    Disposed {
        /// Tier disposed.
        tier: Tier,
        /// Weighted units removed.
        units: u64,
    },
    /// Two held units became one of the next tier.
    Transformed {
        /// Source tier.
        from: Tier,
        /// Product tier.
        to: Tier,
    },
    /// The action was rejected and nothing changed.
    NoEffect {
        /// Why it was rejected.
        reason: RejectionReason,
    },
}

impl ActionOutcome {
    /// Whether the world changed.
    pub const fn had_effect(&self) -> bool {
        !matches!(self, Self::NoEffect { .. })
    }
}

/// Arbitrator's answer to a proposed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Tick the action was applied in.
    pub tick: u64,
    /// Acting robot.
    pub agent_id: AgentId,
    /// The proposed action.
    pub action: Action,
    /// What happened.
    pub outcome: ActionOutcome,
    /// Fresh percepts around the robot after the action.
    pub percepts: Vec<CellView>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_moves_have_destinations() {
        let to = Position::new(1, 0);
        assert_eq!(Action::MoveEast { to }.destination(), Some(to));
        assert!(Action::MoveVertical { to }.is_movement());
        assert!(!Action::Pickup { tier: Tier::Green }.is_movement());
    }

    #[test]
    fn no_effect_is_not_an_effect() {
        let outcome = ActionOutcome::NoEffect {
            reason: RejectionReason::Occupied,
        };
        assert!(!outcome.had_effect());
        assert!(
            ActionOutcome::Transformed {
                from: Tier::Green,
                to: Tier::Yellow
            }
            .had_effect()
        );
    }

    #[test]
    fn action_serializes_with_tag() {
        let json = serde_json::to_value(Action::Drop { tier: Tier::Red }).unwrap();
        assert_eq!(json["type"], "drop");
        assert_eq!(json["tier"], "red");
    }
}
