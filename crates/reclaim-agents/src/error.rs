//! Error types for the reclaim-agents crate.
//!
//! Only construction can fail fatally. Once a robot exists, every anomaly it
//! meets during a run degrades to "try again next tick".

use reclaim_types::{AgentId, PatrolRect, Position, Tier};

/// Errors that can occur while building or mutating agent state.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A robot was configured without a patrol rectangle.
    #[error("agent {agent} has no patrol rectangle")]
    MissingPatrolRect {
        /// The misconfigured robot.
        agent: AgentId,
    },

    /// The starting position lies outside the patrol rectangle.
    #[error("agent {agent} starts at {start}, outside its patrol {patrol}")]
    StartOutsidePatrol {
        /// The misconfigured robot.
        agent: AgentId,
        /// Requested start.
        start: Position,
        /// Assigned rectangle.
        patrol: PatrolRect,
    },

    /// A gather robot was configured for a tier with no next tier.
    #[error("{tier} has no next tier to consolidate into")]
    NoTransformProduct {
        /// The terminal tier.
        tier: Tier,
    },

    /// Adding a unit would exceed the inventory capacity.
    #[error("inventory full: cannot add {tier} (capacity {capacity})")]
    InventoryFull {
        /// Tier being added.
        tier: Tier,
        /// Maximum units.
        capacity: usize,
    },

    /// Removing a tier that is not carried.
    #[error("inventory holds no {tier}")]
    NotCarried {
        /// Tier requested.
        tier: Tier,
    },

    /// A transform needs two units of the source tier.
    #[error("transform needs 2 {tier}, have {available}")]
    InsufficientUnits {
        /// Source tier.
        tier: Tier,
        /// Units actually held.
        available: usize,
    },
}
