//! Configuration record for a single robot.
//!
//! One robot type covers every tier and role. What differs between a green
//! gatherer and a red courier is captured here: the tier, the [`Variant`]
//! that selects the deliberation policy, the assigned patrol rectangle, the
//! sweep orientation, and the [`RobotTuning`] knobs from
//! `reclaim-config.yaml` under the `robot` key.

use reclaim_types::{AgentId, PatrolRect, Position, Tier};
use serde::{Deserialize, Serialize};

/// Role a robot plays within its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Collects two units of its tier and consolidates them into one unit
    /// of the next tier before relaying it east.
    Gather,
    /// Carries single units of its own tier east without transforming.
    Courier,
}

/// Orientation of the boustrophedon sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Sweep along rows, stepping north or south at the ends.
    #[default]
    Sweep2d,
    /// Sweep along columns, stepping east or west at the ends.
    SweepVertical,
}

/// Tunable robot behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotTuning {
    /// Consecutive failed moves tolerated before deadlock recovery kicks in
    /// (default: 5).
    pub stuck_threshold: u32,

    /// Whether the four diagonals are tried during recovery (default: true).
    pub diagonal_recovery: bool,

    /// Maximum deferred targets remembered (default: 8).
    pub backlog_capacity: usize,

    /// Maximum message keys remembered for duplicate suppression
    /// (default: 32).
    pub seen_capacity: usize,

    /// Manhattan radius of the sensed neighborhood (default: 1).
    pub perception_radius: u32,
}

impl Default for RobotTuning {
    fn default() -> Self {
        Self {
            stuck_threshold: 5,
            diagonal_recovery: true,
            backlog_capacity: 8,
            seen_capacity: 32,
            perception_radius: 1,
        }
    }
}

/// Everything needed to construct a [`Robot`](crate::Robot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotConfig {
    /// Robot identity.
    pub id: AgentId,
    /// Tier of waste the robot collects.
    pub tier: Tier,
    /// Role within the tier.
    pub variant: Variant,
    /// Assigned patrol rectangle. Required.
    pub patrol: Option<PatrolRect>,
    /// Starting cell. Defaults to the rectangle's south-west corner.
    pub start: Option<Position>,
    /// Sweep orientation.
    pub movement: MovementMode,
    /// Whether claims are announced to same-tier peers with DOING messages.
    pub claim_protocol: bool,
    /// Behaviour knobs.
    pub tuning: RobotTuning,
}

impl RobotConfig {
    /// Create a config with default movement and tuning.
    ///
    /// The claim protocol is enabled for red robots, the disposal tier.
    pub fn new(id: AgentId, tier: Tier, variant: Variant) -> Self {
        Self {
            id,
            tier,
            variant,
            patrol: None,
            start: None,
            movement: MovementMode::default(),
            claim_protocol: tier == Tier::Red,
            tuning: RobotTuning::default(),
        }
    }

    /// Assign the patrol rectangle.
    #[must_use]
    pub const fn with_patrol(mut self, patrol: PatrolRect) -> Self {
        self.patrol = Some(patrol);
        self
    }

    /// Override the starting cell.
    #[must_use]
    pub const fn with_start(mut self, start: Position) -> Self {
        self.start = Some(start);
        self
    }

    /// Override the sweep orientation.
    #[must_use]
    pub const fn with_movement(mut self, movement: MovementMode) -> Self {
        self.movement = movement;
        self
    }

    /// Enable or disable DOING announcements.
    #[must_use]
    pub const fn with_claim_protocol(mut self, enabled: bool) -> Self {
        self.claim_protocol = enabled;
        self
    }

    /// Override the tuning knobs.
    #[must_use]
    pub const fn with_tuning(mut self, tuning: RobotTuning) -> Self {
        self.tuning = tuning;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn claim_protocol_defaults_to_red_only() {
        assert!(RobotConfig::new(AgentId::new(1), Tier::Red, Variant::Courier).claim_protocol);
        assert!(!RobotConfig::new(AgentId::new(2), Tier::Green, Variant::Gather).claim_protocol);
    }

    #[test]
    fn variant_and_mode_names() {
        let v: Variant = serde_json::from_str("\"courier\"").unwrap();
        assert_eq!(v, Variant::Courier);
        let m: MovementMode = serde_json::from_str("\"sweep_vertical\"").unwrap();
        assert_eq!(m, MovementMode::SweepVertical);
    }
}
