//! Things that can sit in a grid cell.
//!
//! A cell holds any number of occupants: exactly one zone marker (or the
//! disposal marker on the eastern column), at most one robot, and zero or
//! more waste units.

use serde::{Deserialize, Serialize};

use crate::enums::{Tier, ZoneKind};
use crate::ids::{AgentId, WasteId};

/// A single unit of waste lying on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Waste {
    /// Identity, unique for the lifetime of a run.
    pub id: WasteId,
    /// Colour class.
    pub tier: Tier,
}

impl Waste {
    /// Create a waste unit.
    pub const fn new(id: WasteId, tier: Tier) -> Self {
        Self { id, tier }
    }
}

/// Static marker describing the zone a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneMarker {
    /// Zone classification.
    pub kind: ZoneKind,
    /// Radioactivity level inside the zone's interval.
    pub radioactivity: f64,
}

/// An entity occupying a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Occupant {
    /// A robot, identified by its id and tier.
    Robot {
        /// Robot identity.
        id: AgentId,
        /// Robot tier.
        tier: Tier,
    },
    /// A waste unit.
    Waste(Waste),
    /// A zone marker.
    ZoneMarker(ZoneMarker),
    /// The disposal marker on the eastern column.
    Disposal,
}

impl Occupant {
    /// The waste unit, if this occupant is one.
    pub const fn as_waste(&self) -> Option<Waste> {
        match self {
            Self::Waste(waste) => Some(*waste),
            _ => None,
        }
    }

    /// The robot id, if this occupant is a robot.
    pub const fn robot_id(&self) -> Option<AgentId> {
        match self {
            Self::Robot { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// The zone this occupant marks, if it is a marker.
    pub const fn zone(&self) -> Option<ZoneKind> {
        match self {
            Self::ZoneMarker(marker) => Some(marker.kind),
            Self::Disposal => Some(ZoneKind::Disposal),
            _ => None,
        }
    }
}
