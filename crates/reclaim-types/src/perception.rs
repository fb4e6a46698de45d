//! What a robot sees of a single cell.

use serde::{Deserialize, Serialize};

use crate::enums::{Tier, ZoneKind};
use crate::geometry::Position;
use crate::ids::AgentId;
use crate::occupant::{Occupant, Waste};

/// Snapshot of one cell's contents at sensing time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    /// The cell's coordinate.
    pub position: Position,
    /// Everything in the cell when it was sensed.
    pub occupants: Vec<Occupant>,
}

impl CellView {
    /// Create a view.
    pub const fn new(position: Position, occupants: Vec<Occupant>) -> Self {
        Self {
            position,
            occupants,
        }
    }

    /// Whether any robot is in the cell.
    pub fn has_robot(&self) -> bool {
        self.occupants.iter().any(|o| o.robot_id().is_some())
    }

    /// Whether a robot other than `me` is in the cell.
    pub fn has_robot_other_than(&self, me: AgentId) -> bool {
        self.occupants
            .iter()
            .filter_map(Occupant::robot_id)
            .any(|id| id != me)
    }

    /// Waste units in the cell, in stored order.
    pub fn wastes(&self) -> impl Iterator<Item = Waste> + '_ {
        self.occupants.iter().filter_map(Occupant::as_waste)
    }

    /// Whether the cell holds any waste.
    pub fn has_waste(&self) -> bool {
        self.wastes().next().is_some()
    }

    /// Whether the cell holds waste of `tier`.
    pub fn has_waste_of(&self, tier: Tier) -> bool {
        self.wastes().any(|w| w.tier == tier)
    }

    /// The cell's zone, read from its marker.
    pub fn zone(&self) -> Option<ZoneKind> {
        self.occupants.iter().find_map(Occupant::zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::WasteId;
    use crate::occupant::ZoneMarker;

    fn view() -> CellView {
        CellView::new(
            Position::new(2, 1),
            vec![
                Occupant::ZoneMarker(ZoneMarker {
                    kind: ZoneKind::Z1,
                    radioactivity: 0.2,
                }),
                Occupant::Waste(Waste::new(WasteId::new(3), Tier::Green)),
                Occupant::Robot {
                    id: AgentId::new(1),
                    tier: Tier::Green,
                },
            ],
        )
    }

    #[test]
    fn reads_cell_contents() {
        let v = view();
        assert!(v.has_robot());
        assert!(!v.has_robot_other_than(AgentId::new(1)));
        assert!(v.has_robot_other_than(AgentId::new(2)));
        assert!(v.has_waste_of(Tier::Green));
        assert!(!v.has_waste_of(Tier::Red));
        assert_eq!(v.zone(), Some(ZoneKind::Z1));
    }

    #[test]
    fn disposal_marker_reports_disposal_zone() {
        let v = CellView::new(Position::new(14, 0), vec![Occupant::Disposal]);
        assert_eq!(v.zone(), Some(ZoneKind::Disposal));
        assert!(!v.has_waste());
    }
}
