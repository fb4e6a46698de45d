//! Read-only snapshots for reporting and visualization.
//!
//! A [`WorldReport`] captures the quantities a dashboard or a batch run
//! cares about: residual waste per tier, disposal totals, the first
//! all-clear tick, and per-robot position, inventory, and distance
//! travelled. [`GridSnapshot`] lists the occupants of every cell, zone
//! markers with their radioactivity and the disposal column included.

use reclaim_types::{AgentId, Occupant, PerTier, Position, Tier};
use serde::Serialize;

use crate::world::World;

/// State of one robot at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentReport {
    /// Robot identity.
    pub id: AgentId,
    /// Robot tier.
    pub tier: Tier,
    /// Current cell.
    pub position: Position,
    /// Cumulative Manhattan distance moved.
    pub distance_travelled: u64,
    /// Carried units, oldest first.
    pub inventory: Vec<Tier>,
}

/// One cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSnapshot {
    /// Cell position.
    pub position: Position,
    /// Everything in the cell: zone marker or disposal, robot, waste.
    pub occupants: Vec<Occupant>,
}

/// Every cell of the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSnapshot {
    /// Grid columns.
    pub width: i32,
    /// Grid rows.
    pub height: i32,
    /// Zone width (the disposal column is `width - 1`).
    pub zone_width: i32,
    /// Cells in position order.
    pub cells: Vec<CellSnapshot>,
}

/// Full snapshot of a world.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldReport {
    /// Last tick run.
    pub tick: u64,
    /// First tick at which nothing was left on the grid or carried.
    pub first_all_clear_tick: Option<u64>,
    /// Waste units on the grid, per tier.
    pub residual_on_grid: PerTier<u64>,
    /// Waste units carried by robots, per tier.
    pub residual_in_inventories: PerTier<u64>,
    /// Weighted units removed at the disposal column.
    pub disposed_units: u64,
    /// Units removed at the disposal column, per tier.
    pub disposed_counts: PerTier<u64>,
    /// Weighted units present at the start of the run.
    pub initial_units: u64,
    /// Messages delivered to robots since the start of the run.
    pub messages_delivered: u64,
    /// Every robot, by ascending id.
    pub agents: Vec<AgentReport>,
    /// Grid contents.
    pub grid: GridSnapshot,
}

impl WorldReport {
    /// Snapshot `world`.
    pub fn capture(world: &World) -> Self {
        let arbitrator = world.arbitrator();
        let grid = world.grid();

        let agents = world
            .robots()
            .values()
            .map(|robot| AgentReport {
                id: robot.id(),
                tier: robot.tier(),
                position: robot.position(),
                distance_travelled: arbitrator.distance_travelled(robot.id()),
                inventory: robot.body().inventory.iter().collect(),
            })
            .collect();

        let cells = grid
            .cells()
            .map(|(position, occupants)| CellSnapshot {
                position,
                occupants: occupants.to_vec(),
            })
            .collect();

        Self {
            tick: world.tick(),
            first_all_clear_tick: world.first_all_clear_tick(),
            residual_on_grid: grid.waste_counts(),
            residual_in_inventories: world.carried_counts(),
            disposed_units: arbitrator.disposed_units(),
            disposed_counts: *arbitrator.disposed_counts(),
            initial_units: world.initial_units(),
            messages_delivered: arbitrator.post_office().delivered_total(),
            agents,
            grid: GridSnapshot {
                width: grid.width(),
                height: grid.height(),
                zone_width: world.layout().zone_width(),
                cells,
            },
        }
    }

    /// Residual waste units on the grid and in inventories.
    pub fn residual_total(&self) -> u64 {
        self.residual_on_grid
            .total()
            .saturating_add(self.residual_in_inventories.total())
    }

    /// Serialize as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use reclaim_types::{Occupant, Position, ZoneKind};

    use crate::world::{World, WorldParams};

    #[test]
    fn fresh_world_report() {
        let world = World::new(&WorldParams::default()).unwrap();
        let report = world.report();
        assert_eq!(report.tick, 0);
        assert_eq!(report.residual_total(), 12);
        assert_eq!(report.disposed_units, 0);
        assert_eq!(report.messages_delivered, 0);
        assert_eq!(report.agents.len(), 3);
        assert!(report.agents.iter().all(|a| a.distance_travelled == 0));
        assert_eq!(report.grid.zone_width, 5);

        let robots_in_snapshot = report
            .grid
            .cells
            .iter()
            .flat_map(|c| &c.occupants)
            .filter(|o| o.robot_id().is_some())
            .count();
        assert_eq!(robots_in_snapshot, 3);
    }

    #[test]
    fn report_serializes_with_tagged_occupants() {
        let world = World::new(&WorldParams::default()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&world.report().to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["initial_units"], 28);
        assert_eq!(json["residual_on_grid"]["red"], 4);
        assert!(json["first_all_clear_tick"].is_null());
        let first_cell = &json["grid"]["cells"][0]["occupants"][0];
        assert_eq!(first_cell["type"], "zone_marker");
        assert_eq!(first_cell["kind"], "z1");
    }

    #[test]
    fn snapshot_surfaces_zone_markers_and_disposal() {
        let world = World::new(&WorldParams::default()).unwrap();
        let report = world.report();
        assert_eq!(report.grid.cells.len(), 15 * 9);

        let cell = |x: i32, y: i32| {
            report
                .grid
                .cells
                .iter()
                .find(|c| c.position == Position::new(x, y))
                .unwrap()
        };

        let z3 = cell(12, 4)
            .occupants
            .iter()
            .find_map(|o| match o {
                Occupant::ZoneMarker(marker) => Some(*marker),
                _ => None,
            })
            .unwrap();
        assert_eq!(z3.kind, ZoneKind::Z3);
        assert!((0.66..=1.0).contains(&z3.radioactivity));

        for y in 0..9 {
            assert!(cell(14, y).occupants.contains(&Occupant::Disposal));
        }

        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("radioactivity"));
        assert!(json.contains("\"disposal\""));
    }
}
