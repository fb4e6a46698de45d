//! The multi-occupancy world grid.
//!
//! A [`Grid`] is a bounded `width x height` rectangle of cells. Each cell is
//! an ordered list of [`Occupant`]s; empty cells are not stored. Insertion
//! order is preserved so that "first waste in the cell" is well defined.
//!
//! The grid enforces bounds and nothing else. The one-robot-per-cell rule and
//! zone access rules are the arbitrator's job.

use std::collections::BTreeMap;

use reclaim_types::{AgentId, CellView, Occupant, PerTier, Position, Tier, Waste, WasteId};

use crate::error::WorldError;

/// Bounded grid of occupant lists.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: BTreeMap<Position, Vec<Occupant>>,
}

impl Grid {
    /// Create an empty grid.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::ZeroSized { width, height });
        }
        let w = i32::try_from(width).map_err(|_e| WorldError::DimensionOverflow { value: width })?;
        let h =
            i32::try_from(height).map_err(|_e| WorldError::DimensionOverflow { value: height })?;
        Ok(Self {
            width: w,
            height: h,
            cells: BTreeMap::new(),
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Whether `pos` lies on the grid.
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn check(&self, pos: Position) -> Result<(), WorldError> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(WorldError::OutOfBounds(pos))
        }
    }

    /// Everything in the cell at `pos`, in insertion order.
    pub fn cell_contents(&self, pos: Position) -> Result<&[Occupant], WorldError> {
        self.check(pos)?;
        Ok(self.cells.get(&pos).map_or(&[][..], Vec::as_slice))
    }

    /// Views of every in-bounds cell within Manhattan distance `radius` of
    /// `pos` (the von Neumann neighborhood), ordered by column then row.
    ///
    /// Cells that would fall off the grid are simply omitted.
    pub fn neighborhood(&self, pos: Position, radius: u32, include_center: bool) -> Vec<CellView> {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let mut views = Vec::new();
        for dx in 0_i32.saturating_sub(r)..=r {
            for dy in 0_i32.saturating_sub(r)..=r {
                if dx.unsigned_abs().saturating_add(dy.unsigned_abs()) > radius {
                    continue;
                }
                if dx == 0 && dy == 0 && !include_center {
                    continue;
                }
                let Some(cell) = pos.offset(dx, dy) else {
                    continue;
                };
                if !self.in_bounds(cell) {
                    continue;
                }
                let occupants = self.cells.get(&cell).cloned().unwrap_or_default();
                views.push(CellView::new(cell, occupants));
            }
        }
        views
    }

    /// Append an occupant to the cell at `pos`.
    pub fn place_occupant(&mut self, pos: Position, occupant: Occupant) -> Result<(), WorldError> {
        self.check(pos)?;
        self.cells.entry(pos).or_default().push(occupant);
        Ok(())
    }

    /// Remove the first occupant equal to `occupant` from the cell at `pos`.
    pub fn remove_occupant(
        &mut self,
        pos: Position,
        occupant: &Occupant,
    ) -> Result<Occupant, WorldError> {
        self.check(pos)?;
        let cell = self
            .cells
            .get_mut(&pos)
            .ok_or(WorldError::OccupantNotFound(pos))?;
        let index = cell
            .iter()
            .position(|o| o == occupant)
            .ok_or(WorldError::OccupantNotFound(pos))?;
        let removed = cell.remove(index);
        if cell.is_empty() {
            self.cells.remove(&pos);
        }
        Ok(removed)
    }

    /// Remove the waste unit `id` from the cell at `pos`.
    pub fn remove_waste(&mut self, pos: Position, id: WasteId) -> Result<Waste, WorldError> {
        let target = self
            .cell_contents(pos)?
            .iter()
            .find_map(|o| o.as_waste().filter(|w| w.id == id))
            .ok_or(WorldError::WasteNotFound { waste: id, position: pos })?;
        self.remove_occupant(pos, &Occupant::Waste(target))?;
        Ok(target)
    }

    /// Move an occupant from one cell to another.
    ///
    /// The destination is checked before anything is removed, so a failed
    /// move leaves the grid unchanged.
    pub fn move_occupant(
        &mut self,
        occupant: &Occupant,
        from: Position,
        to: Position,
    ) -> Result<(), WorldError> {
        self.check(to)?;
        let moved = self.remove_occupant(from, occupant)?;
        self.place_occupant(to, moved)
    }

    /// The robot in the cell at `pos`, if any.
    pub fn robot_at(&self, pos: Position) -> Option<AgentId> {
        self.cells
            .get(&pos)
            .and_then(|cell| cell.iter().find_map(Occupant::robot_id))
    }

    /// Number of robots in the cell at `pos`.
    pub fn robot_count_at(&self, pos: Position) -> usize {
        self.cells
            .get(&pos)
            .map_or(0, |cell| cell.iter().filter(|o| o.robot_id().is_some()).count())
    }

    /// Every waste unit on the grid with its position.
    pub fn wastes(&self) -> impl Iterator<Item = (Position, Waste)> + '_ {
        self.cells
            .iter()
            .flat_map(|(pos, cell)| cell.iter().filter_map(|o| o.as_waste().map(|w| (*pos, w))))
    }

    /// Count of waste units on the grid per tier.
    pub fn waste_counts(&self) -> PerTier<u64> {
        let mut counts = PerTier::<u64>::default();
        for (_, waste) in self.wastes() {
            let slot = counts.get_mut(waste.tier);
            *slot = slot.saturating_add(1);
        }
        counts
    }

    /// Whether any waste of `tier` remains on the grid.
    pub fn has_waste_of(&self, tier: Tier) -> bool {
        self.wastes().any(|(_, w)| w.tier == tier)
    }

    /// All non-empty cells in position order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &[Occupant])> + '_ {
        self.cells.iter().map(|(pos, cell)| (*pos, cell.as_slice()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn waste(id: u64, tier: Tier) -> Occupant {
        Occupant::Waste(Waste::new(WasteId::new(id), tier))
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(Grid::new(0, 4), Err(WorldError::ZeroSized { .. })));
        assert!(matches!(Grid::new(4, 0), Err(WorldError::ZeroSized { .. })));
    }

    #[test]
    fn neighborhood_is_orthogonal_and_clipped() {
        let grid = Grid::new(5, 5).unwrap();
        let centre = grid.neighborhood(Position::new(2, 2), 1, true);
        assert_eq!(centre.len(), 5);
        assert!(centre.iter().all(|v| v.position.manhattan(Position::new(2, 2)) <= 1));

        let corner = grid.neighborhood(Position::new(0, 0), 1, false);
        let positions: Vec<Position> = corner.iter().map(|v| v.position).collect();
        assert_eq!(positions, vec![Position::new(0, 1), Position::new(1, 0)]);
    }

    #[test]
    fn neighborhood_reports_contents() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.place_occupant(Position::new(1, 2), waste(1, Tier::Green))
            .unwrap();
        let views = grid.neighborhood(Position::new(1, 1), 1, true);
        let north = views
            .iter()
            .find(|v| v.position == Position::new(1, 2))
            .unwrap();
        assert!(north.has_waste_of(Tier::Green));
    }

    #[test]
    fn place_and_remove_preserve_order() {
        let mut grid = Grid::new(3, 3).unwrap();
        let pos = Position::new(1, 1);
        grid.place_occupant(pos, waste(1, Tier::Green)).unwrap();
        grid.place_occupant(pos, waste(2, Tier::Yellow)).unwrap();
        grid.place_occupant(pos, waste(3, Tier::Green)).unwrap();

        let removed = grid.remove_waste(pos, WasteId::new(2)).unwrap();
        assert_eq!(removed.tier, Tier::Yellow);
        let ids: Vec<u64> = grid
            .cell_contents(pos)
            .unwrap()
            .iter()
            .filter_map(Occupant::as_waste)
            .map(|w| w.id.into_inner())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn failed_move_leaves_grid_unchanged() {
        let mut grid = Grid::new(3, 3).unwrap();
        let robot = Occupant::Robot {
            id: AgentId::new(7),
            tier: Tier::Red,
        };
        grid.place_occupant(Position::new(2, 2), robot).unwrap();
        let err = grid.move_occupant(&robot, Position::new(2, 2), Position::new(3, 2));
        assert!(matches!(err, Err(WorldError::OutOfBounds(_))));
        assert_eq!(grid.robot_at(Position::new(2, 2)), Some(AgentId::new(7)));

        grid.move_occupant(&robot, Position::new(2, 2), Position::new(2, 1))
            .unwrap();
        assert_eq!(grid.robot_at(Position::new(2, 1)), Some(AgentId::new(7)));
        assert!(grid.cell_contents(Position::new(2, 2)).unwrap().is_empty());
    }

    #[test]
    fn counts_waste_per_tier() {
        let mut grid = Grid::new(4, 2).unwrap();
        grid.place_occupant(Position::new(0, 0), waste(1, Tier::Green))
            .unwrap();
        grid.place_occupant(Position::new(0, 1), waste(2, Tier::Green))
            .unwrap();
        grid.place_occupant(Position::new(3, 1), waste(3, Tier::Red))
            .unwrap();
        let counts = grid.waste_counts();
        assert_eq!(counts, PerTier::new(2, 0, 1));
        assert!(!grid.has_waste_of(Tier::Yellow));
    }
}
