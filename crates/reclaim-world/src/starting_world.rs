//! Initial world state: zone markers and seeded waste.
//!
//! Every cell receives exactly one marker. Zone cells get a
//! [`ZoneMarker`] whose radioactivity is drawn from the zone's interval;
//! the disposal column gets [`Occupant::Disposal`]. Waste is then scattered
//! on distinct random cells of each tier's home zone.

use rand::Rng;
use rand::seq::SliceRandom;
use reclaim_types::{Occupant, PerTier, Position, Tier, Waste, WasteId, ZoneKind, ZoneMarker};
use tracing::debug;

use crate::error::WorldError;
use crate::grid::Grid;
use crate::layout::ZoneLayout;

/// A freshly built world, before any robot is placed.
#[derive(Debug, Clone)]
pub struct StartingWorld {
    /// Grid with markers and seeded waste.
    pub grid: Grid,
    /// Zone boundaries for the grid.
    pub layout: ZoneLayout,
    /// The next unused waste id.
    pub next_waste_id: WasteId,
}

/// Draw a radioactivity level for a cell of `zone`.
fn radioactivity(zone: ZoneKind, rng: &mut impl Rng) -> f64 {
    let (low, high) = zone.radioactivity_range();
    match zone {
        ZoneKind::Disposal => high,
        ZoneKind::Z3 => rng.random_range(low..=high),
        ZoneKind::Z1 | ZoneKind::Z2 => rng.random_range(low..high),
    }
}

/// Build the starting grid and seed `waste` units per tier.
///
/// Waste ids are allocated in seeding order starting from 1.
pub fn create_starting_world(
    width: u32,
    height: u32,
    waste: &PerTier<u32>,
    rng: &mut impl Rng,
) -> Result<StartingWorld, WorldError> {
    let layout = ZoneLayout::new(width, height)?;
    let mut grid = Grid::new(width, height)?;

    for x in 0..layout.width() {
        let zone = layout.zone_of_column(x);
        for y in 0..layout.height() {
            let marker = if zone == ZoneKind::Disposal {
                Occupant::Disposal
            } else {
                Occupant::ZoneMarker(ZoneMarker {
                    kind: zone,
                    radioactivity: radioactivity(zone, rng),
                })
            };
            grid.place_occupant(Position::new(x, y), marker)?;
        }
    }

    let mut next_id = WasteId::new(1);
    for tier in Tier::ALL {
        let requested = *waste.get(tier);
        let mut cells = layout.home_cells(tier);
        let wanted = usize::try_from(requested).unwrap_or(usize::MAX);
        if wanted > cells.len() {
            return Err(WorldError::NotEnoughCells {
                tier,
                requested,
                available: cells.len(),
            });
        }
        cells.shuffle(rng);
        for pos in cells.into_iter().take(wanted) {
            grid.place_occupant(pos, Occupant::Waste(Waste::new(next_id, tier)))?;
            debug!(%tier, waste_id = %next_id, x = pos.x, y = pos.y, "Seeded waste");
            next_id = next_id.next().ok_or(WorldError::WasteIdOverflow)?;
        }
    }

    Ok(StartingWorld {
        grid,
        layout,
        next_waste_id: next_id,
    })
}
