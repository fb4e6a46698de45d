//! Error types for the `reclaim-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

use reclaim_types::{Position, Tier, WasteId};

/// Errors that can occur during grid operations and world construction.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The grid would have no cells.
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    ZeroSized {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The grid is too narrow to hold three zones.
    #[error("grid width {width} is too narrow for three zones (minimum 3)")]
    TooNarrow {
        /// Requested width.
        width: u32,
    },

    /// A dimension does not fit the signed coordinate space.
    #[error("grid dimension {value} exceeds the coordinate range")]
    DimensionOverflow {
        /// The offending dimension.
        value: u32,
    },

    /// A position lies outside the grid.
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    /// The occupant to remove or move was not found in the cell.
    #[error("occupant not found at {0}")]
    OccupantNotFound(Position),

    /// The waste unit was not found in the cell.
    #[error("waste {waste} not found at {position}")]
    WasteNotFound {
        /// The missing waste.
        waste: WasteId,
        /// Where it was expected.
        position: Position,
    },

    /// More robots of a tier than rows to give them strips.
    #[error("{count} {tier} agents cannot share {height} rows")]
    TooManyAgents {
        /// Tier being partitioned.
        tier: Tier,
        /// Requested agent count.
        count: u32,
        /// Grid height.
        height: u32,
    },

    /// Not enough free cells in a tier's home zone to seed its waste.
    #[error("cannot seed {requested} {tier} waste into {available} cells")]
    NotEnoughCells {
        /// Tier being seeded.
        tier: Tier,
        /// Requested waste count.
        requested: u32,
        /// Cells available in the home zone.
        available: usize,
    },

    /// Waste id space exhausted.
    #[error("waste id overflow")]
    WasteIdOverflow,
}
