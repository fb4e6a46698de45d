//! Grid, zone layout, and starting state for the Reclaim simulation.
//!
//! This crate models the physical world robots move through: a bounded
//! multi-occupancy grid, the static three-zone layout with its disposal
//! column, the partition of each tier's territory into per-robot patrol
//! rectangles, and the seeded initial placement of waste.
//!
//! Nothing in here decides who may do what. Validation of robot actions
//! belongs to the arbitrator in `reclaim-core`, which is the only writer of
//! a [`Grid`] during a run.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid operations and world construction.
//! - [`grid`] -- [`Grid`]: cells as occupant lists with neighborhood queries
//!   and place/remove/move primitives.
//! - [`layout`] -- [`ZoneLayout`]: zone boundaries, tier territories, and
//!   patrol strip partitioning.
//! - [`starting_world`] -- Zone markers and seeded waste placement.

pub mod error;
pub mod grid;
pub mod layout;
pub mod starting_world;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::Grid;
pub use layout::ZoneLayout;
pub use starting_world::{StartingWorld, create_starting_world};
