//! Shared type definitions for the Reclaim simulation.
//!
//! This crate is the single source of truth for the value types that flow
//! between the grid, the robots, and the arbitrator. Nothing here owns
//! mutable simulation state.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe numeric wrappers for robot and waste identifiers
//! - [`enums`] -- Tiers, zones, message performatives, rejection reasons
//! - [`geometry`] -- Grid positions and patrol rectangles
//! - [`occupant`] -- The closed set of things that can sit in a grid cell
//! - [`perception`] -- Per-cell views handed to robots when they sense
//! - [`message`] -- REQUEST / DOING messages exchanged between robots
//! - [`actions`] -- Actions robots submit and the outcomes they get back

pub mod actions;
pub mod enums;
pub mod geometry;
pub mod ids;
pub mod message;
pub mod occupant;
pub mod perception;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, ActionOutcome, ActionResult};
pub use enums::{PerTier, Performative, RejectionReason, Tier, ZoneKind};
pub use geometry::{PatrolRect, Position};
pub use ids::{AgentId, WasteId};
pub use message::{Message, MessageContent};
pub use occupant::{Occupant, Waste, ZoneMarker};
pub use perception::CellView;
