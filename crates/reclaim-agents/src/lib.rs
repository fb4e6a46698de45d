//! Robot agents for the Reclaim simulation.
//!
//! A robot runs one perceive, deliberate, act cycle per tick. It reads the
//! grid only through the percepts it is handed and writes it only by
//! submitting actions to an [`Arbiter`]. Everything it decides is derived
//! from its private [`Knowledge`].
//!
//! # Modules
//!
//! - [`config`] -- [`RobotConfig`]: the small record that parameterises a
//!   robot (tier, variant, patrol rectangle, movement mode, tuning).
//! - [`error`] -- Construction-time errors.
//! - [`inventory`] -- Ordered list of carried tiers with capacity checks.
//! - [`knowledge`] -- The knowledge store, deferred-target backlog, claims,
//!   and the bounded seen-set for duplicate messages.
//! - [`movement`] -- Boustrophedon sweep, vertical dodges, and deadlock
//!   recovery.
//! - [`policy`] -- [`Policy`] and the pure [`deliberate`] function.
//! - [`protocol`] -- REQUEST/DOING handling and claim bookkeeping.
//! - [`robot`] -- [`Robot`], its arbiter-owned [`RobotBody`], and the
//!   [`Arbiter`] trait.

pub mod config;
pub mod error;
pub mod inventory;
pub mod knowledge;
pub mod movement;
pub mod policy;
pub mod protocol;
pub mod robot;

// Re-export primary types at crate root.
pub use config::{MovementMode, RobotConfig, RobotTuning, Variant};
pub use error::AgentError;
pub use inventory::Inventory;
pub use knowledge::{Backlog, BacklogEntry, Claim, Knowledge, SeenSet};
pub use movement::MotionState;
pub use policy::{Plan, Policy, deliberate};
pub use robot::{Arbiter, Robot, RobotBody};
