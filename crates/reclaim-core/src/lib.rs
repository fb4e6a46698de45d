//! Arbitration, messaging, tick cycle, and run loop for the Reclaim
//! simulation.
//!
//! This crate owns all mutable simulation state. The [`World`] holds the
//! robots and an [`Arbitrator`], which is the only component that writes to
//! the grid. Robots act one after another within a tick; messages they post
//! are held by the mailbox and delivered at the start of the next tick.
//!
//! # Modules
//!
//! - [`arbitrator`] -- [`Arbitrator`]: validates and applies robot actions,
//!   tracks disposal and distance travelled.
//! - [`clock`] -- Tick counter with overflow checking.
//! - [`config`] -- Configuration loading from `reclaim-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- [`RunControl`]: shared stop/pause/speed state and run
//!   bounds.
//! - [`mailbox`] -- [`PostOffice`]: one-tick-latency message delivery.
//! - [`report`] -- Serializable end-of-run and per-tick snapshots.
//! - [`runner`] -- The async run loop.
//! - [`tick`] -- One tick: deliver mail, check all-clear, run every robot.
//! - [`world`] -- [`World`] construction from plain parameters.
//!
//! [`Arbitrator`]: arbitrator::Arbitrator
//! [`RunControl`]: control::RunControl
//! [`PostOffice`]: mailbox::PostOffice
//! [`World`]: world::World

pub mod arbitrator;
pub mod clock;
pub mod config;
pub mod control;
pub mod mailbox;
pub mod report;
pub mod runner;
pub mod tick;
pub mod world;
