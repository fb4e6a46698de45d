//! The action arbitrator: sole writer of grid state.
//!
//! Robots never touch the grid. They hand an [`Action`] to the
//! [`Arbitrator`], which checks it against bounds, patrol rectangles, zone
//! access, occupancy, and inventory rules, then applies it in place. A
//! rejected action leaves grid and body untouched and comes back as
//! [`ActionOutcome::NoEffect`] with the reason.
//!
//! Movement checks run in a fixed order so the reported reason is
//! deterministic:
//!
//! 1. destination differs from the current cell,
//! 2. the destination matches the action's shape (`MoveEast` is one cell
//!    east, `MoveVertical` one cell north or south, `Move` at most two cells
//!    in any direction),
//! 3. grid bounds,
//! 4. patrol rectangle,
//! 5. zone access for the robot's tier,
//! 6. no other robot in the destination.

use std::collections::BTreeMap;

use reclaim_agents::{AgentError, Arbiter, RobotBody};
use reclaim_types::{
    Action, ActionOutcome, ActionResult, AgentId, CellView, Message, Occupant, PerTier, Position,
    RejectionReason, Tier, Waste, WasteId, ZoneKind,
};
use reclaim_world::{Grid, StartingWorld, WorldError, ZoneLayout};
use tracing::debug;

use crate::mailbox::PostOffice;

/// Longest stride a plain `Move` may take (deadlock retreat covers two
/// cells).
const MAX_STRIDE: u32 = 2;

/// Errors in the arbitrator's own bookkeeping.
///
/// These indicate that grid and robot bodies disagree, never that a robot
/// asked for something illegal.
#[derive(Debug, thiserror::Error)]
pub enum ArbitratorError {
    /// A grid operation failed.
    #[error("grid error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// An inventory operation failed after validation passed.
    #[error("inventory error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// Waste ids are exhausted.
    #[error("waste id counter overflow")]
    WasteIdOverflow,

    /// A robot was registered twice.
    #[error("robot {agent} is already registered")]
    DuplicateAgent {
        /// The repeated id.
        agent: AgentId,
    },

    /// A robot was registered on a cell that already holds a robot.
    #[error("robot {agent} cannot start at {position}: cell already holds robot {other}")]
    StartOccupied {
        /// The robot being registered.
        agent: AgentId,
        /// Its requested start.
        position: Position,
        /// The robot already there.
        other: AgentId,
    },
}

/// Per-robot facts the arbitrator keeps after registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    tier: Tier,
    perception_radius: u32,
    distance: u64,
}

/// Validates and applies robot actions, and owns everything shared:
/// the grid, the mailbox, disposal tallies, and distance travelled.
#[derive(Debug, Clone)]
pub struct Arbitrator {
    grid: Grid,
    layout: ZoneLayout,
    post: PostOffice,
    roster: BTreeMap<AgentId, Registration>,
    next_waste_id: WasteId,
    disposed_units: u64,
    disposed_counts: PerTier<u64>,
    tick: u64,
}

impl Arbitrator {
    /// Take ownership of a freshly built world.
    pub fn new(world: StartingWorld) -> Self {
        Self {
            grid: world.grid,
            layout: world.layout,
            post: PostOffice::new(),
            roster: BTreeMap::new(),
            next_waste_id: world.next_waste_id,
            disposed_units: 0,
            disposed_counts: PerTier::default(),
            tick: 0,
        }
    }

    /// Place a robot on the grid at its body's position.
    pub fn register(
        &mut self,
        body: &RobotBody,
        perception_radius: u32,
    ) -> Result<(), ArbitratorError> {
        if self.roster.contains_key(&body.id) {
            return Err(ArbitratorError::DuplicateAgent { agent: body.id });
        }
        if let Some(other) = self.grid.robot_at(body.position) {
            return Err(ArbitratorError::StartOccupied {
                agent: body.id,
                position: body.position,
                other,
            });
        }
        self.grid.place_occupant(
            body.position,
            Occupant::Robot {
                id: body.id,
                tier: body.tier,
            },
        )?;
        self.roster.insert(
            body.id,
            Registration {
                tier: body.tier,
                perception_radius,
                distance: 0,
            },
        );
        debug!(
            agent_id = %body.id,
            tier = %body.tier,
            position = %body.position,
            "Registered robot"
        );
        Ok(())
    }

    /// Start a new tick: record its number and deliver last tick's mail.
    /// Returns the number of messages delivered.
    pub fn begin_tick(&mut self, tick: u64) -> usize {
        self.tick = tick;
        self.post.deliver(tick)
    }

    /// Close the current tick. Mail delivered this tick but never collected
    /// is dropped; returns how many messages that was.
    pub fn end_tick(&mut self) -> usize {
        self.post.discard_uncollected(self.tick)
    }

    /// The world grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Zone boundaries.
    pub const fn layout(&self) -> &ZoneLayout {
        &self.layout
    }

    /// The mailbox.
    pub const fn post_office(&self) -> &PostOffice {
        &self.post
    }

    /// Weighted units removed at the disposal column so far.
    pub const fn disposed_units(&self) -> u64 {
        self.disposed_units
    }

    /// Units disposed so far, per tier.
    pub const fn disposed_counts(&self) -> &PerTier<u64> {
        &self.disposed_counts
    }

    /// Cumulative Manhattan distance travelled by `agent`.
    pub fn distance_travelled(&self, agent: AgentId) -> u64 {
        self.roster.get(&agent).map_or(0, |r| r.distance)
    }

    /// Perception radius registered for `agent`.
    pub fn perception_radius(&self, agent: AgentId) -> Option<u32> {
        self.roster.get(&agent).map(|r| r.perception_radius)
    }


    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    fn check_move(
        &self,
        body: &RobotBody,
        action: Action,
        to: Position,
    ) -> Result<(), RejectionReason> {
        let from = body.position;
        if to == from {
            return Err(RejectionReason::Stationary);
        }
        match action {
            Action::MoveEast { .. } if from.offset(1, 0) != Some(to) => {
                return Err(RejectionReason::WrongDirection);
            }
            Action::MoveVertical { .. } if !(to.x == from.x && from.manhattan(to) == 1) => {
                return Err(RejectionReason::WrongDirection);
            }
            Action::Move { .. } if from.chebyshev(to) > MAX_STRIDE => {
                return Err(RejectionReason::StrideTooLong);
            }
            _ => {}
        }
        if !self.grid.in_bounds(to) {
            return Err(RejectionReason::OutOfBounds);
        }
        if !body.patrol.contains(to) {
            return Err(RejectionReason::OutsidePatrol);
        }
        if !body.tier.may_enter(self.layout.zone_of(to)) {
            return Err(RejectionReason::ForbiddenZone);
        }
        if self.grid.robot_at(to).is_some_and(|other| other != body.id) {
            return Err(RejectionReason::Occupied);
        }
        Ok(())
    }

    /// The lowest-id waste of `tier` in the body's cell, skipping the unit
    /// the robot dropped last.
    fn pickable(&self, body: &RobotBody, tier: Tier) -> Result<Option<Waste>, WorldError> {
        Ok(self
            .grid
            .cell_contents(body.position)?
            .iter()
            .filter_map(Occupant::as_waste)
            .filter(|w| w.tier == tier && Some(w.id) != body.last_dropped)
            .min_by_key(|w| w.id))
    }

    fn cell_has_waste(&self, pos: Position) -> Result<bool, WorldError> {
        Ok(self
            .grid
            .cell_contents(pos)?
            .iter()
            .any(|o| o.as_waste().is_some()))
    }

    // -----------------------------------------------------------------------
    // Application
    // -----------------------------------------------------------------------

    fn apply_move(
        &mut self,
        body: &mut RobotBody,
        to: Position,
    ) -> Result<ActionOutcome, ArbitratorError> {
        let from = body.position;
        let occupant = Occupant::Robot {
            id: body.id,
            tier: body.tier,
        };
        self.grid.move_occupant(&occupant, from, to)?;
        body.position = to;
        if let Some(reg) = self.roster.get_mut(&body.id) {
            reg.distance = reg.distance.saturating_add(u64::from(from.manhattan(to)));
        }
        Ok(ActionOutcome::Moved { from, to })
    }

    fn apply_pickup(
        &mut self,
        body: &mut RobotBody,
        tier: Tier,
    ) -> Result<ActionOutcome, ArbitratorError> {
        if tier != body.policy.collects() {
            return Ok(rejected(RejectionReason::NotCollectable));
        }
        let capacity = body.policy.capacity();
        if body.inventory.len() >= capacity {
            return Ok(rejected(RejectionReason::InventoryFull));
        }
        let Some(waste) = self.pickable(body, tier)? else {
            return Ok(rejected(RejectionReason::NoMatchingWaste));
        };
        body.inventory.add(tier, capacity)?;
        self.grid.remove_waste(body.position, waste.id)?;
        Ok(ActionOutcome::PickedUp { waste })
    }

    fn apply_drop(
        &mut self,
        body: &mut RobotBody,
        tier: Tier,
    ) -> Result<ActionOutcome, ArbitratorError> {
        if !body.inventory.holds(tier) {
            return Ok(rejected(RejectionReason::NotCarried));
        }
        if self.layout.zone_of(body.position) == ZoneKind::Disposal {
            body.inventory.remove(tier)?;
            let units = tier.weight();
            self.disposed_units = self.disposed_units.saturating_add(units);
            let count = self.disposed_counts.get_mut(tier);
            *count = count.saturating_add(1);
            return Ok(ActionOutcome::Disposed { tier, units });
        }
        if self.cell_has_waste(body.position)? {
            return Ok(rejected(RejectionReason::CellHasWaste));
        }

        let id = self.next_waste_id;
        self.next_waste_id = id.next().ok_or(ArbitratorError::WasteIdOverflow)?;
        let waste = Waste::new(id, tier);
        body.inventory.remove(tier)?;
        self.grid.place_occupant(body.position, Occupant::Waste(waste))?;
        body.last_dropped = Some(id);
        Ok(ActionOutcome::Dropped { waste })
    }

    fn apply_transform(
        &mut self,
        body: &mut RobotBody,
        from: Tier,
        to: Tier,
    ) -> Result<ActionOutcome, ArbitratorError> {
        if body.policy.transform() != Some((from, to)) {
            return Ok(rejected(RejectionReason::TransformNotPermitted));
        }
        if body.inventory.count(from) < 2 {
            return Ok(rejected(RejectionReason::InsufficientUnits));
        }
        body.inventory.transform(from, to)?;
        Ok(ActionOutcome::Transformed { from, to })
    }
}

const fn rejected(reason: RejectionReason) -> ActionOutcome {
    ActionOutcome::NoEffect { reason }
}

impl Arbiter for Arbitrator {
    type Error = ArbitratorError;

    fn tick(&self) -> u64 {
        self.tick
    }

    fn sense(&self, position: Position, radius: u32) -> Vec<CellView> {
        self.grid.neighborhood(position, radius, true)
    }

    fn apply(&mut self, body: &mut RobotBody, action: Action) -> Result<ActionResult, Self::Error> {
        let outcome = match action {
            Action::Move { to } | Action::MoveEast { to } | Action::MoveVertical { to } => {
                match self.check_move(body, action, to) {
                    Ok(()) => self.apply_move(body, to)?,
                    Err(reason) => rejected(reason),
                }
            }
            Action::Pickup { tier } => self.apply_pickup(body, tier)?,
            Action::Drop { tier } => self.apply_drop(body, tier)?,
            Action::Transform { from, to } => self.apply_transform(body, from, to)?,
        };

        match outcome {
            ActionOutcome::NoEffect { reason } => {
                debug!(tick = self.tick, agent_id = %body.id, ?action, ?reason, "Action absorbed");
            }
            _ => {
                debug!(tick = self.tick, agent_id = %body.id, ?action, ?outcome, "Action applied");
            }
        }

        let radius = self.perception_radius(body.id).unwrap_or(1);
        Ok(ActionResult {
            tick: self.tick,
            agent_id: body.id,
            action,
            outcome,
            percepts: self.grid.neighborhood(body.position, radius, true),
        })
    }

    fn collect_mail(&mut self, agent: AgentId) -> Vec<Message> {
        self.post.collect(agent)
    }

    fn post(&mut self, message: Message) {
        self.post.send(message);
    }

    fn peers(&self, tier: Tier) -> Vec<AgentId> {
        self.roster
            .iter()
            .filter(|(_, r)| r.tier == tier)
            .map(|(id, _)| *id)
            .collect()
    }
}
