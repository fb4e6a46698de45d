//! Simulation state and its construction from plain parameters.
//!
//! A [`World`] owns the clock, the [`Arbitrator`] (and through it the grid
//! and mailbox), every robot, and the RNG used for turn order. It is built
//! from [`WorldParams`]: grid size, waste and robot counts per tier, plus
//! seed, ordering, and robot tuning.
//!
//! Robot ids are handed out sequentially from 1, green first, then yellow,
//! then red. Each tier's territory is split into one horizontal strip per
//! robot and each robot starts on the first free cell of its strip.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use reclaim_agents::{AgentError, Arbiter, MovementMode, Robot, RobotConfig, RobotTuning, Variant};
use reclaim_types::{AgentId, Message, PatrolRect, PerTier, Position, Tier};
use reclaim_world::{Grid, StartingWorld, WorldError, ZoneLayout, create_starting_world};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::arbitrator::{Arbitrator, ArbitratorError};
use crate::clock::WorldClock;
use crate::report::WorldReport;

/// Errors raised while building a world.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The grid or layout could not be built.
    #[error("world setup failed: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A robot could not be constructed.
    #[error("robot setup failed: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A robot could not be placed.
    #[error("robot placement failed: {source}")]
    Arbitrator {
        /// The underlying arbitrator error.
        #[from]
        source: ArbitratorError,
    },

    /// Every cell of a patrol rectangle already holds a robot.
    #[error("no free start cell for robot {agent} in {patrol}")]
    NoFreeStart {
        /// The robot being placed.
        agent: AgentId,
        /// Its patrol rectangle.
        patrol: PatrolRect,
    },

    /// Robot ids are exhausted.
    #[error("agent id counter overflow")]
    AgentIdOverflow,
}

/// Order in which robots act within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentOrder {
    /// Ascending robot id every tick.
    Fixed,
    /// A fresh seeded shuffle every tick.
    #[default]
    Shuffled,
}

/// Plain numeric parameters a world is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldParams {
    /// Grid columns.
    pub width: u32,
    /// Grid rows.
    pub height: u32,
    /// Initial waste units per tier.
    pub waste: PerTier<u32>,
    /// Robots per tier.
    pub agents: PerTier<u32>,
    /// Role of the robots of each tier.
    pub variants: PerTier<Variant>,
    /// Sweep orientation of the robots of each tier.
    pub movement: PerTier<MovementMode>,
    /// RNG seed for seeding waste, radioactivity, and turn order.
    pub seed: u64,
    /// Turn order within a tick.
    pub agent_order: AgentOrder,
    /// Robot tuning shared by every robot.
    pub tuning: RobotTuning,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            width: 15,
            height: 9,
            waste: PerTier::new(4, 4, 4),
            agents: PerTier::new(1, 1, 1),
            variants: PerTier::new(Variant::Gather, Variant::Gather, Variant::Courier),
            movement: PerTier::default(),
            seed: 42,
            agent_order: AgentOrder::Shuffled,
            tuning: RobotTuning::default(),
        }
    }
}

/// The whole simulation state.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) clock: WorldClock,
    pub(crate) arbitrator: Arbitrator,
    pub(crate) robots: BTreeMap<AgentId, Robot>,
    order: AgentOrder,
    rng: StdRng,
    first_all_clear_tick: Option<u64>,
    initial_units: u64,
}

impl World {
    /// Build a world from parameters.
    pub fn new(params: &WorldParams) -> Result<Self, SetupError> {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let starting = create_starting_world(params.width, params.height, &params.waste, &mut rng)?;
        let configs = robot_configs(&starting.layout, params)?;
        let mut world = Self::assemble(starting, Vec::new(), params.agent_order, rng)?;
        for config in configs {
            let start = world.free_start(&config)?;
            world.add_robot(config.with_start(start))?;
        }
        world.check_all_clear();
        info!(
            width = params.width,
            height = params.height,
            robots = world.robots.len(),
            waste = world.arbitrator.grid().waste_counts().total(),
            seed = params.seed,
            order = ?params.agent_order,
            "World built"
        );
        Ok(world)
    }

    /// Build a world from a prepared grid and explicit robot configurations.
    ///
    /// Every configuration must carry a patrol rectangle; robots without a
    /// start begin at their rectangle's origin.
    pub fn from_parts(
        starting: StartingWorld,
        robots: Vec<RobotConfig>,
        order: AgentOrder,
        seed: u64,
    ) -> Result<Self, SetupError> {
        let mut world = Self::assemble(starting, robots, order, StdRng::seed_from_u64(seed))?;
        world.check_all_clear();
        Ok(world)
    }

    fn assemble(
        starting: StartingWorld,
        robots: Vec<RobotConfig>,
        order: AgentOrder,
        rng: StdRng,
    ) -> Result<Self, SetupError> {
        let initial_units = starting.grid.waste_counts().weighted_total();
        let mut world = Self {
            clock: WorldClock::new(),
            arbitrator: Arbitrator::new(starting),
            robots: BTreeMap::new(),
            order,
            rng,
            first_all_clear_tick: None,
            initial_units,
        };
        for config in robots {
            world.add_robot(config)?;
        }
        Ok(world)
    }

    fn add_robot(&mut self, config: RobotConfig) -> Result<(), SetupError> {
        let robot = Robot::new(&config, *self.arbitrator.layout())?;
        self.arbitrator
            .register(robot.body(), config.tuning.perception_radius)?;
        self.initial_units = self
            .initial_units
            .saturating_add(robot.body().inventory.weighted_units());
        debug!(
            agent_id = %robot.id(),
            tier = %robot.tier(),
            variant = ?config.variant,
            position = %robot.position(),
            "Robot placed"
        );
        self.robots.insert(robot.id(), robot);
        Ok(())
    }

    /// First cell of the robot's rectangle, in row order from its origin,
    /// that holds no robot yet.
    fn free_start(&self, config: &RobotConfig) -> Result<Position, SetupError> {
        let patrol = config.patrol.ok_or(AgentError::MissingPatrolRect { agent: config.id })?;
        let grid = self.arbitrator.grid();
        (patrol.y_min..=patrol.y_max)
            .flat_map(|y| (patrol.x_min..=patrol.x_max).map(move |x| Position::new(x, y)))
            .find(|&pos| grid.robot_at(pos).is_none())
            .ok_or(SetupError::NoFreeStart {
                agent: config.id,
                patrol,
            })
    }

    // -----------------------------------------------------------------------
    // Tick support
    // -----------------------------------------------------------------------

    /// Robot ids in the order they act this tick.
    pub(crate) fn turn_order(&mut self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.robots.keys().copied().collect();
        if self.order == AgentOrder::Shuffled {
            ids.shuffle(&mut self.rng);
        }
        ids
    }

    /// Record the all-clear tick the first time the world is clear.
    /// Returns whether the world is clear now.
    pub(crate) fn check_all_clear(&mut self) -> bool {
        let clear = self.is_all_clear();
        if clear && self.first_all_clear_tick.is_none() {
            let tick = self.clock.tick();
            self.first_all_clear_tick = Some(tick);
            info!(tick, disposed_units = self.arbitrator.disposed_units(), "All waste eliminated");
        }
        clear
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The last tick run (0 before the first).
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// The arbitrator.
    pub const fn arbitrator(&self) -> &Arbitrator {
        &self.arbitrator
    }

    /// The world grid.
    pub const fn grid(&self) -> &Grid {
        self.arbitrator.grid()
    }

    /// Zone boundaries.
    pub const fn layout(&self) -> &ZoneLayout {
        self.arbitrator.layout()
    }

    /// Every robot, by id.
    pub const fn robots(&self) -> &BTreeMap<AgentId, Robot> {
        &self.robots
    }

    /// One robot.
    pub fn robot(&self, id: AgentId) -> Option<&Robot> {
        self.robots.get(&id)
    }

    /// Queue a message as if a robot had sent it. It is delivered at the
    /// start of the first tick after its `sent_tick`.
    pub fn post_message(&mut self, message: Message) {
        self.arbitrator.post(message);
    }

    /// The tick at which the world first became clear, if it has.
    pub const fn first_all_clear_tick(&self) -> Option<u64> {
        self.first_all_clear_tick
    }

    /// No waste on the grid and nothing carried.
    pub fn is_all_clear(&self) -> bool {
        self.arbitrator.grid().wastes().next().is_none()
            && self.robots.values().all(|r| r.body().inventory.is_empty())
    }

    /// Waste units still carried, per tier.
    pub fn carried_counts(&self) -> PerTier<u64> {
        let mut counts = PerTier::<u64>::default();
        for robot in self.robots.values() {
            for tier in robot.body().inventory.iter() {
                let slot = counts.get_mut(tier);
                *slot = slot.saturating_add(1);
            }
        }
        counts
    }

    /// Weighted units on the grid, in inventories, and disposed. Constant
    /// over a run.
    pub fn weighted_units(&self) -> u64 {
        self.arbitrator
            .grid()
            .waste_counts()
            .weighted_total()
            .saturating_add(self.carried_counts().weighted_total())
            .saturating_add(self.arbitrator.disposed_units())
    }

    /// Weighted units present when the world was built.
    pub const fn initial_units(&self) -> u64 {
        self.initial_units
    }

    /// Snapshot of the current state.
    pub fn report(&self) -> WorldReport {
        WorldReport::capture(self)
    }
}

/// One configuration per robot, ids sequential by tier.
fn robot_configs(
    layout: &ZoneLayout,
    params: &WorldParams,
) -> Result<Vec<RobotConfig>, SetupError> {
    let mut configs = Vec::new();
    let mut next = AgentId::new(1);
    for tier in Tier::ALL {
        for patrol in layout.patrol_rects(tier, *params.agents.get(tier))? {
            let config = RobotConfig::new(next, tier, *params.variants.get(tier))
                .with_patrol(patrol)
                .with_movement(*params.movement.get(tier))
                .with_tuning(params.tuning);
            configs.push(config);
            next = next.next().ok_or(SetupError::AgentIdOverflow)?;
        }
    }
    Ok(configs)
}
