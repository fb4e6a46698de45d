//! The robot agent and its seam to the arbitrator.
//!
//! A [`Robot`] splits its state in two. The [`RobotBody`] is the physical
//! part (position, inventory, last dropped waste) and is only ever written
//! by the [`Arbiter`] while applying an action. The [`Knowledge`] is the
//! private part the robot updates itself and deliberates over.
//!
//! One call to [`Robot::step`] is one tick for this robot:
//!
//! 1. drain and process the mailbox,
//! 2. sense the neighborhood,
//! 3. merge body and percepts into knowledge, refresh claims,
//! 4. deliberate,
//! 5. submit the action and keep the returned percepts.

use reclaim_types::{
    Action, ActionOutcome, ActionResult, AgentId, CellView, Message, MessageContent, PatrolRect,
    Position, Tier, WasteId,
};
use reclaim_world::ZoneLayout;
use tracing::{debug, warn};

use crate::config::RobotConfig;
use crate::error::AgentError;
use crate::inventory::Inventory;
use crate::knowledge::Knowledge;
use crate::policy::{Policy, deliberate};
use crate::protocol::{self, MessageEffect};

/// The world as a robot sees it: something that senses, validates and
/// applies actions, and carries messages.
pub trait Arbiter {
    /// Failure of the arbiter's own bookkeeping. Rejected actions are not
    /// errors; they come back as [`ActionOutcome::NoEffect`].
    type Error;

    /// The tick currently being run.
    fn tick(&self) -> u64;

    /// Contents of every cell within `radius` of `position`, centre included.
    fn sense(&self, position: Position, radius: u32) -> Vec<CellView>;

    /// Validate and apply `action` for `body`, mutating both the grid and
    /// the body on success.
    fn apply(&mut self, body: &mut RobotBody, action: Action) -> Result<ActionResult, Self::Error>;

    /// Take every message delivered to `agent`.
    fn collect_mail(&mut self, agent: AgentId) -> Vec<Message>;

    /// Queue a message for delivery at the start of the next tick.
    fn post(&mut self, message: Message);

    /// Ids of every robot of `tier`.
    fn peers(&self, tier: Tier) -> Vec<AgentId>;
}

/// The physical state of a robot, owned by the robot but written only by
/// the arbiter.
#[derive(Debug, Clone)]
pub struct RobotBody {
    /// Robot identity.
    pub id: AgentId,
    /// Robot tier.
    pub tier: Tier,
    /// Role, which fixes capacity and the permitted transform.
    pub policy: Policy,
    /// Current cell.
    pub position: Position,
    /// Assigned patrol rectangle.
    pub patrol: PatrolRect,
    /// Carried units.
    pub inventory: Inventory,
    /// The waste most recently dropped by this robot.
    pub last_dropped: Option<WasteId>,
}

/// A robot agent.
#[derive(Debug, Clone)]
pub struct Robot {
    body: RobotBody,
    knowledge: Knowledge,
    claim_protocol: bool,
    /// Consecutive ticks a gatherer has ended holding one raw unit.
    lone_unit_ticks: u64,
}

impl Robot {
    /// Build a robot from its configuration.
    ///
    /// Fails if no patrol rectangle was assigned, if the start lies outside
    /// it, or if the variant needs a next tier that does not exist.
    pub fn new(config: &RobotConfig, layout: ZoneLayout) -> Result<Self, AgentError> {
        let patrol = config
            .patrol
            .ok_or(AgentError::MissingPatrolRect { agent: config.id })?;
        let start = config.start.unwrap_or_else(|| patrol.origin());
        if !patrol.contains(start) {
            return Err(AgentError::StartOutsidePatrol {
                agent: config.id,
                start,
                patrol,
            });
        }
        let policy = Policy::for_variant(config.tier, config.variant)?;

        let body = RobotBody {
            id: config.id,
            tier: config.tier,
            policy,
            position: start,
            patrol,
            inventory: Inventory::new(),
            last_dropped: None,
        };
        let knowledge = Knowledge::new(
            config.id,
            config.tier,
            policy,
            start,
            patrol,
            layout,
            config.movement,
            config.tuning,
        );
        Ok(Self {
            body,
            knowledge,
            claim_protocol: config.claim_protocol,
            lone_unit_ticks: 0,
        })
    }

    /// Robot identity.
    pub const fn id(&self) -> AgentId {
        self.body.id
    }

    /// Robot tier.
    pub const fn tier(&self) -> Tier {
        self.body.tier
    }

    /// Current cell.
    pub const fn position(&self) -> Position {
        self.body.position
    }

    /// Physical state.
    pub const fn body(&self) -> &RobotBody {
        &self.body
    }

    /// Private knowledge.
    pub const fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    /// Run one tick for this robot.
    ///
    /// Errors come only from the arbiter; a rejected action is an ordinary
    /// result.
    pub fn step<A: Arbiter>(&mut self, arbiter: &mut A) -> Result<ActionResult, A::Error> {
        let tick = arbiter.tick();
        self.process_messages(arbiter, tick);

        let percepts = arbiter.sense(self.body.position, self.knowledge.tuning.perception_radius);
        self.merge(percepts);
        self.refresh_claims(arbiter, tick);

        let plan = deliberate(&self.knowledge);
        let result = arbiter.apply(&mut self.body, plan.action)?;

        self.knowledge.motion = if result.outcome.had_effect() {
            plan.on_success
        } else {
            plan.on_failure
        };
        self.warn_if_stuck(tick);

        self.knowledge.position = self.body.position;
        self.knowledge.inventory.clone_from(&self.body.inventory);
        self.knowledge.last_dropped = self.body.last_dropped;
        protocol::after_action(&mut self.knowledge, &result.outcome);
        self.track_lone_unit(tick);

        if let ActionOutcome::Dropped { waste } = result.outcome {
            self.announce_drop(arbiter, tick, waste.tier, waste.id);
        }

        self.knowledge.percepts.clone_from(&result.percepts);
        Ok(result)
    }

    fn process_messages<A: Arbiter>(&mut self, arbiter: &mut A, tick: u64) {
        for message in arbiter.collect_mail(self.body.id) {
            let effect = protocol::receive(&mut self.knowledge, &message);
            match effect {
                MessageEffect::Duplicate => {
                    warn!(
                        tick,
                        agent_id = %self.body.id,
                        sender = %message.sender,
                        performative = %message.performative,
                        "Dropped duplicate message"
                    );
                }
                MessageEffect::QueuedWithEviction(evicted) => {
                    warn!(
                        tick,
                        agent_id = %self.body.id,
                        evicted = %evicted.waste_pos,
                        "Backlog full, evicted oldest target"
                    );
                }
                MessageEffect::Ceded(claim) => {
                    debug!(
                        tick,
                        agent_id = %self.body.id,
                        rival = %message.sender,
                        target = %claim.waste_pos,
                        "Ceded claim"
                    );
                }
                MessageEffect::Ignored
                | MessageEffect::Queued
                | MessageEffect::Held
                | MessageEffect::Withdrawn => {
                    debug!(
                        tick,
                        agent_id = %self.body.id,
                        sender = %message.sender,
                        performative = %message.performative,
                        ?effect,
                        "Processed message"
                    );
                }
            }
        }
    }

    fn merge(&mut self, percepts: Vec<CellView>) {
        let k = &mut self.knowledge;
        k.position = self.body.position;
        k.inventory.clone_from(&self.body.inventory);
        k.last_dropped = self.body.last_dropped;
        k.percepts = percepts;
    }

    fn refresh_claims<A: Arbiter>(&mut self, arbiter: &mut A, tick: u64) {
        if let Some(stale) = protocol::clear_stale_claim(&mut self.knowledge) {
            debug!(
                tick,
                agent_id = %self.body.id,
                target = %stale.waste_pos,
                "Cleared stale claim"
            );
        }
        let pruned = protocol::prune_backlog(&mut self.knowledge);
        if pruned > 0 {
            debug!(tick, agent_id = %self.body.id, pruned, "Pruned backlog");
        }
        if let Some(claim) = protocol::select_claim(&mut self.knowledge) {
            debug!(
                tick,
                agent_id = %self.body.id,
                target = %claim.waste_pos,
                distance = claim.distance,
                "Claimed target"
            );
        }
        if !self.claim_protocol {
            return;
        }
        if let Some(content) = protocol::announcement(&mut self.knowledge) {
            self.broadcast(arbiter, tick, self.body.tier, content, Message::doing);
        }
    }

    fn announce_drop<A: Arbiter>(&self, arbiter: &mut A, tick: u64, tier: Tier, waste: WasteId) {
        let content = MessageContent {
            waste_pos: self.body.position,
            waste_tier: tier,
            waste_id: Some(waste),
            sender_pos: self.body.position,
        };
        self.broadcast(arbiter, tick, tier, content, Message::request);
    }

    fn broadcast<A: Arbiter>(
        &self,
        arbiter: &mut A,
        tick: u64,
        tier: Tier,
        content: MessageContent,
        build: fn(AgentId, AgentId, MessageContent, u64) -> Message,
    ) {
        for peer in arbiter.peers(tier) {
            if peer == self.body.id {
                continue;
            }
            let message = build(self.body.id, peer, content, tick);
            debug!(
                tick,
                agent_id = %self.body.id,
                recipient = %peer,
                performative = %message.performative,
                target = %content.waste_pos,
                "Sent message"
            );
            arbiter.post(message);
        }
    }

    /// Warn once per streak when a gatherer has carried a single raw unit
    /// for as many ticks as its rectangle has cells.
    fn track_lone_unit(&mut self, tick: u64) {
        let inventory = &self.body.inventory;
        let lone = self
            .body
            .policy
            .transform()
            .is_some_and(|(from, _)| inventory.len() == 1 && inventory.holds(from));
        if !lone {
            self.lone_unit_ticks = 0;
            return;
        }
        self.lone_unit_ticks = self.lone_unit_ticks.saturating_add(1);
        let patrol = self.body.patrol;
        let full_sweep = u64::from(patrol.width()).saturating_mul(u64::from(patrol.height()));
        if self.lone_unit_ticks == full_sweep {
            warn!(
                tick,
                agent_id = %self.body.id,
                tier = %self.body.tier,
                ticks = self.lone_unit_ticks,
                position = %self.body.position,
                "Holding a lone unit after a full sweep; no partner may remain"
            );
        }
    }

    fn warn_if_stuck(&self, tick: u64) {
        let stuck = self.knowledge.motion.stuck_counter;
        let every = self.knowledge.tuning.stuck_threshold.saturating_mul(10).max(1);
        if stuck > 0 && stuck.checked_rem(every) == Some(0) {
            warn!(
                tick,
                agent_id = %self.body.id,
                stuck,
                position = %self.body.position,
                "Robot stuck with no way out"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use reclaim_types::{Performative, RejectionReason, Waste};

    use super::*;
    use crate::config::Variant;

    /// Arbiter stand-in: moves always succeed, other actions return a
    /// scripted outcome.
    #[derive(Default)]
    struct Scripted {
        tick: u64,
        inbox: BTreeMap<AgentId, Vec<Message>>,
        posted: Vec<Message>,
        peers: Vec<(AgentId, Tier)>,
        outcome: Option<ActionOutcome>,
        applied: Vec<Action>,
    }

    impl Arbiter for Scripted {
        type Error = std::convert::Infallible;

        fn tick(&self) -> u64 {
            self.tick
        }

        fn sense(&self, position: Position, _radius: u32) -> Vec<CellView> {
            vec![CellView::new(position, Vec::new())]
        }

        fn apply(
            &mut self,
            body: &mut RobotBody,
            action: Action,
        ) -> Result<ActionResult, Self::Error> {
            self.applied.push(action);
            let outcome = match (action, self.outcome) {
                (_, Some(outcome)) => outcome,
                (Action::Move { to }, None) if to != body.position => {
                    let from = body.position;
                    body.position = to;
                    ActionOutcome::Moved { from, to }
                }
                _ => ActionOutcome::NoEffect {
                    reason: RejectionReason::Stationary,
                },
            };
            if let ActionOutcome::Dropped { waste } = outcome {
                body.inventory.remove(waste.tier).unwrap();
                body.last_dropped = Some(waste.id);
            }
            Ok(ActionResult {
                tick: self.tick,
                agent_id: body.id,
                action,
                outcome,
                percepts: Vec::new(),
            })
        }

        fn collect_mail(&mut self, agent: AgentId) -> Vec<Message> {
            self.inbox.remove(&agent).unwrap_or_default()
        }

        fn post(&mut self, message: Message) {
            self.posted.push(message);
        }

        fn peers(&self, tier: Tier) -> Vec<AgentId> {
            self.peers
                .iter()
                .filter(|(_, t)| *t == tier)
                .map(|(id, _)| *id)
                .collect()
        }
    }

    fn layout() -> ZoneLayout {
        ZoneLayout::new(15, 9).unwrap()
    }

    #[test]
    fn missing_patrol_is_fatal() {
        let config = RobotConfig::new(AgentId::new(1), Tier::Green, Variant::Gather);
        assert!(matches!(
            Robot::new(&config, layout()),
            Err(AgentError::MissingPatrolRect { .. })
        ));
    }

    #[test]
    fn start_outside_patrol_is_fatal() {
        let config = RobotConfig::new(AgentId::new(1), Tier::Green, Variant::Gather)
            .with_patrol(PatrolRect::new(0, 4, 0, 8).unwrap())
            .with_start(Position::new(6, 0));
        assert!(matches!(
            Robot::new(&config, layout()),
            Err(AgentError::StartOutsidePatrol { .. })
        ));
    }

    #[test]
    fn starts_at_patrol_origin_and_sweeps() {
        let config = RobotConfig::new(AgentId::new(1), Tier::Yellow, Variant::Gather)
            .with_patrol(PatrolRect::new(4, 9, 3, 5).unwrap());
        let mut robot = Robot::new(&config, layout()).unwrap();
        assert_eq!(robot.position(), Position::new(4, 3));

        let mut arbiter = Scripted::default();
        robot.step(&mut arbiter).unwrap();
        assert_eq!(robot.position(), Position::new(5, 3));
        assert_eq!(robot.knowledge().position, Position::new(5, 3));
    }

    #[test]
    fn failed_moves_accumulate() {
        let config = RobotConfig::new(AgentId::new(1), Tier::Green, Variant::Gather)
            .with_patrol(PatrolRect::new(0, 4, 0, 8).unwrap());
        let mut robot = Robot::new(&config, layout()).unwrap();
        let mut arbiter = Scripted {
            outcome: Some(ActionOutcome::NoEffect {
                reason: RejectionReason::Occupied,
            }),
            ..Scripted::default()
        };
        for _ in 0..3 {
            robot.step(&mut arbiter).unwrap();
        }
        assert_eq!(robot.knowledge().motion.stuck_counter, 3);
    }

    #[test]
    fn lone_unit_streak_counts_until_a_partner_arrives() {
        let config = RobotConfig::new(AgentId::new(1), Tier::Green, Variant::Gather)
            .with_patrol(PatrolRect::new(0, 2, 0, 1).unwrap());
        let mut robot = Robot::new(&config, layout()).unwrap();
        let mut arbiter = Scripted::default();

        robot.step(&mut arbiter).unwrap();
        assert_eq!(robot.lone_unit_ticks, 0);

        robot.body.inventory = Inventory::from(vec![Tier::Green]);
        for _ in 0..7 {
            robot.step(&mut arbiter).unwrap();
        }
        assert_eq!(robot.lone_unit_ticks, 7);

        robot.body.inventory = Inventory::from(vec![Tier::Green, Tier::Green]);
        robot.step(&mut arbiter).unwrap();
        assert_eq!(robot.lone_unit_ticks, 0);
    }

    #[test]
    fn couriers_never_count_lone_units() {
        let config = RobotConfig::new(AgentId::new(1), Tier::Green, Variant::Courier)
            .with_patrol(PatrolRect::new(0, 2, 0, 1).unwrap());
        let mut robot = Robot::new(&config, layout()).unwrap();
        robot.body.inventory = Inventory::from(vec![Tier::Green]);
        let mut arbiter = Scripted::default();
        for _ in 0..3 {
            robot.step(&mut arbiter).unwrap();
        }
        assert_eq!(robot.lone_unit_ticks, 0);
    }

    #[test]
    fn claim_is_announced_once_to_same_tier_peers() {
        let me = AgentId::new(1);
        let config = RobotConfig::new(me, Tier::Red, Variant::Courier)
            .with_patrol(PatrolRect::new(9, 14, 0, 8).unwrap());
        let mut robot = Robot::new(&config, layout()).unwrap();
        let content = MessageContent {
            waste_pos: Position::new(9, 6),
            waste_tier: Tier::Red,
            waste_id: Some(WasteId::new(3)),
            sender_pos: Position::new(9, 6),
        };
        let mut arbiter = Scripted {
            peers: vec![
                (me, Tier::Red),
                (AgentId::new(2), Tier::Red),
                (AgentId::new(3), Tier::Yellow),
            ],
            ..Scripted::default()
        };
        arbiter
            .inbox
            .insert(me, vec![Message::request(AgentId::new(3), me, content, 0)]);

        robot.step(&mut arbiter).unwrap();
        assert_eq!(arbiter.posted.len(), 1);
        let doing = arbiter.posted[0];
        assert_eq!(doing.performative, Performative::Doing);
        assert_eq!(doing.recipient, AgentId::new(2));
        assert_eq!(doing.content.sender_pos, Position::new(9, 0));

        arbiter.tick = 1;
        robot.step(&mut arbiter).unwrap();
        assert_eq!(arbiter.posted.len(), 1);
    }

    #[test]
    fn drop_sends_request_to_collecting_tier() {
        let me = AgentId::new(1);
        let config = RobotConfig::new(me, Tier::Green, Variant::Gather)
            .with_patrol(PatrolRect::new(0, 4, 0, 8).unwrap())
            .with_start(Position::new(4, 2));
        let mut robot = Robot::new(&config, layout()).unwrap();
        robot.body.inventory = Inventory::from(vec![Tier::Yellow]);
        let dropped = Waste::new(WasteId::new(17), Tier::Yellow);
        let mut arbiter = Scripted {
            peers: vec![(me, Tier::Green), (AgentId::new(5), Tier::Yellow)],
            outcome: Some(ActionOutcome::Dropped { waste: dropped }),
            ..Scripted::default()
        };

        robot.step(&mut arbiter).unwrap();
        assert_eq!(arbiter.applied, vec![Action::Drop { tier: Tier::Yellow }]);
        assert_eq!(arbiter.posted.len(), 1);
        let request = arbiter.posted[0];
        assert_eq!(request.performative, Performative::Request);
        assert_eq!(request.recipient, AgentId::new(5));
        assert_eq!(request.content.waste_id, Some(WasteId::new(17)));
        assert_eq!(robot.knowledge().last_dropped, Some(WasteId::new(17)));
        assert!(!robot.knowledge().has_transformed);
    }
}
