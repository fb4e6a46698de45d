//! The robot's private knowledge store.
//!
//! [`Knowledge`] is the only thing [`deliberate`](crate::deliberate) may
//! read. Most of it is rebuilt every tick from the robot's body and fresh
//! percepts; the rest persists across ticks on purpose: the deferred-target
//! [`Backlog`], the current [`Claim`], the motion state, the transform latch,
//! and the [`SeenSet`] used to drop duplicate messages.

use std::collections::{BTreeSet, VecDeque};

use reclaim_types::{AgentId, CellView, PatrolRect, Performative, Position, Tier, WasteId};
use reclaim_world::ZoneLayout;

use crate::config::{MovementMode, RobotTuning};
use crate::inventory::Inventory;
use crate::movement::MotionState;
use crate::policy::Policy;

// ---------------------------------------------------------------------------
// Backlog
// ---------------------------------------------------------------------------

/// A known but unclaimed waste location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacklogEntry {
    /// Where the waste was reported.
    pub waste_pos: Position,
    /// Its tier.
    pub tier: Tier,
    /// Its identity, if reported.
    pub waste_id: Option<WasteId>,
}

/// Bounded FIFO of deferred targets, at most one entry per position.
#[derive(Debug, Clone)]
pub struct Backlog {
    entries: VecDeque<BacklogEntry>,
    capacity: usize,
}

impl Backlog {
    /// Create an empty backlog holding at most `capacity` entries.
    pub const fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the backlog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `pos` is already queued.
    pub fn contains(&self, pos: Position) -> bool {
        self.entries.iter().any(|e| e.waste_pos == pos)
    }

    /// Queue an entry, replacing any entry for the same position.
    ///
    /// When full, the oldest entry is evicted and returned.
    pub fn insert(&mut self, entry: BacklogEntry) -> Option<BacklogEntry> {
        self.remove(entry.waste_pos);
        if self.capacity == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Remove the entry for `pos`. Returns whether one existed.
    pub fn remove(&mut self, pos: Position) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.waste_pos != pos);
        self.entries.len() != before
    }

    /// Remove and return the entry closest to `from` (Manhattan distance,
    /// oldest first on ties).
    pub fn take_nearest(&mut self, from: Position) -> Option<BacklogEntry> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(i, e)| (e.waste_pos.manhattan(from), *i))
            .map(|(i, _)| i)?;
        self.entries.remove(index)
    }

    /// Keep only entries matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&BacklogEntry) -> bool) {
        self.entries.retain(keep);
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &BacklogEntry> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Seen-set
// ---------------------------------------------------------------------------

/// Identity of a delivered message for duplicate suppression.
pub type MessageKey = (AgentId, Performative, Position, Option<WasteId>);

/// Bounded set of recently seen message keys; the oldest key is forgotten
/// first.
#[derive(Debug, Clone)]
pub struct SeenSet {
    order: VecDeque<MessageKey>,
    keys: BTreeSet<MessageKey>,
    capacity: usize,
}

impl SeenSet {
    /// Create an empty set remembering at most `capacity` keys.
    pub const fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            keys: BTreeSet::new(),
            capacity,
        }
    }

    /// Record `key`. Returns `false` if it was already present.
    pub fn insert(&mut self, key: MessageKey) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        if self.capacity == 0 {
            return true;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.keys.remove(&oldest);
            }
        }
        self.order.push_back(key);
        self.keys.insert(key);
        true
    }

    /// Number of remembered keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// A robot's declared intent to retrieve the waste at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    /// Target cell.
    pub waste_pos: Position,
    /// Target identity, if known.
    pub waste_id: Option<WasteId>,
    /// Target tier.
    pub tier: Tier,
    /// Where the robot stood when it claimed.
    pub origin: Position,
    /// Manhattan distance from `origin` to `waste_pos`.
    pub distance: u32,
}

impl Claim {
    /// Claim `entry` from `origin`.
    pub const fn from_entry(entry: BacklogEntry, origin: Position) -> Self {
        Self {
            waste_pos: entry.waste_pos,
            waste_id: entry.waste_id,
            tier: entry.tier,
            origin,
            distance: origin.manhattan(entry.waste_pos),
        }
    }

    /// The claim as a backlog entry, for when it is released.
    pub const fn as_entry(&self) -> BacklogEntry {
        BacklogEntry {
            waste_pos: self.waste_pos,
            tier: self.tier,
            waste_id: self.waste_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Knowledge
// ---------------------------------------------------------------------------

/// Everything a robot knows.
#[derive(Debug, Clone)]
pub struct Knowledge {
    /// The robot's own id.
    pub id: AgentId,
    /// The robot's tier.
    pub tier: Tier,
    /// Deliberation policy.
    pub policy: Policy,
    /// Current cell.
    pub position: Position,
    /// Assigned patrol rectangle.
    pub patrol: PatrolRect,
    /// Zone boundaries of the grid.
    pub layout: ZoneLayout,
    /// Percepts from the most recent sense or action result.
    pub percepts: Vec<CellView>,
    /// Carried units.
    pub inventory: Inventory,
    /// The waste most recently dropped by this robot.
    pub last_dropped: Option<WasteId>,
    /// Deferred targets reported by REQUEST messages.
    pub waste_locations: Backlog,
    /// The target currently being pursued.
    pub target_claim: Option<Claim>,
    /// Target of the most recent DOING broadcast.
    pub last_notified: Option<Position>,
    /// Sweep directions and stuck counter.
    pub motion: MotionState,
    /// Set by a transform, cleared by the next successful drop.
    pub has_transformed: bool,
    /// Sweep orientation.
    pub movement: MovementMode,
    /// Behaviour knobs.
    pub tuning: RobotTuning,
    /// Keys of recently processed messages.
    pub seen: SeenSet,
}

impl Knowledge {
    /// Fresh knowledge for a robot that has not sensed anything yet.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: AgentId,
        tier: Tier,
        policy: Policy,
        position: Position,
        patrol: PatrolRect,
        layout: ZoneLayout,
        movement: MovementMode,
        tuning: RobotTuning,
    ) -> Self {
        Self {
            id,
            tier,
            policy,
            position,
            patrol,
            layout,
            percepts: Vec::new(),
            inventory: Inventory::new(),
            last_dropped: None,
            waste_locations: Backlog::new(tuning.backlog_capacity),
            target_claim: None,
            last_notified: None,
            motion: MotionState::default(),
            has_transformed: false,
            movement,
            tuning,
            seen: SeenSet::new(tuning.seen_capacity),
        }
    }

    /// Column on which carried units are handed over.
    ///
    /// This is the tier's boundary column, pulled in to the patrol edge when
    /// the rectangle stops short of it.
    pub fn relay_column(&self) -> i32 {
        self.layout.boundary_column(self.tier).min(self.patrol.x_max)
    }

    /// Whether the robot stands on its relay column.
    pub fn at_relay_column(&self) -> bool {
        self.position.x >= self.relay_column()
    }

    /// The percept for `pos`, if it was sensed.
    pub fn view(&self, pos: Position) -> Option<&CellView> {
        self.percepts.iter().find(|v| v.position == pos)
    }

    /// The percept for the current cell.
    pub fn here(&self) -> Option<&CellView> {
        self.view(self.position)
    }

    /// Whether the robot may stand on `pos`: on the grid, inside its
    /// rectangle, in a zone its tier may enter, and not seen to hold another
    /// robot.
    pub fn can_enter(&self, pos: Position) -> bool {
        let on_grid = pos.x >= 0
            && pos.y >= 0
            && pos.x < self.layout.width()
            && pos.y < self.layout.height();
        on_grid
            && self.patrol.contains(pos)
            && self.tier.may_enter(self.layout.zone_of(pos))
            && !self
                .view(pos)
                .is_some_and(|v| v.has_robot_other_than(self.id))
    }

    /// Whether the view holds waste this robot would pick up.
    ///
    /// The unit this robot dropped last is never a candidate.
    pub fn is_collectable(&self, view: &CellView) -> bool {
        let tier = self.policy.collects();
        view.wastes()
            .any(|w| w.tier == tier && Some(w.id) != self.last_dropped)
    }

    /// Whether there is room for another unit.
    pub fn has_spare_capacity(&self) -> bool {
        self.inventory.len() < self.policy.capacity()
    }

    /// Whether the robot is carrying a unit it must relay east.
    pub fn is_relaying(&self) -> bool {
        self.inventory.holds(self.policy.relays())
    }

    /// Whether the robot can take on a new target.
    pub fn is_free(&self) -> bool {
        !self.is_relaying() && self.has_spare_capacity()
    }

    /// Whether a waste report at `pos` concerns this robot: inside its
    /// rectangle and in a zone its tier may enter.
    pub fn covers(&self, pos: Position) -> bool {
        self.patrol.contains(pos) && self.tier.may_enter(self.layout.zone_of(pos))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(x: i32, y: i32) -> BacklogEntry {
        BacklogEntry {
            waste_pos: Position::new(x, y),
            tier: Tier::Red,
            waste_id: None,
        }
    }

    #[test]
    fn backlog_dedupes_by_position() {
        let mut backlog = Backlog::new(4);
        backlog.insert(entry(1, 1));
        backlog.insert(entry(1, 1));
        assert_eq!(backlog.len(), 1);
    }

    #[test]
    fn backlog_evicts_oldest_when_full() {
        let mut backlog = Backlog::new(2);
        assert!(backlog.insert(entry(0, 0)).is_none());
        assert!(backlog.insert(entry(0, 1)).is_none());
        let evicted = backlog.insert(entry(0, 2)).unwrap();
        assert_eq!(evicted.waste_pos, Position::new(0, 0));
        assert!(backlog.contains(Position::new(0, 2)));
    }

    #[test]
    fn take_nearest_prefers_distance_then_age() {
        let mut backlog = Backlog::new(8);
        backlog.insert(entry(5, 0));
        backlog.insert(entry(2, 0));
        backlog.insert(entry(0, 2));
        let first = backlog.take_nearest(Position::new(0, 0)).unwrap();
        assert_eq!(first.waste_pos, Position::new(2, 0));
        let second = backlog.take_nearest(Position::new(0, 0)).unwrap();
        assert_eq!(second.waste_pos, Position::new(0, 2));
        assert_eq!(backlog.len(), 1);
    }

    #[test]
    fn seen_set_forgets_oldest() {
        let key = |n| (AgentId::new(n), Performative::Request, Position::new(0, 0), None);
        let mut seen = SeenSet::new(2);
        assert!(seen.insert(key(1)));
        assert!(!seen.insert(key(1)));
        assert!(seen.insert(key(2)));
        assert!(seen.insert(key(3)));
        assert_eq!(seen.len(), 2);
        assert!(seen.insert(key(1)));
    }

    #[test]
    fn claim_records_origin_distance() {
        let claim = Claim::from_entry(entry(4, 3), Position::new(1, 1));
        assert_eq!(claim.distance, 5);
        assert_eq!(claim.as_entry(), entry(4, 3));
    }
}
