//! Enumeration types for the Reclaim simulation.
//!
//! Tiers drive everything: which zones a robot may enter, which waste it
//! collects, what a transform produces, and how many effort units a unit of
//! waste is worth.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Waste and robot colour class.
///
/// Tiers are ordered `Green < Yellow < Red`. Two units of one tier
/// consolidate into one unit of the next; red is the last tier and is only
/// ever disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Lowest tier, confined to zone 1.
    Green,
    /// Middle tier, may roam zones 1 and 2.
    Yellow,
    /// Highest tier, may go anywhere including the disposal column.
    Red,
}

impl Tier {
    /// All tiers, lowest first.
    pub const ALL: [Self; 3] = [Self::Green, Self::Yellow, Self::Red];

    /// The tier produced when two units of this tier are consolidated.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Green => Some(Self::Yellow),
            Self::Yellow => Some(Self::Red),
            Self::Red => None,
        }
    }

    /// Effort units carried by one unit of this tier.
    ///
    /// Two units of tier N always become one unit of tier N+1, so weights
    /// double per tier and the weighted total is conserved by transforms.
    pub const fn weight(self) -> u64 {
        match self {
            Self::Green => 1,
            Self::Yellow => 2,
            Self::Red => 4,
        }
    }

    /// Whether a robot of this tier may occupy a cell of the given zone.
    pub const fn may_enter(self, zone: ZoneKind) -> bool {
        match self {
            Self::Green => matches!(zone, ZoneKind::Z1),
            Self::Yellow => matches!(zone, ZoneKind::Z1 | ZoneKind::Z2),
            Self::Red => true,
        }
    }

    /// The zone this tier's waste is seeded into.
    pub const fn home_zone(self) -> ZoneKind {
        match self {
            Self::Green => ZoneKind::Z1,
            Self::Yellow => ZoneKind::Z2,
            Self::Red => ZoneKind::Z3,
        }
    }
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        };
        f.write_str(name)
    }
}

/// One value per tier.
///
/// Used for world parameters (waste and agent counts) and for per-tier
/// residual counts in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerTier<T> {
    /// Value for [`Tier::Green`].
    pub green: T,
    /// Value for [`Tier::Yellow`].
    pub yellow: T,
    /// Value for [`Tier::Red`].
    pub red: T,
}

impl<T> PerTier<T> {
    /// Build from explicit per-tier values.
    pub const fn new(green: T, yellow: T, red: T) -> Self {
        Self { green, yellow, red }
    }

    /// Borrow the value for a tier.
    pub const fn get(&self, tier: Tier) -> &T {
        match tier {
            Tier::Green => &self.green,
            Tier::Yellow => &self.yellow,
            Tier::Red => &self.red,
        }
    }

    /// Mutably borrow the value for a tier.
    pub const fn get_mut(&mut self, tier: Tier) -> &mut T {
        match tier {
            Tier::Green => &mut self.green,
            Tier::Yellow => &mut self.yellow,
            Tier::Red => &mut self.red,
        }
    }

    /// Iterate `(tier, value)` pairs, lowest tier first.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &T)> {
        Tier::ALL.into_iter().map(move |tier| (tier, self.get(tier)))
    }
}

impl PerTier<u64> {
    /// Sum of all three values (saturating).
    pub fn total(&self) -> u64 {
        self.green.saturating_add(self.yellow).saturating_add(self.red)
    }

    /// Sum weighted by [`Tier::weight`] (saturating).
    pub fn weighted_total(&self) -> u64 {
        self.iter().fold(0_u64, |acc, (tier, count)| {
            acc.saturating_add(count.saturating_mul(tier.weight()))
        })
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Static zone classification of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    /// Western third, low radioactivity.
    Z1,
    /// Middle third, medium radioactivity.
    Z2,
    /// Eastern third, high radioactivity.
    Z3,
    /// The disposal column on the eastern edge.
    Disposal,
}

impl ZoneKind {
    /// Half-open radioactivity interval `[low, high)` for markers of this zone.
    ///
    /// The disposal column is pinned at exactly `1.0`.
    pub const fn radioactivity_range(self) -> (f64, f64) {
        match self {
            Self::Z1 => (0.0, 0.33),
            Self::Z2 => (0.33, 0.66),
            Self::Z3 => (0.66, 1.0),
            Self::Disposal => (1.0, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// Intent carried by a [`Message`](crate::Message).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Performative {
    /// "A waste of tier T exists at position P, act if you can."
    Request,
    /// "I am already pursuing the waste at P; back off unless you are closer."
    Doing,
}

impl core::fmt::Display for Performative {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Request => f.write_str("REQUEST"),
            Self::Doing => f.write_str("DOING"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

/// Why the arbitrator absorbed an action without effect.
///
/// None of these are errors: the robot sees them in its action result and
/// retries on a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// Destination lies outside the grid.
    OutOfBounds,
    /// Destination lies outside the robot's patrol rectangle.
    OutsidePatrol,
    /// Destination zone is closed to the robot's tier.
    ForbiddenZone,
    /// Destination already holds another robot.
    Occupied,
    /// Destination equals the current position.
    Stationary,
    /// Destination is further than one recovery stride away.
    StrideTooLong,
    /// Destination does not match the direction the action promises.
    WrongDirection,
    /// No eligible waste of the requested tier in the cell.
    NoMatchingWaste,
    /// Inventory has no room for another unit.
    InventoryFull,
    /// The robot does not collect waste of this tier.
    NotCollectable,
    /// The robot carries no unit of the tier it tried to drop.
    NotCarried,
    /// The cell already contains waste.
    CellHasWaste,
    /// Fewer than two units of the source tier are held.
    InsufficientUnits,
    /// The robot's role does not include this transform.
    TransformNotPermitted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_chain_ends_at_red() {
        assert_eq!(Tier::Green.next(), Some(Tier::Yellow));
        assert_eq!(Tier::Yellow.next(), Some(Tier::Red));
        assert_eq!(Tier::Red.next(), None);
    }

    #[test]
    fn transform_conserves_weight() {
        for tier in Tier::ALL {
            if let Some(next) = tier.next() {
                assert_eq!(tier.weight().saturating_mul(2), next.weight());
            }
        }
    }

    #[test]
    fn zone_access_widens_with_tier() {
        assert!(Tier::Green.may_enter(ZoneKind::Z1));
        assert!(!Tier::Green.may_enter(ZoneKind::Z2));
        assert!(Tier::Yellow.may_enter(ZoneKind::Z2));
        assert!(!Tier::Yellow.may_enter(ZoneKind::Z3));
        assert!(!Tier::Yellow.may_enter(ZoneKind::Disposal));
        assert!(Tier::Red.may_enter(ZoneKind::Disposal));
    }

    #[test]
    fn per_tier_totals() {
        let counts = PerTier::new(4_u64, 2, 1);
        assert_eq!(counts.total(), 7);
        assert_eq!(counts.weighted_total(), 12);
        assert_eq!(*counts.get(Tier::Yellow), 2);
    }

    #[test]
    fn performative_displays_upper_case() {
        assert_eq!(Performative::Doing.to_string(), "DOING");
        assert_eq!(Performative::Request.to_string(), "REQUEST");
    }
}
