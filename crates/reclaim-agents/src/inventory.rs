//! Carried waste.
//!
//! An [`Inventory`] is an ordered list of tiers. Order matters only for
//! reporting; every operation is by tier. Capacity is enforced by the
//! caller-supplied limit so the same type serves gatherers (2) and
//! couriers (1).

use reclaim_types::Tier;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Ordered list of carried units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Tier>,
}

impl Inventory {
    /// Create an empty inventory.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of units carried.
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is carried.
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Units of `tier` carried.
    pub fn count(&self, tier: Tier) -> usize {
        self.items.iter().filter(|&&t| t == tier).count()
    }

    /// Whether at least one unit of `tier` is carried.
    pub fn holds(&self, tier: Tier) -> bool {
        self.items.contains(&tier)
    }

    /// Carried tiers in pickup order.
    pub fn iter(&self) -> impl Iterator<Item = Tier> + '_ {
        self.items.iter().copied()
    }

    /// Sum of carried weights.
    pub fn weighted_units(&self) -> u64 {
        self.items
            .iter()
            .fold(0_u64, |acc, t| acc.saturating_add(t.weight()))
    }

    /// Add one unit of `tier`, failing if `capacity` is already reached.
    pub fn add(&mut self, tier: Tier, capacity: usize) -> Result<(), AgentError> {
        if self.items.len() >= capacity {
            return Err(AgentError::InventoryFull { tier, capacity });
        }
        self.items.push(tier);
        Ok(())
    }

    /// Remove the most recently added unit of `tier`.
    pub fn remove(&mut self, tier: Tier) -> Result<(), AgentError> {
        let index = self
            .items
            .iter()
            .rposition(|&t| t == tier)
            .ok_or(AgentError::NotCarried { tier })?;
        self.items.remove(index);
        Ok(())
    }

    /// Replace two units of `from` with one unit of `to`.
    ///
    /// Checked up front, so a failed transform leaves the inventory as it
    /// was.
    pub fn transform(&mut self, from: Tier, to: Tier) -> Result<(), AgentError> {
        let available = self.count(from);
        if available < 2 {
            return Err(AgentError::InsufficientUnits {
                tier: from,
                available,
            });
        }
        self.remove(from)?;
        self.remove(from)?;
        self.items.push(to);
        Ok(())
    }
}

impl From<Vec<Tier>> for Inventory {
    fn from(items: Vec<Tier>) -> Self {
        Self { items }
    }
}
