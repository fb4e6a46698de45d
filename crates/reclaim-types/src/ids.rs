//! Type-safe identifier wrappers around `u64`.
//!
//! Robots and waste units carry strongly-typed IDs so the two can never be
//! mixed up at compile time. IDs are handed out sequentially by the world,
//! which makes their numeric order meaningful: the claim protocol breaks
//! distance ties in favour of the lower robot id.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw numeric identifier.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner numeric value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }

            /// The identifier that follows this one, or `None` on overflow.
            pub const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(raw) => Some(Self(raw)),
                    None => None,
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a robot agent.
    AgentId
}

define_id! {
    /// Unique identifier for a single waste unit on the grid or in an inventory.
    WasteId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_numerically() {
        assert!(AgentId::new(2) < AgentId::new(10));
        assert_eq!(AgentId::new(7).into_inner(), 7);
    }

    #[test]
    fn next_advances_and_stops_at_max() {
        assert_eq!(WasteId::new(4).next(), Some(WasteId::new(5)));
        assert_eq!(WasteId::new(u64::MAX).next(), None);
    }

    #[test]
    fn id_display_matches_raw() {
        assert_eq!(AgentId::new(42).to_string(), "42");
    }

    #[test]
    fn id_serializes_as_bare_number() {
        let json = serde_json::to_string(&WasteId::new(9)).ok();
        assert_eq!(json.as_deref(), Some("9"));
    }
}
