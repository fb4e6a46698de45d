//! Grid coordinates and patrol rectangles.
//!
//! The grid's origin is the south-west corner: `x` grows eastward towards the
//! disposal column and `y` grows northward. Coordinates are signed so that a
//! candidate step off the western or southern edge can be represented and
//! rejected instead of wrapping.

use serde::{Deserialize, Serialize};

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Column, increasing eastward.
    pub x: i32,
    /// Row, increasing northward.
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by `(dx, dy)`. Returns `None` on `i32` overflow.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(dy) else {
            return None;
        };
        Some(Self { x, y })
    }

    /// Manhattan distance to `other`.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Chebyshev (king-move) distance to `other`.
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive axis-aligned rectangle a robot must stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatrolRect {
    /// Westernmost column (inclusive).
    pub x_min: i32,
    /// Easternmost column (inclusive).
    pub x_max: i32,
    /// Southernmost row (inclusive).
    pub y_min: i32,
    /// Northernmost row (inclusive).
    pub y_max: i32,
}

impl PatrolRect {
    /// Create a rectangle. Returns `None` when a minimum exceeds its maximum.
    pub const fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Option<Self> {
        if x_min > x_max || y_min > y_max {
            return None;
        }
        Some(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// Whether `pos` lies inside the rectangle.
    pub const fn contains(&self, pos: Position) -> bool {
        self.contains_x(pos.x) && self.contains_y(pos.y)
    }

    /// Whether column `x` lies inside the rectangle's column span.
    pub const fn contains_x(&self, x: i32) -> bool {
        x >= self.x_min && x <= self.x_max
    }

    /// Whether row `y` lies inside the rectangle's row span.
    pub const fn contains_y(&self, y: i32) -> bool {
        y >= self.y_min && y <= self.y_max
    }

    /// Number of columns covered.
    pub const fn width(&self) -> u32 {
        self.x_max.abs_diff(self.x_min).saturating_add(1)
    }

    /// Number of rows covered.
    pub const fn height(&self) -> u32 {
        self.y_max.abs_diff(self.y_min).saturating_add(1)
    }

    /// The south-west corner, where robots start their sweep.
    pub const fn origin(&self) -> Position {
        Position::new(self.x_min, self.y_min)
    }
}

impl core::fmt::Display for PatrolRect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[x {}..={}, y {}..={}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        let a = Position::new(1, 1);
        let b = Position::new(4, -1);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(a.chebyshev(b), 3);
    }

    #[test]
    fn offset_overflow_is_none() {
        assert!(Position::new(i32::MAX, 0).offset(1, 0).is_none());
        assert_eq!(Position::new(2, 3).offset(-1, 1), Some(Position::new(1, 4)));
    }

    #[test]
    fn rect_rejects_inverted_bounds() {
        assert!(PatrolRect::new(3, 2, 0, 0).is_none());
        assert!(PatrolRect::new(0, 0, 5, 4).is_none());
    }

    #[test]
    fn rect_containment_is_inclusive() {
        let rect = PatrolRect::new(4, 9, 0, 2).unwrap();
        assert!(rect.contains(Position::new(4, 0)));
        assert!(rect.contains(Position::new(9, 2)));
        assert!(!rect.contains(Position::new(10, 2)));
        assert!(!rect.contains(Position::new(4, 3)));
        assert_eq!(rect.width(), 6);
        assert_eq!(rect.height(), 3);
        assert_eq!(rect.origin(), Position::new(4, 0));
    }
}
