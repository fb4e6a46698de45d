//! Static zone layout and patrol partitioning.
//!
//! The grid is split west to east into three equal-width zones of
//! `zone_width = width / 3` columns; any remainder widens zone 3. The
//! easternmost column is the disposal column.
//!
//! Each tier's territory is its own zone plus the hand-off column of the tier
//! below it, so every producer's drop column is the western edge of the next
//! tier's territory:
//!
//! | Tier   | Columns                          |
//! |--------|----------------------------------|
//! | green  | `0 ..= zw - 1`                   |
//! | yellow | `zw - 1 ..= 2*zw - 1`            |
//! | red    | `2*zw - 1 ..= width - 1`         |
//!
//! Territories are cut into horizontal strips, one per robot of the tier.

use reclaim_types::{PatrolRect, Position, Tier, ZoneKind};

use crate::error::WorldError;

/// Zone boundaries for a grid of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneLayout {
    width: i32,
    height: i32,
    zone_width: i32,
}

impl ZoneLayout {
    /// Compute the layout for a `width x height` grid.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::ZeroSized { width, height });
        }
        if width < 3 {
            return Err(WorldError::TooNarrow { width });
        }
        let w = i32::try_from(width).map_err(|_e| WorldError::DimensionOverflow { value: width })?;
        let h =
            i32::try_from(height).map_err(|_e| WorldError::DimensionOverflow { value: height })?;
        let zone_width = w.checked_div(3).ok_or(WorldError::TooNarrow { width })?;
        Ok(Self {
            width: w,
            height: h,
            zone_width,
        })
    }

    /// Columns per zone.
    pub const fn zone_width(&self) -> i32 {
        self.zone_width
    }

    /// Grid width.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// The disposal column.
    pub const fn disposal_column(&self) -> i32 {
        self.width.saturating_sub(1)
    }

    /// Zone of column `x`.
    pub const fn zone_of_column(&self, x: i32) -> ZoneKind {
        if x >= self.disposal_column() {
            ZoneKind::Disposal
        } else if x < self.zone_width {
            ZoneKind::Z1
        } else if x < self.zone_width.saturating_mul(2) {
            ZoneKind::Z2
        } else {
            ZoneKind::Z3
        }
    }

    /// Zone of the cell at `pos`.
    pub const fn zone_of(&self, pos: Position) -> ZoneKind {
        self.zone_of_column(pos.x)
    }

    /// The column on which robots of `tier` hand their product over.
    ///
    /// For red this is the disposal column.
    pub const fn boundary_column(&self, tier: Tier) -> i32 {
        match tier {
            Tier::Green => self.zone_width.saturating_sub(1),
            Tier::Yellow => self.zone_width.saturating_mul(2).saturating_sub(1),
            Tier::Red => self.disposal_column(),
        }
    }

    /// Inclusive `(x_min, x_max)` of the territory robots of `tier` patrol.
    pub const fn territory_columns(&self, tier: Tier) -> (i32, i32) {
        match tier {
            Tier::Green => (0, self.boundary_column(Tier::Green)),
            Tier::Yellow => (
                self.boundary_column(Tier::Green),
                self.boundary_column(Tier::Yellow),
            ),
            Tier::Red => (
                self.boundary_column(Tier::Yellow),
                self.boundary_column(Tier::Red),
            ),
        }
    }

    /// Split the territory of `tier` into `count` horizontal strips.
    ///
    /// Strips are contiguous and disjoint, ordered south to north. When the
    /// height does not divide evenly, the first strips get one extra row.
    pub fn patrol_rects(&self, tier: Tier, count: u32) -> Result<Vec<PatrolRect>, WorldError> {
        let height = self.height.unsigned_abs();
        if count > height {
            return Err(WorldError::TooManyAgents {
                tier,
                count,
                height,
            });
        }
        let Some(base) = height.checked_div(count) else {
            return Ok(Vec::new());
        };
        let remainder = height.checked_rem(count).unwrap_or(0);
        let (x_min, x_max) = self.territory_columns(tier);

        let mut rects = Vec::new();
        let mut y_min: u32 = 0;
        for strip in 0..count {
            let rows = if strip < remainder {
                base.saturating_add(1)
            } else {
                base
            };
            let y_max = y_min.saturating_add(rows).saturating_sub(1);
            let lo = i32::try_from(y_min)
                .map_err(|_e| WorldError::DimensionOverflow { value: y_min })?;
            let hi = i32::try_from(y_max)
                .map_err(|_e| WorldError::DimensionOverflow { value: y_max })?;
            if let Some(rect) = PatrolRect::new(x_min, x_max, lo, hi) {
                rects.push(rect);
            }
            y_min = y_min.saturating_add(rows);
        }
        Ok(rects)
    }

    /// Every cell of the zone waste of `tier` is seeded into.
    ///
    /// Red waste never starts on the disposal column.
    pub fn home_cells(&self, tier: Tier) -> Vec<Position> {
        let zone = tier.home_zone();
        (0..self.width)
            .filter(|&x| self.zone_of_column(x) == zone)
            .flat_map(|x| (0..self.height).map(move |y| Position::new(x, y)))
            .collect()
    }
}
