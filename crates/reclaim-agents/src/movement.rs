//! Zone-constrained movement and deadlock recovery.
//!
//! Robots cover their patrol rectangle with a boustrophedon sweep: advance
//! along the primary axis, and on reaching the rectangle's edge flip that
//! direction and take one step along the secondary axis (flipping it too
//! when it is also at an edge).
//!
//! A move onto a cell holding another robot fails and bumps the stuck
//! counter. Once the counter exceeds the threshold, movement decisions are
//! replaced by the first free recovery cell: two cells back against the
//! sweep direction, one north, one south, then optionally the diagonals.
//! The sweep continues in the direction of the escape.
//!
//! Everything here is pure. Functions take the current [`MotionState`] and
//! return the state to adopt, leaving commit to the caller once the
//! arbitrator's verdict is known.

use reclaim_types::{PatrolRect, Position};

use crate::config::MovementMode;
use crate::knowledge::Knowledge;

/// Persisted sweep directions and stuck counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionState {
    /// East (+1) or west (-1).
    pub dir_x: i32,
    /// North (+1) or south (-1).
    pub dir_y: i32,
    /// Consecutive failed moves.
    pub stuck_counter: u32,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            dir_x: 1,
            dir_y: 1,
            stuck_counter: 0,
        }
    }
}

impl MotionState {
    /// State after a committed move.
    #[must_use]
    pub const fn succeeded(self) -> Self {
        Self {
            stuck_counter: 0,
            ..self
        }
    }

    /// State after a failed move. The counter saturates instead of wrapping.
    #[must_use]
    pub const fn failed(self) -> Self {
        Self {
            stuck_counter: self.stuck_counter.saturating_add(1),
            ..self
        }
    }

    /// Both directions reversed.
    #[must_use]
    pub const fn inverted(self) -> Self {
        Self {
            dir_x: flip(self.dir_x),
            dir_y: flip(self.dir_y),
            ..self
        }
    }

    /// Whether recovery should take over.
    pub const fn is_stuck(&self, threshold: u32) -> bool {
        self.stuck_counter > threshold
    }
}

const fn flip(dir: i32) -> i32 {
    if dir < 0 { 1 } else { -1 }
}

/// A movement decision: where to go (or `None` to stay) and the motion
/// state to adopt if the move is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Destination, or `None` when no legal move exists.
    pub to: Option<Position>,
    /// State to adopt on success, or on staying.
    pub motion: MotionState,
}

/// One axis of the sweep: coordinate, direction, inclusive span.
#[derive(Clone, Copy)]
struct Axis {
    at: i32,
    dir: i32,
    lo: i32,
    hi: i32,
}

impl Axis {
    fn advanced(self) -> Option<i32> {
        self.at
            .checked_add(self.dir)
            .filter(|next| (self.lo..=self.hi).contains(next))
    }
}

/// Next sweep step inside `rect`.
///
/// If the computed destination is outside the rectangle, the move is
/// rejected and both directions are inverted.
pub fn sweep(pos: Position, motion: MotionState, rect: &PatrolRect, mode: MovementMode) -> Step {
    let x = Axis {
        at: pos.x,
        dir: motion.dir_x,
        lo: rect.x_min,
        hi: rect.x_max,
    };
    let y = Axis {
        at: pos.y,
        dir: motion.dir_y,
        lo: rect.y_min,
        hi: rect.y_max,
    };
    let (primary, secondary) = match mode {
        MovementMode::Sweep2d => (x, y),
        MovementMode::SweepVertical => (y, x),
    };

    let (p, s, dp, ds) = boustrophedon(primary, secondary);
    let (to, dir_x, dir_y) = match mode {
        MovementMode::Sweep2d => (Position::new(p, s), dp, ds),
        MovementMode::SweepVertical => (Position::new(s, p), ds, dp),
    };

    let next = MotionState {
        dir_x,
        dir_y,
        ..motion
    };
    if to == pos {
        return Step {
            to: None,
            motion: next,
        };
    }
    if !rect.contains(to) {
        return Step {
            to: None,
            motion: motion.inverted(),
        };
    }
    Step {
        to: Some(to),
        motion: next,
    }
}

/// Returns `(primary, secondary, primary_dir, secondary_dir)` after one
/// sweep step.
fn boustrophedon(primary: Axis, secondary: Axis) -> (i32, i32, i32, i32) {
    if let Some(p) = primary.advanced() {
        return (p, secondary.at, primary.dir, secondary.dir);
    }
    let turned = Axis {
        dir: flip(primary.dir),
        ..primary
    };
    let mut side = secondary;
    if side.advanced().is_none() {
        side.dir = flip(side.dir);
    }
    if let Some(s) = side.advanced() {
        return (primary.at, s, turned.dir, side.dir);
    }
    // Single-row (or single-column) rectangle: head back the other way.
    let p = turned.advanced().unwrap_or(primary.at);
    (p, secondary.at, turned.dir, side.dir)
}

/// A vertical sidestep, trying the current north/south direction first.
///
/// Returns the destination and the motion state with `dir_y` set to the
/// direction taken.
pub fn vertical_dodge(knowledge: &Knowledge) -> Option<(Position, MotionState)> {
    let motion = knowledge.motion;
    [motion.dir_y, flip(motion.dir_y)]
        .into_iter()
        .find_map(|dy| {
            let to = knowledge.position.offset(0, dy)?;
            knowledge
                .can_enter(to)
                .then_some((to, MotionState { dir_y: dy, ..motion }))
        })
}

/// Recovery offsets in preference order.
fn recovery_offsets(knowledge: &Knowledge) -> Vec<(i32, i32)> {
    let motion = knowledge.motion;
    let retreat = match knowledge.movement {
        MovementMode::Sweep2d => (motion.dir_x.saturating_mul(-2), 0),
        MovementMode::SweepVertical => (0, motion.dir_y.saturating_mul(-2)),
    };
    let mut offsets = vec![retreat, (0, 1), (0, -1)];
    if knowledge.tuning.diagonal_recovery {
        offsets.extend([(1, 1), (-1, 1), (1, -1), (-1, -1)]);
    }
    offsets
}

/// The first recovery cell the robot may enter, with the sweep directions
/// turned toward the escape.
pub fn recovery(knowledge: &Knowledge) -> Option<(Position, MotionState)> {
    let motion = knowledge.motion;
    recovery_offsets(knowledge).into_iter().find_map(|(dx, dy)| {
        let to = knowledge.position.offset(dx, dy)?;
        knowledge.can_enter(to).then_some((
            to,
            MotionState {
                dir_x: steer(dx, motion.dir_x),
                dir_y: steer(dy, motion.dir_y),
                ..motion
            },
        ))
    })
}

const fn steer(offset: i32, current: i32) -> i32 {
    if offset == 0 { current } else { offset.signum() }
}

/// One greedy step from `from` toward `target`: close the column gap first,
/// then the row gap. Falls back to the other axis when the preferred cell
/// cannot be entered.
pub fn step_toward(knowledge: &Knowledge, target: Position) -> Option<Position> {
    let from = knowledge.position;
    let dx = target.x.saturating_sub(from.x).signum();
    let dy = target.y.saturating_sub(from.y).signum();
    let horizontal = (dx != 0).then(|| from.offset(dx, 0)).flatten();
    let vertical = (dy != 0).then(|| from.offset(0, dy)).flatten();
    [horizontal, vertical]
        .into_iter()
        .flatten()
        .find(|&to| knowledge.can_enter(to))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rect() -> PatrolRect {
        PatrolRect::new(0, 2, 0, 2).unwrap()
    }

    #[test]
    fn sweep_advances_along_row() {
        let step = sweep(
            Position::new(0, 0),
            MotionState::default(),
            &rect(),
            MovementMode::Sweep2d,
        );
        assert_eq!(step.to, Some(Position::new(1, 0)));
        assert_eq!(step.motion.dir_x, 1);
    }

    #[test]
    fn sweep_turns_at_row_end() {
        let step = sweep(
            Position::new(2, 0),
            MotionState::default(),
            &rect(),
            MovementMode::Sweep2d,
        );
        assert_eq!(step.to, Some(Position::new(2, 1)));
        assert_eq!(step.motion.dir_x, -1);
        assert_eq!(step.motion.dir_y, 1);
    }

    #[test]
    fn sweep_flips_secondary_at_corner() {
        let step = sweep(
            Position::new(2, 2),
            MotionState::default(),
            &rect(),
            MovementMode::Sweep2d,
        );
        assert_eq!(step.to, Some(Position::new(2, 1)));
        assert_eq!(step.motion.dir_x, -1);
        assert_eq!(step.motion.dir_y, -1);
    }

    #[test]
    fn sweep_covers_whole_rectangle() {
        let rect = rect();
        let mut pos = Position::new(0, 0);
        let mut motion = MotionState::default();
        let mut visited = std::collections::BTreeSet::from([pos]);
        for _ in 0..8 {
            let step = sweep(pos, motion, &rect, MovementMode::Sweep2d);
            pos = step.to.unwrap();
            motion = step.motion;
            visited.insert(pos);
        }
        assert_eq!(visited.len(), 9);
    }

    #[test]
    fn vertical_sweep_runs_along_columns() {
        let step = sweep(
            Position::new(0, 0),
            MotionState::default(),
            &rect(),
            MovementMode::SweepVertical,
        );
        assert_eq!(step.to, Some(Position::new(0, 1)));
        let turn = sweep(
            Position::new(0, 2),
            MotionState::default(),
            &rect(),
            MovementMode::SweepVertical,
        );
        assert_eq!(turn.to, Some(Position::new(1, 2)));
        assert_eq!(turn.motion.dir_y, -1);
    }

    #[test]
    fn single_row_rectangle_reverses() {
        let rect = PatrolRect::new(0, 3, 0, 0).unwrap();
        let step = sweep(Position::new(3, 0), MotionState::default(), &rect, MovementMode::Sweep2d);
        assert_eq!(step.to, Some(Position::new(2, 0)));
        assert_eq!(step.motion.dir_x, -1);
    }

    #[test]
    fn outside_rectangle_inverts_directions() {
        let rect = PatrolRect::new(5, 7, 0, 2).unwrap();
        let step = sweep(Position::new(1, 1), MotionState::default(), &rect, MovementMode::Sweep2d);
        assert_eq!(step.to, None);
        assert_eq!(step.motion.dir_x, -1);
        assert_eq!(step.motion.dir_y, -1);
    }

    #[test]
    fn counter_saturates() {
        let motion = MotionState {
            stuck_counter: u32::MAX,
            ..MotionState::default()
        };
        assert_eq!(motion.failed().stuck_counter, u32::MAX);
        assert_eq!(motion.succeeded().stuck_counter, 0);
        assert!(motion.is_stuck(5));
    }
}
