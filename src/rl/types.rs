//! Core types shared by the learning components.
//!
//! Defines the cardinal move set, agent lifecycle states, and the simulated-time
//! quantity used by the stuck and hazard timers.

use std::fmt;

use qtty::{Quantity, Second};

use crate::grid::Position;

/// Simulated time, measured in seconds of game clock.
pub type SimTime = Quantity<Second>;

/// Numeric identifier of an action as stored in the learning table (0..=3).
pub type ActionId = u8;

/// One of the four cardinal moves.
///
/// The declaration order is significant: it is the enumeration order used for legal-action
/// listing and for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Returns the table identifier of this direction.
    pub fn id(&self) -> ActionId {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Inverse of [`Direction::id`].
    pub fn from_id(id: ActionId) -> Option<Direction> {
        Self::ALL.get(id as usize).copied()
    }

    /// Grid displacement `(dx, dy)`; `y` grows downward.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Destination cell when moving from `pos` in this direction.
    pub fn apply(&self, pos: Position) -> Position {
        let (dx, dy) = self.offset();
        pos.offset(dx, dy)
    }

    /// Cardinal direction closest to an arbitrary unit step, by `|Δx| + |Δy|`.
    ///
    /// Ties resolve to the earliest direction in [`Direction::ALL`].
    pub fn nearest_cardinal(dx: i32, dy: i32) -> Direction {
        let mut best = Direction::Up;
        let mut best_dist = i32::MAX;
        for dir in Self::ALL {
            let (cx, cy) = dir.offset();
            let dist = (cx - dx).abs() + (cy - dy).abs();
            if dist < best_dist {
                best_dist = dist;
                best = dir;
            }
        }
        best
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Right => write!(f, "right"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
        }
    }
}

/// Lifecycle of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentStatus {
    Moving,
    /// Reserved for melee behaviour; never entered by the controller.
    Attacking,
    Eliminated,
    ReachedEnd,
}

impl AgentStatus {
    /// Terminal agents are removed from the simulation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Eliminated | AgentStatus::ReachedEnd)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Moving => write!(f, "moving"),
            AgentStatus::Attacking => write!(f, "attacking"),
            AgentStatus::Eliminated => write!(f, "eliminated"),
            AgentStatus::ReachedEnd => write!(f, "reached_end"),
        }
    }
}

/// Shorthand for a simulated-time quantity in seconds.
pub fn seconds(value: f64) -> SimTime {
    Quantity::new(value)
}
