//! Cell classification.

use std::fmt;

/// Classification of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Empty,
    Path,
    Obstacle,
    Start,
    End,
    /// A defensive structure. Structures both block movement and are hazardous to stand near.
    Structure,
}

impl CellType {
    /// True for cells agents are penalized for approaching.
    pub fn is_hazard(&self) -> bool {
        matches!(self, CellType::Structure)
    }

    /// True for cells an agent can never enter.
    pub fn blocks_movement(&self) -> bool {
        matches!(self, CellType::Obstacle | CellType::Structure)
    }

    /// ASCII glyph used by [`GridMap::parse`](super::GridMap::parse).
    pub fn glyph(&self) -> char {
        match self {
            CellType::Empty => '.',
            CellType::Path => '-',
            CellType::Obstacle => '#',
            CellType::Start => 'S',
            CellType::End => 'E',
            CellType::Structure => 'T',
        }
    }

    pub fn from_glyph(c: char) -> Option<Self> {
        match c {
            '.' => Some(CellType::Empty),
            '-' => Some(CellType::Path),
            '#' => Some(CellType::Obstacle),
            'S' => Some(CellType::Start),
            'E' => Some(CellType::End),
            'T' => Some(CellType::Structure),
            _ => None,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellType::Empty => write!(f, "empty"),
            CellType::Path => write!(f, "path"),
            CellType::Obstacle => write!(f, "obstacle"),
            CellType::Start => write!(f, "start"),
            CellType::End => write!(f, "end"),
            CellType::Structure => write!(f, "structure"),
        }
    }
}
