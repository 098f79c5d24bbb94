//! Discrete state encoding for the learning table.
//!
//! Turns an agent's situation into a short, hashable tuple of small integers. The encoding
//! depends only on position, health and map layout, so identical situations always share a
//! table row.

use std::fmt;

use super::config::AgentConfig;
use crate::grid::{GridEnvironment, Position};

/// Upper clip of the row-distance feature.
pub const MAX_ROW_DISTANCE: i32 = 5;
/// Upper clip of the danger feature.
pub const MAX_DANGER: i32 = 10;
/// Number of health buckets above zero.
pub const HEALTH_BUCKETS: i32 = 10;

/// Row key into the learning table.
///
/// Features, in order, each present only when its inputs exist:
///
/// | # | Feature | Range | Present when |
/// |---|---------|-------|--------------|
/// | 1 | vertical distance to the last route point | `0..=5` | the map has a route |
/// | 2 | danger from nearby hazards | `0..=10` | always |
/// | 3 | horizontal goal direction | `-1 / +1` | the map has a goal |
/// | 4 | vertical goal direction | `-1 / +1` | the map has a goal |
/// | 5 | health bucket | `0..=10` | always |
///
/// Omitted features change the tuple length, so keys from differently equipped maps never
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StateKey(Vec<i8>);

impl StateKey {
    pub fn new(features: Vec<i8>) -> Self {
        Self(features)
    }

    pub fn features(&self) -> &[i8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<i8>> for StateKey {
    fn from(features: Vec<i8>) -> Self {
        Self(features)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

/// Builds [`StateKey`]s.
pub struct StateEncoder;

impl StateEncoder {
    /// Encodes the situation of an agent at `position` with `health`.
    pub fn encode<G: GridEnvironment + ?Sized>(
        position: Position,
        health: i32,
        map: &G,
        config: &AgentConfig,
    ) -> StateKey {
        let mut features = Vec::with_capacity(5);

        if let Some(last) = map.path_points().last() {
            let row_distance = (position.y - last.y).abs().min(MAX_ROW_DISTANCE);
            features.push(row_distance as i8);
        }

        features.push(Self::danger_level(position, map, config.danger_radius) as i8);

        if let Some(goal) = map.end() {
            features.push(if goal.x > position.x { 1 } else { -1 });
            features.push(if goal.y > position.y { 1 } else { -1 });
        }

        features.push(Self::health_bucket(health, config.max_health) as i8);

        StateKey(features)
    }

    /// Inverse-distance-weighted hazard count over the `(2r+1)²` square around `position`,
    /// scaled by ten, truncated and clipped to `0..=10`.
    pub fn danger_level<G: GridEnvironment + ?Sized>(
        position: Position,
        map: &G,
        radius: i32,
    ) -> i32 {
        let mut danger = 0.0;
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if map.is_hazard(position.offset(dx, dy)) {
                    danger += 1.0 / (dx.abs() + dy.abs() + 1) as f64;
                }
            }
        }
        ((danger * 10.0) as i32).clamp(0, MAX_DANGER)
    }

    /// `floor(health / max_health * 10)`, clipped to `0..=10`.
    pub fn health_bucket(health: i32, max_health: i32) -> i32 {
        if max_health <= 0 {
            return 0;
        }
        let fraction = health as f64 / max_health as f64;
        ((fraction * HEALTH_BUCKETS as f64).floor() as i32).clamp(0, HEALTH_BUCKETS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellType, GridMap};

    fn open_map() -> GridMap {
        GridMap::with_horizontal_path(11, 11, 10)
    }

    #[test]
    fn full_feature_tuple() {
        let map = open_map();
        let cfg = AgentConfig::default();
        // route ends at (10, 5)
        let key = StateEncoder::encode(Position::new(2, 1), 100, &map, &cfg);
        assert_eq!(key.features(), &[4, 0, 1, 1, 10]);
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut map = open_map();
        map.place_structure(Position::new(3, 3));
        let cfg = AgentConfig::default();
        for y in 0..11 {
            for x in 0..11 {
                let p = Position::new(x, y);
                let a = StateEncoder::encode(p, 57, &map, &cfg);
                let b = StateEncoder::encode(p, 57, &map, &cfg);
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn danger_worked_example() {
        let mut map = GridMap::new(11, 11, 10);
        map.set_cell(Position::new(6, 5), CellType::Structure);
        map.set_cell(Position::new(5, 6), CellType::Structure);
        assert_eq!(StateEncoder::danger_level(Position::new(5, 5), &map, 2), 10);
    }

    #[test]
    fn danger_is_weighted_by_distance() {
        let mut map = GridMap::new(11, 11, 10);
        map.set_cell(Position::new(7, 5), CellType::Structure);
        // 1 / 3 * 10 = 3.33 → 3
        assert_eq!(StateEncoder::danger_level(Position::new(5, 5), &map, 2), 3);
        map.set_cell(Position::new(7, 7), CellType::Structure);
        // (1/3 + 1/5) * 10 = 5.33 → 5
        assert_eq!(StateEncoder::danger_level(Position::new(5, 5), &map, 2), 5);
    }

    #[test]
    fn danger_is_clipped() {
        let mut map = GridMap::new(5, 5, 10);
        for y in 0..5 {
            for x in 0..5 {
                if (x, y) != (2, 2) {
                    map.set_cell(Position::new(x, y), CellType::Structure);
                }
            }
        }
        assert_eq!(StateEncoder::danger_level(Position::new(2, 2), &map, 2), MAX_DANGER);
    }

    #[test]
    fn features_omitted_without_route_or_goal() {
        let map = GridMap::new(5, 5, 10);
        let key = StateEncoder::encode(Position::new(1, 1), 100, &map, &AgentConfig::default());
        assert_eq!(key.features(), &[0, 10]);
    }

    #[test]
    fn goal_direction_is_negative_when_not_strictly_ahead() {
        let map = open_map();
        let key = StateEncoder::encode(Position::new(10, 5), 100, &map, &AgentConfig::default());
        assert_eq!(key.features(), &[0, 0, -1, -1, 10]);
    }

    #[test]
    fn health_buckets() {
        assert_eq!(StateEncoder::health_bucket(100, 100), 10);
        assert_eq!(StateEncoder::health_bucket(99, 100), 9);
        assert_eq!(StateEncoder::health_bucket(29, 100), 2);
        assert_eq!(StateEncoder::health_bucket(0, 100), 0);
    }

    #[test]
    fn display_formats_as_tuple() {
        assert_eq!(StateKey::new(vec![1, -1, 10]).to_string(), "(1, -1, 10)");
    }
}
