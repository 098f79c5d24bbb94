//! Low-health override that steers agents away from hazards.

use super::agent::AgentState;
use super::config::AgentConfig;
use super::types::Direction;
use crate::grid::{GridEnvironment, Position};

/// Candidate steps, scored in this order.
pub const RETREAT_STEPS: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Picks the safest neighboring step for a badly hurt agent.
pub struct TacticalRetreat;

impl TacticalRetreat {
    /// Direction to retreat in, or `None` if the agent is healthy enough or has nowhere to go.
    ///
    /// Each enterable neighbor (diagonals included) is scored by the summed doubled Manhattan
    /// distance from it to every hazard in the `(2 × retreat_radius + 1)²` window around the
    /// agent. The strictly highest score wins, so the first candidate wins ties. A diagonal
    /// winner is mapped to the nearest cardinal direction.
    pub fn direction<G: GridEnvironment + ?Sized>(
        agent: &AgentState,
        map: &G,
        config: &AgentConfig,
    ) -> Option<Direction> {
        if agent.health as f64 >= config.retreat_threshold() {
            return None;
        }

        let hazards = Self::nearby_hazards(agent.position, map, config.retreat_radius);

        let mut best: Option<((i32, i32), i32)> = None;
        for (dx, dy) in RETREAT_STEPS {
            let dest = agent.position.offset(dx, dy);
            if !map.is_walkable(dest) {
                continue;
            }
            let safety = Self::safety(dest, &hazards);
            if best.map_or(true, |(_, top)| safety > top) {
                best = Some(((dx, dy), safety));
            }
        }

        best.map(|((dx, dy), _)| Direction::nearest_cardinal(dx, dy))
    }

    /// Sum of `2 × manhattan(dest, hazard)` over `hazards`.
    pub fn safety(dest: Position, hazards: &[Position]) -> i32 {
        hazards.iter().map(|h| 2 * dest.manhattan(h)).sum()
    }

    fn nearby_hazards<G: GridEnvironment + ?Sized>(
        center: Position,
        map: &G,
        radius: i32,
    ) -> Vec<Position> {
        let mut hazards = Vec::new();
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let pos = center.offset(dx, dy);
                if map.is_hazard(pos) {
                    hazards.push(pos);
                }
            }
        }
        hazards
    }
}
