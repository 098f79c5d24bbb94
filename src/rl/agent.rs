//! Agent state carried between ticks.

use std::collections::{HashMap, VecDeque};

use super::config::AgentConfig;
use super::observation::StateKey;
use super::types::{seconds, AgentStatus, Direction, SimTime};
use crate::grid::Position;
use crate::Id;

/// State of a single simulated agent.
///
/// Every timer and cache is initialised at creation; nothing is attached lazily.
#[derive(Debug, Clone)]
pub struct AgentState {
    /// Unique identifier for this agent.
    pub id: Id,
    /// Current cell.
    pub position: Position,
    pub health: i32,
    pub max_health: i32,
    pub status: AgentStatus,
    /// Most recent positions, oldest first, capped at `history_len`.
    history: VecDeque<Position>,
    history_len: usize,
    /// Position recorded by the previous stuck check.
    pub last_position: Option<Position>,
    /// Accumulated time spent stuck; reset on real movement.
    pub stuck_time: SimTime,
    /// Accumulated time spent next to a hazard; reset once no hazard is adjacent.
    pub hazard_time: SimTime,
    /// Manhattan distance to the goal at the last reward computation.
    pub last_distance: Option<i32>,
    /// Transition awaiting its reward: encoded post-move state and attempted action.
    pub previous: Option<(StateKey, Direction)>,
    /// Number of hits taken per cell.
    pub observed_attacks: HashMap<Position, u32>,
    /// Ticks processed by the controller.
    pub age: u64,
}

impl AgentState {
    /// Creates a moving agent at full health.
    ///
    /// `goal` seeds the cached goal distance so the first progress reward is measured from
    /// the spawn cell.
    pub fn new(id: Id, position: Position, goal: Option<Position>, config: &AgentConfig) -> Self {
        Self {
            id,
            position,
            health: config.max_health,
            max_health: config.max_health,
            status: AgentStatus::Moving,
            history: VecDeque::with_capacity(config.history_len),
            history_len: config.history_len,
            last_position: None,
            stuck_time: seconds(0.0),
            hazard_time: seconds(0.0),
            last_distance: goal.map(|g| position.manhattan(&g)),
            previous: None,
            observed_attacks: HashMap::new(),
            age: 0,
        }
    }

    /// Appends a position to the history, evicting the oldest entry when full.
    pub fn record_position(&mut self, pos: Position) {
        if self.history_len == 0 {
            return;
        }
        while self.history.len() >= self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(pos);
    }

    pub fn history(&self) -> &VecDeque<Position> {
        &self.history
    }

    /// True if `pos` is among the remembered positions.
    pub fn visited_recently(&self, pos: Position) -> bool {
        self.history.contains(&pos)
    }

    /// Number of times `pos` appears in the history.
    pub fn visit_count(&self, pos: Position) -> usize {
        self.history.iter().filter(|p| **p == pos).count()
    }

    /// Applies external damage. Returns `true` if the hit was lethal.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health = (self.health - amount.max(0)).clamp(0, self.max_health);
        *self.observed_attacks.entry(self.position).or_insert(0) += 1;
        if self.health == 0 {
            self.status = AgentStatus::Eliminated;
            true
        } else {
            false
        }
    }

    /// Health as a fraction of max health in `[0, 1]`.
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0 {
            return 0.0;
        }
        self.health as f64 / self.max_health as f64
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
