//! Shaped reward for an agent's previous transition.
//!
//! Combines stalling and looping penalties, goal progress, hazard proximity, and terminal
//! bonuses into one scalar.

use super::agent::AgentState;
use super::config::AgentConfig;
use super::types::{seconds, AgentStatus, Direction};
use crate::grid::GridEnvironment;

/// Individual reward terms of one evaluation. Inactive terms are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardBreakdown {
    pub stuck: f64,
    pub extra_stuck: f64,
    pub loop_penalty: f64,
    pub progress: f64,
    pub hazard_adjacency: f64,
    pub sustained_hazard: f64,
    pub terminal: f64,
    /// Hazardous orthogonal neighbors counted this evaluation.
    pub adjacent_hazards: u32,
}

impl RewardBreakdown {
    pub fn total(&self) -> f64 {
        self.stuck
            + self.extra_stuck
            + self.loop_penalty
            + self.progress
            + self.hazard_adjacency
            + self.sustained_hazard
            + self.terminal
    }
}

/// Computes shaped rewards.
pub struct RewardComputer;

impl RewardComputer {
    /// Evaluates the reward of the agent's current situation.
    ///
    /// # Components
    ///
    /// 1. **Stuck**: `stuck_penalty × stuck_time` while stuck.
    /// 2. **Extra stuck**: `−extra_stuck_penalty` once stuck longer than the threshold.
    /// 3. **Loop**: `−loop_penalty × (k − 1)` when the current cell appears `k > 1` times
    ///    in the history.
    /// 4. **Progress**: `progress_weight × (previous distance − distance)` to the goal.
    /// 5. **Hazard adjacency**: `−hazard_adjacent_penalty` per hazardous orthogonal neighbor.
    /// 6. **Sustained hazard**: `−sustained_hazard_weight × hazard_time` once the time spent
    ///    next to hazards exceeds the threshold.
    /// 7. **Terminal**: `+reached_end_bonus` or `−eliminated_penalty`.
    ///
    /// Updates the agent's cached goal distance and hazard timer as a side effect.
    pub fn compute<G: GridEnvironment + ?Sized>(
        agent: &mut AgentState,
        map: &G,
        config: &AgentConfig,
    ) -> RewardBreakdown {
        let mut r = RewardBreakdown::default();
        let stuck_time = agent.stuck_time.value();

        // 1-2. Stalling
        if stuck_time > 0.0 {
            r.stuck = config.stuck_penalty * stuck_time;
        }
        if stuck_time > config.extra_stuck_threshold.value() {
            r.extra_stuck = -config.extra_stuck_penalty;
        }

        // 3. Looping
        let visits = agent.visit_count(agent.position);
        if visits > 1 {
            r.loop_penalty = -config.loop_penalty * (visits - 1) as f64;
        }

        // 4. Progress
        if let Some(goal) = map.end() {
            let distance = agent.position.manhattan(&goal);
            if let Some(previous) = agent.last_distance {
                r.progress = (previous - distance) as f64 * config.progress_weight;
            }
            agent.last_distance = Some(distance);
        }

        // 5. Hazard adjacency
        for dir in Direction::ALL {
            if map.is_hazard(dir.apply(agent.position)) {
                r.hazard_adjacency -= config.hazard_adjacent_penalty;
                r.adjacent_hazards += 1;
            }
        }

        // 6. Sustained hazard
        if r.adjacent_hazards > 0 {
            agent.hazard_time = agent.hazard_time + config.tick;
            if agent.hazard_time.value() > config.sustained_hazard_threshold.value() {
                r.sustained_hazard = -config.sustained_hazard_weight * agent.hazard_time.value();
            }
        } else {
            agent.hazard_time = seconds(0.0);
        }

        // 7. Terminal
        match agent.status {
            AgentStatus::ReachedEnd => r.terminal = config.reached_end_bonus,
            AgentStatus::Eliminated => r.terminal = -config.eliminated_penalty,
            AgentStatus::Moving | AgentStatus::Attacking => {}
        }

        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellType, GridMap, Position};
    use crate::rl::types::seconds;

    fn setup(pos: Position) -> (GridMap, AgentState, AgentConfig) {
        let map = GridMap::with_horizontal_path(11, 11, 10);
        let config = AgentConfig::default();
        let agent = AgentState::new("a".into(), pos, map.end(), &config);
        (map, agent, config)
    }

    #[test]
    fn idle_agent_on_open_ground_scores_zero() {
        let (map, mut agent, config) = setup(Position::new(2, 5));
        let r = RewardComputer::compute(&mut agent, &map, &config);
        assert_eq!(r.total(), 0.0);
        assert_eq!(agent.last_distance, Some(8));
    }

    #[test]
    fn progress_rewards_getting_closer() {
        let (map, mut agent, config) = setup(Position::new(2, 5));
        agent.position = Position::new(3, 5);
        let r = RewardComputer::compute(&mut agent, &map, &config);
        assert!((r.progress - 2.0).abs() < 1e-10);
        agent.position = Position::new(2, 4);
        let r = RewardComputer::compute(&mut agent, &map, &config);
        assert!((r.progress + 4.0).abs() < 1e-10);
        assert_eq!(agent.last_distance, Some(9));
    }

    #[test]
    fn stuck_terms() {
        let (map, mut agent, config) = setup(Position::new(2, 5));
        agent.stuck_time = seconds(0.5);
        let r = RewardComputer::compute(&mut agent, &map, &config);
        assert!((r.stuck + 5.0).abs() < 1e-10);
        assert_eq!(r.extra_stuck, 0.0);

        agent.stuck_time = seconds(1.5);
        let r = RewardComputer::compute(&mut agent, &map, &config);
        assert!((r.stuck + 15.0).abs() < 1e-10);
        assert_eq!(r.extra_stuck, -50.0);
        assert!((r.total() + 65.0).abs() < 1e-10);
    }

    #[test]
    fn loop_penalty_scales_with_repeats() {
        let (map, mut agent, config) = setup(Position::new(2, 5));
        for _ in 0..3 {
            agent.record_position(Position::new(2, 5));
        }
        let r = RewardComputer::compute(&mut agent, &map, &config);
        assert_eq!(r.loop_penalty, -60.0);
    }

    #[test]
    fn hazard_adjacency_and_sustained_penalty() {
        let (mut map, mut agent, config) = setup(Position::new(2, 5));
        map.set_cell(Position::new(2, 4), CellType::Structure);
        map.set_cell(Position::new(1, 5), CellType::Structure);
        // diagonal hazards do not count
        map.set_cell(Position::new(3, 6), CellType::Structure);

        let r = RewardComputer::compute(&mut agent, &map, &config);
        assert_eq!(r.adjacent_hazards, 2);
        assert_eq!(r.hazard_adjacency, -30.0);
        assert_eq!(r.sustained_hazard, 0.0);

        // 61 ticks of adjacency pushes the timer past one second
        let mut last = RewardBreakdown::default();
        for _ in 0..60 {
            last = RewardComputer::compute(&mut agent, &map, &config);
        }
        assert!(agent.hazard_time.value() > 1.0);
        assert!(last.sustained_hazard < -40.0);

        // leaving the hazard resets the timer
        agent.position = Position::new(6, 5);
        let r = RewardComputer::compute(&mut agent, &map, &config);
        assert_eq!(r.adjacent_hazards, 0);
        assert_eq!(r.sustained_hazard, 0.0);
        assert_eq!(agent.hazard_time.value(), 0.0);
    }

    #[test]
    fn terminal_bonuses() {
        let (map, mut agent, config) = setup(Position::new(2, 5));
        agent.status = AgentStatus::ReachedEnd;
        assert_eq!(RewardComputer::compute(&mut agent, &map, &config).terminal, 500.0);
        agent.status = AgentStatus::Eliminated;
        assert_eq!(RewardComputer::compute(&mut agent, &map, &config).terminal, -200.0);
    }

    #[test]
    fn no_goal_means_no_progress_term() {
        let map = GridMap::new(5, 5, 10);
        let config = AgentConfig::default();
        let mut agent = AgentState::new("a".into(), Position::new(1, 1), None, &config);
        let r = RewardComputer::compute(&mut agent, &map, &config);
        assert_eq!(r.progress, 0.0);
        assert_eq!(agent.last_distance, None);
    }
}
