//! Per-agent tick state machine.

use std::fmt;

use tracing::{debug, info};

use super::action_space::ActionSpace;
use super::agent::AgentState;
use super::config::AgentConfig;
use super::learner::QLearner;
use super::observation::StateEncoder;
use super::retreat::TacticalRetreat;
use super::reward::RewardComputer;
use super::stuck::{StuckCheck, StuckDetector};
use super::types::{AgentStatus, Direction};
use crate::grid::{GridEnvironment, Position};
use crate::Id;

/// What a tick did, as reported to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Moving,
    /// The low-health override chose the move; no learning happened.
    Retreating,
    Eliminated,
    ReachedEnd,
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickOutcome::Eliminated | TickOutcome::ReachedEnd)
    }
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickOutcome::Moving => write!(f, "moving"),
            TickOutcome::Retreating => write!(f, "retreating"),
            TickOutcome::Eliminated => write!(f, "eliminated"),
            TickOutcome::ReachedEnd => write!(f, "reached_end"),
        }
    }
}

/// Drives one agent through the grid, learning into a shared [`QLearner`].
///
/// # Lifecycle
///
/// `Moving` until either the goal cell is entered (`ReachedEnd`) or the agent is destroyed
/// or stalls out (`Eliminated`). Terminal agents ignore further ticks.
#[derive(Debug, Clone)]
pub struct AgentController {
    state: AgentState,
    config: AgentConfig,
}

impl AgentController {
    /// Spawns a controller for an agent at `position`.
    pub fn new<G: GridEnvironment + ?Sized>(
        id: Id,
        position: Position,
        map: &G,
        config: AgentConfig,
    ) -> Self {
        let state = AgentState::new(id, position, map.end(), &config);
        Self { state, config }
    }

    /// Wraps an existing agent state.
    pub fn from_state(state: AgentState, config: AgentConfig) -> Self {
        Self { state, config }
    }

    pub fn id(&self) -> &str {
        &self.state.id
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn status(&self) -> AgentStatus {
        self.state.status
    }

    /// Applies external damage. Returns `true` if the hit was lethal.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.state.take_damage(amount)
    }

    /// Advances the agent by one tick.
    ///
    /// 1. Stuck check; elimination ends the tick.
    /// 2. Tactical retreat; a retreat move ends the tick without learning, reaching the
    ///    goal if it lands there.
    /// 3. Encode the state and list legal moves.
    /// 4. With no legal move, try the escape move and end the tick.
    /// 5. Pick a move with the learner's policy.
    /// 6. Reward the cached transition and update the table.
    /// 7. Execute the move if its destination is legal and not recently visited.
    /// 8. Cache the post-move state with the attempted move.
    /// 9. Detect the goal or death.
    pub fn tick<G: GridEnvironment + ?Sized>(
        &mut self,
        map: &G,
        learner: &mut QLearner,
    ) -> TickOutcome {
        match self.state.status {
            AgentStatus::Eliminated => return TickOutcome::Eliminated,
            AgentStatus::ReachedEnd => return TickOutcome::ReachedEnd,
            AgentStatus::Moving | AgentStatus::Attacking => {}
        }
        self.state.age += 1;

        // 1.
        let stuck = StuckDetector::check(&mut self.state, map, learner, &self.config);
        if stuck == StuckCheck::Eliminated {
            return TickOutcome::Eliminated;
        }

        // 2.
        if let Some(dir) = TacticalRetreat::direction(&self.state, map, &self.config) {
            let moved = self.execute(dir, map);
            debug!(
                agent = %self.state.id,
                health = self.state.health,
                direction = %dir,
                moved,
                "retreating"
            );
            if moved && map.is_goal(self.state.position) {
                return self.reach_goal();
            }
            return TickOutcome::Retreating;
        }

        // 3.
        let position = self.state.position;
        let state = StateEncoder::encode(position, self.state.health, map, &self.config);
        let legal = ActionSpace::legal_actions(position, map);

        // 4.
        if legal.is_empty() {
            if let Some(dir) = ActionSpace::escape_direction(position, map) {
                self.state.position = dir.apply(position);
            }
            return TickOutcome::Moving;
        }

        // 5.
        let Some(action) = learner.choose_action(&state, &legal) else {
            return TickOutcome::Moving;
        };

        // 6.
        if let Some((prev_state, prev_action)) = self.state.previous.take() {
            let reward = RewardComputer::compute(&mut self.state, map, &self.config).total();
            learner.update(&prev_state, prev_action, reward, &state, &legal);
        }

        // 7.
        self.execute(action, map);

        // 8.
        let next_state =
            StateEncoder::encode(self.state.position, self.state.health, map, &self.config);
        self.state.previous = Some((next_state, action));

        // 9.
        if map.is_goal(self.state.position) {
            return self.reach_goal();
        }
        if self.state.health <= 0 {
            self.state.status = AgentStatus::Eliminated;
            return TickOutcome::Eliminated;
        }

        TickOutcome::Moving
    }

    fn reach_goal(&mut self) -> TickOutcome {
        self.state.status = AgentStatus::ReachedEnd;
        info!(agent = %self.state.id, ticks = self.state.age, "agent reached the goal");
        TickOutcome::ReachedEnd
    }

    /// Moves one cell in `dir` if the destination is legal and not in the history.
    fn execute<G: GridEnvironment + ?Sized>(&mut self, dir: Direction, map: &G) -> bool {
        let dest = dir.apply(self.state.position);
        let legal = ActionSpace::is_legal(self.state.position, dir, map);
        if legal && !self.state.visited_recently(dest) {
            self.state.position = dest;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridMap;
    use crate::rl::config::LearningConfig;

    fn greedy_learner() -> QLearner {
        let config = LearningConfig {
            epsilon: 0.0,
            epsilon_min: 0.0,
            ..LearningConfig::default()
        };
        QLearner::new(&config, 0).unwrap()
    }

    fn corridor() -> GridMap {
        GridMap::parse("S---E", 10).unwrap()
    }

    #[test]
    fn walks_the_corridor_and_reaches_the_goal() {
        let map = corridor();
        let mut learner = greedy_learner();
        let mut ctrl =
            AgentController::new("c".into(), Position::new(0, 0), &map, AgentConfig::default());

        let outcomes: Vec<_> = (0..4).map(|_| ctrl.tick(&map, &mut learner)).collect();
        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Moving,
                TickOutcome::Moving,
                TickOutcome::Moving,
                TickOutcome::ReachedEnd
            ]
        );
        assert_eq!(ctrl.state().position, Position::new(4, 0));
        assert_eq!(ctrl.status(), AgentStatus::ReachedEnd);
        // progress toward the goal was rewarded
        assert!(!learner.table().is_empty());
    }

    #[test]
    fn terminal_agents_are_not_touched() {
        let map = corridor();
        let mut learner = greedy_learner();
        let mut ctrl =
            AgentController::new("c".into(), Position::new(1, 0), &map, AgentConfig::default());
        ctrl.state_mut().status = AgentStatus::Eliminated;
        assert_eq!(ctrl.tick(&map, &mut learner), TickOutcome::Eliminated);
        assert_eq!(ctrl.state().age, 0);
        assert_eq!(ctrl.state().position, Position::new(1, 0));
        assert!(ctrl.state().history().is_empty());
    }

    #[test]
    fn move_into_recent_cell_is_a_no_op() {
        let map = corridor();
        let mut learner = greedy_learner();
        let mut ctrl =
            AgentController::new("c".into(), Position::new(1, 0), &map, AgentConfig::default());
        ctrl.state_mut().record_position(Position::new(2, 0));

        assert_eq!(ctrl.tick(&map, &mut learner), TickOutcome::Moving);
        assert_eq!(ctrl.state().position, Position::new(1, 0));
        let (_, action) = ctrl.state().previous.clone().unwrap();
        assert_eq!(action, Direction::Right);
    }

    #[test]
    fn retreat_moves_without_learning() {
        let map = GridMap::new(7, 7, 10);
        let mut learner = greedy_learner();
        let mut ctrl =
            AgentController::new("c".into(), Position::new(3, 3), &map, AgentConfig::default());
        ctrl.state_mut().health = 20;

        assert_eq!(ctrl.tick(&map, &mut learner), TickOutcome::Retreating);
        assert_eq!(ctrl.state().position, Position::new(3, 4));
        assert!(learner.table().is_empty());
        assert!(ctrl.state().previous.is_none());
    }

    #[test]
    fn boxed_in_agent_stays_put() {
        let map = GridMap::parse(
            "
            .#.
            #.#
            .#.
            ",
            10,
        )
        .unwrap();
        let mut learner = greedy_learner();
        let mut ctrl =
            AgentController::new("c".into(), Position::new(1, 1), &map, AgentConfig::default());
        assert_eq!(ctrl.tick(&map, &mut learner), TickOutcome::Moving);
        assert_eq!(ctrl.state().position, Position::new(1, 1));
        assert!(ctrl.state().previous.is_none());
        assert!(learner.table().is_empty());
    }

    #[test]
    fn zero_health_is_detected_at_end_of_tick() {
        let map = GridMap::new(5, 5, 10);
        let mut learner = greedy_learner();
        let config = AgentConfig {
            retreat_health_fraction: 0.0,
            ..AgentConfig::default()
        };
        let mut ctrl = AgentController::new("c".into(), Position::new(2, 2), &map, config);
        ctrl.state_mut().health = 0;
        assert_eq!(ctrl.tick(&map, &mut learner), TickOutcome::Eliminated);
        assert_eq!(ctrl.status(), AgentStatus::Eliminated);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(TickOutcome::ReachedEnd.to_string(), "reached_end");
        assert_eq!(TickOutcome::Retreating.to_string(), "retreating");
        assert!(TickOutcome::Eliminated.is_terminal());
        assert!(!TickOutcome::Moving.is_terminal());
    }
}
