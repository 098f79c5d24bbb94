//! Detection of agents that stopped making headway.

use tracing::info;

use super::action_space::ActionSpace;
use super::agent::AgentState;
use super::config::AgentConfig;
use super::learner::QLearner;
use super::observation::StateEncoder;
use super::types::{seconds, AgentStatus};
use crate::grid::GridEnvironment;

/// Outcome of one stuck check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StuckCheck {
    /// The agent reached a cell it has not recently occupied.
    Clear,
    /// The agent is standing still or revisiting; the stuck timer advanced.
    Stuck,
    /// The stuck timer ran out and the agent was eliminated.
    Eliminated,
}

/// Tracks stalling and eliminates agents that stall for too long.
pub struct StuckDetector;

impl StuckDetector {
    /// True if the agent has not moved since the last check or is back on a remembered cell.
    pub fn is_stuck(agent: &AgentState) -> bool {
        agent.last_position == Some(agent.position) || agent.visited_recently(agent.position)
    }

    /// Runs the stuck check for one tick.
    ///
    /// While stuck, the timer advances by one tick and, if a transition is cached, the
    /// cached action is penalised by `stuck_penalty × (1 + stuck_time)` on the current
    /// state. Real movement resets the timer. Once the timer exceeds `max_stuck_time` the
    /// agent is eliminated and nothing else is recorded.
    ///
    /// Otherwise the current position becomes the new reference and enters the history.
    pub fn check<G: GridEnvironment + ?Sized>(
        agent: &mut AgentState,
        map: &G,
        learner: &mut QLearner,
        config: &AgentConfig,
    ) -> StuckCheck {
        let stuck = Self::is_stuck(agent);

        if stuck {
            agent.stuck_time = agent.stuck_time + config.tick;
            if let Some((_, action)) = agent.previous {
                let state = StateEncoder::encode(agent.position, agent.health, map, config);
                let legal = ActionSpace::legal_actions(agent.position, map);
                let penalty = config.stuck_penalty * (1.0 + agent.stuck_time.value());
                learner.update(&state, action, penalty, &state, &legal);
            }
        } else {
            agent.stuck_time = seconds(0.0);
        }

        if agent.stuck_time.value() > config.max_stuck_time.value() {
            agent.status = AgentStatus::Eliminated;
            info!(
                agent = %agent.id,
                position = %agent.position,
                stuck_for = agent.stuck_time.value(),
                "agent eliminated for inactivity"
            );
            return StuckCheck::Eliminated;
        }

        agent.last_position = Some(agent.position);
        agent.record_position(agent.position);

        if stuck {
            StuckCheck::Stuck
        } else {
            StuckCheck::Clear
        }
    }
}
