//! Tabular reinforcement learning for grid agents.
//!
//! Agents are driven by an [`AgentController`] that runs a fixed per-tick state machine:
//! stuck detection, a low-health retreat override, epsilon-greedy action selection, a shaped
//! reward for the previous transition, and a temporal-difference update into a
//! [`LearningTable`] shared through a [`QLearner`].
//!
//! The [`Simulation`] driver spawns agents, ticks them once per global tick, removes the ones
//! that finished, and decays exploration once per tick.

pub mod action_space;
pub mod agent;
pub mod config;
pub mod controller;
pub mod environment;
pub mod learner;
pub mod metrics;
pub mod observation;
#[cfg(feature = "serde")]
pub mod persistence;
pub mod policy;
pub mod q_table;
pub mod retreat;
pub mod reward;
pub mod stuck;
pub mod types;


pub use action_space::ActionSpace;
pub use agent::AgentState;
pub use config::{AgentConfig, ConfigError, LearningConfig, SimulationConfig};
pub use controller::{AgentController, TickOutcome};
pub use environment::{Simulation, StepResult};
pub use learner::QLearner;
pub use metrics::{FinalStats, LearnerStats, SimulationStats};
pub use observation::{StateEncoder, StateKey};
#[cfg(feature = "serde")]
pub use persistence::PersistenceError;
pub use policy::{EpsilonGreedyPolicy, GreedyPolicy, Policy, RandomPolicy};
pub use q_table::{ActionValues, LearningTable};
pub use retreat::TacticalRetreat;
pub use reward::{RewardBreakdown, RewardComputer};
pub use stuck::{StuckCheck, StuckDetector};
pub use types::{seconds, ActionId, AgentStatus, Direction, SimTime};
