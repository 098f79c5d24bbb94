//! Configuration for learning, agent behaviour, and the simulation driver.

use thiserror::Error;

use super::types::{seconds, SimTime};

/// Rejected learning parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must lie in {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Hyper-parameters of the shared tabular learner.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningConfig {
    /// Step size α of the temporal-difference update.
    pub learning_rate: f64,
    /// Discount factor γ applied to the next state's best value.
    pub discount_factor: f64,
    /// Initial exploration probability ε.
    pub epsilon: f64,
    /// Multiplier applied to ε once per global tick.
    pub epsilon_decay: f64,
    /// Floor below which ε never decays.
    pub epsilon_min: f64,
}

impl LearningConfig {
    /// Faster-learning preset used by the tower-defense simulation loop.
    pub fn simulation() -> Self {
        Self {
            learning_rate: 0.9,
            discount_factor: 0.9,
            epsilon: 1.0,
            epsilon_decay: 0.9995,
            epsilon_min: 0.05,
        }
    }

    /// Checks every parameter against its admissible range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("learning_rate", self.learning_rate, 0.0, 1.0)?;
        check("discount_factor", self.discount_factor, 0.0, 1.0)?;
        check("epsilon_min", self.epsilon_min, 0.0, 1.0)?;
        check("epsilon", self.epsilon, self.epsilon_min, 1.0)?;
        check("epsilon_decay", self.epsilon_decay, 0.0, 1.0)?;
        Ok(())
    }
}

fn check(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            discount_factor: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.05,
        }
    }
}

/// Per-agent behaviour: timers, state-encoding windows, and reward shaping constants.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    // --- Agent ---
    pub max_health: i32,
    /// Number of recent positions remembered for stuck and loop detection.
    pub history_len: usize,
    /// Simulated time elapsed per tick.
    pub tick: SimTime,

    // --- Stuck detection ---
    /// Agents stuck for longer than this are eliminated.
    pub max_stuck_time: SimTime,
    /// Reward per simulated second stuck (negative).
    pub stuck_penalty: f64,
    pub extra_stuck_threshold: SimTime,
    pub extra_stuck_penalty: f64,

    // --- Reward shaping ---
    /// Penalty per repeated visit of the current position within the history.
    pub loop_penalty: f64,
    /// Reward per cell of Manhattan progress toward the goal.
    pub progress_weight: f64,
    /// Penalty per hazardous orthogonal neighbor.
    pub hazard_adjacent_penalty: f64,
    pub sustained_hazard_threshold: SimTime,
    /// Multiplier of the accumulated hazard-adjacent time once over threshold.
    pub sustained_hazard_weight: f64,
    pub reached_end_bonus: f64,
    pub eliminated_penalty: f64,

    // --- State encoding / retreat ---
    /// Half-width of the square scanned for the danger feature (2 → 5×5).
    pub danger_radius: i32,
    /// Half-width of the square scanned by the retreat safety score (3 → 7×7).
    pub retreat_radius: i32,
    /// Retreat engages below this fraction of max health.
    pub retreat_health_fraction: f64,
}

impl AgentConfig {
    /// Health below which the tactical retreat overrides the policy.
    pub fn retreat_threshold(&self) -> f64 {
        self.max_health as f64 * self.retreat_health_fraction
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            history_len: 12,
            tick: seconds(1.0 / 60.0),
            max_stuck_time: seconds(5.0),
            stuck_penalty: -10.0,
            extra_stuck_threshold: seconds(1.0),
            extra_stuck_penalty: 50.0,
            loop_penalty: 30.0,
            progress_weight: 2.0,
            hazard_adjacent_penalty: 15.0,
            sustained_hazard_threshold: seconds(1.0),
            sustained_hazard_weight: 40.0,
            reached_end_bonus: 500.0,
            eliminated_penalty: 200.0,
            danger_radius: 2,
            retreat_radius: 3,
            retreat_health_fraction: 0.3,
        }
    }
}

/// Configuration of the [`Simulation`](super::environment::Simulation) driver.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    // --- Map geometry ---
    pub map_width: i32,
    pub map_height: i32,
    pub cell_size: i32,

    // --- Spawning ---
    /// Ticks between automatic spawns.
    pub spawn_interval_ticks: u64,
    /// Random rows tried per spawn before giving up.
    pub spawn_attempts: usize,

    // --- Termination ---
    /// Game over once this many agents reached the goal.
    pub max_successful: u32,

    /// Seed for spawning and exploration.
    pub seed: u64,

    pub agent: AgentConfig,
    pub learning: LearningConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            map_width: 25,
            map_height: 15,
            cell_size: 40,
            spawn_interval_ticks: 120,
            spawn_attempts: 20,
            max_successful: 100,
            seed: 42,
            agent: AgentConfig::default(),
            learning: LearningConfig::simulation(),
        }
    }
}
