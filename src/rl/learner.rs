//! The learner shared by every agent controller.

use super::config::{ConfigError, LearningConfig};
use super::metrics::LearnerStats;
use super::observation::StateKey;
use super::policy::{EpsilonGreedyPolicy, Policy};
use super::q_table::LearningTable;
use super::types::Direction;

/// Owns the learning table and the exploration policy.
///
/// One instance is shared by all agents of a simulation and handed to each controller by
/// mutable reference on every tick, so every table write is a complete read-modify-write
/// with no interleaving.
pub struct QLearner {
    table: LearningTable,
    policy: Box<dyn Policy>,
    learning_rate: f64,
    discount_factor: f64,
}

impl QLearner {
    /// Creates a learner with an empty table and an epsilon-greedy policy.
    pub fn new(config: &LearningConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_table(LearningTable::new(), config, seed)
    }

    /// Creates a learner that resumes from an existing table.
    ///
    /// Fails if `config` does not pass [`LearningConfig::validate`].
    pub fn with_table(
        table: LearningTable,
        config: &LearningConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let policy = EpsilonGreedyPolicy::new(config, seed)?;
        Ok(Self {
            table,
            policy: Box::new(policy),
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
        })
    }

    /// Creates a learner driven by an arbitrary policy.
    pub fn with_policy(
        table: LearningTable,
        policy: Box<dyn Policy>,
        learning_rate: f64,
        discount_factor: f64,
    ) -> Self {
        Self {
            table,
            policy,
            learning_rate,
            discount_factor,
        }
    }

    /// Chooses among `legal` moves. `None` only if `legal` is empty.
    pub fn choose_action(&mut self, state: &StateKey, legal: &[Direction]) -> Option<Direction> {
        self.policy.select_action(state, legal, &self.table)
    }

    /// Applies the temporal-difference update and returns the new value.
    pub fn update(
        &mut self,
        state: &StateKey,
        action: Direction,
        reward: f64,
        next_state: &StateKey,
        next_actions: &[Direction],
    ) -> f64 {
        self.table.update(
            state,
            action,
            reward,
            next_state,
            next_actions,
            self.learning_rate,
            self.discount_factor,
        )
    }

    /// Decays exploration. Call once per global tick, not once per agent.
    pub fn decay_epsilon(&mut self) {
        self.policy.decay();
    }

    pub fn epsilon(&self) -> f64 {
        self.policy.exploration_rate()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn table(&self) -> &LearningTable {
        &self.table
    }

    pub fn into_table(self) -> LearningTable {
        self.table
    }

    pub fn stats(&self) -> LearnerStats {
        LearnerStats {
            total_states: self.table.len(),
            total_actions: self.table.entry_count(),
            epsilon: self.epsilon(),
            learning_rate: self.learning_rate,
        }
    }
}

impl std::fmt::Debug for QLearner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QLearner")
            .field("policy", &self.policy.name())
            .field("states", &self.table.len())
            .field("learning_rate", &self.learning_rate)
            .field("discount_factor", &self.discount_factor)
            .finish()
    }
}
