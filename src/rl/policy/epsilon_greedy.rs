//! Epsilon-greedy exploration over the learning table.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::trait_::Policy;
use crate::rl::config::{ConfigError, LearningConfig};
use crate::rl::observation::StateKey;
use crate::rl::q_table::LearningTable;
use crate::rl::types::Direction;

/// Explores with probability ε, otherwise exploits the table.
///
/// ε starts at `epsilon`, is multiplied by `epsilon_decay` on every [`Policy::decay`], and
/// never drops below `epsilon_min`. It never increases.
pub struct EpsilonGreedyPolicy {
    epsilon: f64,
    epsilon_decay: f64,
    epsilon_min: f64,
    rng: StdRng,
}

impl EpsilonGreedyPolicy {
    /// Fails if `config` does not pass [`LearningConfig::validate`].
    pub fn new(config: &LearningConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            epsilon: config.epsilon,
            epsilon_decay: config.epsilon_decay,
            epsilon_min: config.epsilon_min,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn epsilon_min(&self) -> f64 {
        self.epsilon_min
    }
}

impl Policy for EpsilonGreedyPolicy {
    fn select_action(
        &mut self,
        state: &StateKey,
        legal: &[Direction],
        table: &LearningTable,
    ) -> Option<Direction> {
        if legal.is_empty() {
            return None;
        }
        if self.rng.gen::<f64>() < self.epsilon {
            legal.choose(&mut self.rng).copied()
        } else {
            table.best_action(state, legal)
        }
    }

    fn decay(&mut self) {
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.epsilon_min);
    }

    fn exploration_rate(&self) -> f64 {
        self.epsilon
    }

    fn name(&self) -> &str {
        "epsilon_greedy"
    }
}
