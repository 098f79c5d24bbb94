//! Random policy for baselines.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::trait_::Policy;
use crate::rl::observation::StateKey;
use crate::rl::q_table::LearningTable;
use crate::rl::types::Direction;

/// Uniformly random choice among the legal moves, ignoring the table.
///
/// Used as a lower-bound baseline.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn select_action(
        &mut self,
        _state: &StateKey,
        legal: &[Direction],
        _table: &LearningTable,
    ) -> Option<Direction> {
        legal.choose(&mut self.rng).copied()
    }

    fn exploration_rate(&self) -> f64 {
        1.0
    }

    fn name(&self) -> &str {
        "random"
    }
}
