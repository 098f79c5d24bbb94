//! Pure exploitation.

use super::trait_::Policy;
use crate::rl::observation::StateKey;
use crate::rl::q_table::LearningTable;
use crate::rl::types::Direction;

/// Always takes the highest-valued legal move; the first move wins ties.
///
/// Useful for evaluating a trained table without exploration noise.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn select_action(
        &mut self,
        state: &StateKey,
        legal: &[Direction],
        table: &LearningTable,
    ) -> Option<Direction> {
        table.best_action(state, legal)
    }

    fn name(&self) -> &str {
        "greedy"
    }
}
