//! Policy trait for the learning agents.

use crate::rl::observation::StateKey;
use crate::rl::q_table::LearningTable;
use crate::rl::types::Direction;

/// Chooses a move for an agent given its encoded state.
///
/// Policies read the shared [`LearningTable`] but never write it.
pub trait Policy: Send + Sync {
    /// Selects one of `legal` for `state`.
    ///
    /// # Returns
    ///
    /// `None` only when `legal` is empty.
    fn select_action(
        &mut self,
        state: &StateKey,
        legal: &[Direction],
        table: &LearningTable,
    ) -> Option<Direction>;

    /// Advances the exploration schedule by one global tick. No-op by default.
    fn decay(&mut self) {}

    /// Current probability of taking a random action.
    fn exploration_rate(&self) -> f64 {
        0.0
    }

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
