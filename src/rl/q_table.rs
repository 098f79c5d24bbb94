//! Shared tabular value store.

use std::collections::HashMap;

use super::observation::StateKey;
use super::types::Direction;

/// Value assumed for any `(state, action)` pair that was never written.
pub const DEFAULT_VALUE: f64 = 0.0;

/// Learned values of the four actions of one state. `None` means never written.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActionValues([Option<f64>; 4]);

impl ActionValues {
    pub fn get(&self, action: Direction) -> Option<f64> {
        self.0[action.id() as usize]
    }

    pub fn set(&mut self, action: Direction, value: f64) {
        self.0[action.id() as usize] = Some(value);
    }

    /// Written `(action, value)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, f64)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.get(d).map(|v| (d, v)))
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mapping from [`StateKey`] to per-action values.
///
/// Reads never create entries: a missing pair reads as [`DEFAULT_VALUE`]. Only
/// [`LearningTable::set`] and [`LearningTable::update`] insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearningTable {
    rows: HashMap<StateKey, ActionValues>,
}

impl LearningTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `(state, action)`, or [`DEFAULT_VALUE`] if never written.
    pub fn value(&self, state: &StateKey, action: Direction) -> f64 {
        self.rows
            .get(state)
            .and_then(|row| row.get(action))
            .unwrap_or(DEFAULT_VALUE)
    }

    pub fn set(&mut self, state: &StateKey, action: Direction, value: f64) {
        self.rows
            .entry(state.clone())
            .or_default()
            .set(action, value);
    }

    /// Greatest value among `actions` in `state`; [`DEFAULT_VALUE`] when `actions` is empty.
    pub fn max_value(&self, state: &StateKey, actions: &[Direction]) -> f64 {
        actions
            .iter()
            .map(|a| self.value(state, *a))
            .reduce(f64::max)
            .unwrap_or(DEFAULT_VALUE)
    }

    /// First action among `actions` holding the strictly greatest value in `state`.
    pub fn best_action(&self, state: &StateKey, actions: &[Direction]) -> Option<Direction> {
        let (&first, rest) = actions.split_first()?;
        let mut best = first;
        let mut best_value = self.value(state, first);
        for &action in rest {
            let value = self.value(state, action);
            if value > best_value {
                best_value = value;
                best = action;
            }
        }
        Some(best)
    }

    /// Temporal-difference update of `(state, action)`:
    ///
    /// ```text
    /// Q(s, a) ← Q(s, a) + α · (r + γ · max_a' Q(s', a') − Q(s, a))
    /// ```
    ///
    /// `max_a' Q(s', a')` ranges over `next_actions` and is zero when none exist. Returns
    /// the new value.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        state: &StateKey,
        action: Direction,
        reward: f64,
        next_state: &StateKey,
        next_actions: &[Direction],
        learning_rate: f64,
        discount_factor: f64,
    ) -> f64 {
        let current_q = self.value(state, action);
        let max_next_q = self.max_value(next_state, next_actions);
        let new_q = current_q + learning_rate * (reward + discount_factor * max_next_q - current_q);
        debug_assert!(new_q.is_finite(), "non-finite value for {} / {}", state, action);
        self.set(state, action, new_q);
        new_q
    }

    pub fn row(&self, state: &StateKey) -> Option<&ActionValues> {
        self.rows.get(state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.rows.iter()
    }

    /// Number of states with at least one written action.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of written `(state, action)` pairs.
    pub fn entry_count(&self) -> usize {
        self.rows.values().map(ActionValues::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: &[i8]) -> StateKey {
        StateKey::new(v.to_vec())
    }

    #[test]
    fn reads_default_without_inserting() {
        let table = LearningTable::new();
        assert_eq!(table.value(&key(&[1, 2]), Direction::Up), 0.0);
        assert_eq!(table.max_value(&key(&[1, 2]), &Direction::ALL), 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn td_update_worked_example() {
        let mut table = LearningTable::new();
        let s = key(&[0]);
        let s2 = key(&[1]);
        table.set(&s, Direction::Right, 2.0);
        table.set(&s2, Direction::Up, 4.0);
        table.set(&s2, Direction::Down, -1.0);
        let new_q = table.update(
            &s,
            Direction::Right,
            10.0,
            &s2,
            &[Direction::Up, Direction::Down],
            0.2,
            0.95,
        );
        assert!((new_q - 4.36).abs() < 1e-10);
        assert!((table.value(&s, Direction::Right) - 4.36).abs() < 1e-10);
    }

    #[test]
    fn update_without_next_actions_uses_zero() {
        let mut table = LearningTable::new();
        let s = key(&[0]);
        let s2 = key(&[1]);
        table.set(&s2, Direction::Up, 100.0);
        let new_q = table.update(&s, Direction::Up, -10.0, &s2, &[], 0.5, 0.9);
        assert!((new_q + 5.0).abs() < 1e-10);
    }

    #[test]
    fn update_does_not_create_next_state_row() {
        let mut table = LearningTable::new();
        table.update(&key(&[0]), Direction::Up, 1.0, &key(&[9]), &Direction::ALL, 0.5, 0.9);
        assert_eq!(table.len(), 1);
        assert!(table.row(&key(&[9])).is_none());
    }

    #[test]
    fn best_action_prefers_first_on_ties() {
        let mut table = LearningTable::new();
        let s = key(&[3]);
        assert_eq!(
            table.best_action(&s, &[Direction::Down, Direction::Left]),
            Some(Direction::Down)
        );
        table.set(&s, Direction::Left, 0.5);
        table.set(&s, Direction::Up, 0.5);
        assert_eq!(table.best_action(&s, &Direction::ALL), Some(Direction::Up));
        assert_eq!(
            table.best_action(&s, &[Direction::Right, Direction::Left]),
            Some(Direction::Left)
        );
        assert_eq!(table.best_action(&s, &[]), None);
    }

    #[test]
    fn negative_values_lose_to_untouched_defaults() {
        let mut table = LearningTable::new();
        let s = key(&[3]);
        table.set(&s, Direction::Up, -2.0);
        assert_eq!(
            table.best_action(&s, &[Direction::Up, Direction::Right]),
            Some(Direction::Right)
        );
    }

    #[test]
    fn counts_states_and_entries() {
        let mut table = LearningTable::new();
        table.set(&key(&[0]), Direction::Up, 1.5);
        table.set(&key(&[0]), Direction::Down, -0.3);
        table.set(&key(&[1]), Direction::Left, 1.0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.entry_count(), 3);
        let row: Vec<_> = table.row(&key(&[0])).unwrap().iter().collect();
        assert_eq!(row, vec![(Direction::Up, 1.5), (Direction::Down, -0.3)]);
    }
}
