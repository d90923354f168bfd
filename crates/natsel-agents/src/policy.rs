//! Tabular action-value policy.
//!
//! Each agent owns one [`QTable`] mapping a discretized state and an action
//! to a learned value. Values start at zero and move by a temporal-difference
//! step after every tick the agent acts in.
//!
//! Action selection is pure exploitation: the agent takes the arg-max of
//! learned value plus shaped immediate reward. There is no epsilon-greedy
//! exploration and no replay buffer; behavioural variety comes from the
//! random-move action and from mutation across generations.

use std::collections::BTreeMap;

use crate::config::PolicyConfig;

/// A per-agent table of learned action values.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable<S, A> {
    learning_rate: f64,
    discount: f64,
    values: BTreeMap<S, BTreeMap<A, f64>>,
}

impl<S: Ord + Clone, A: Ord + Copy> QTable<S, A> {
    /// Create an empty table with fixed learning parameters.
    pub const fn new(cfg: PolicyConfig) -> Self {
        Self {
            learning_rate: cfg.learning_rate,
            discount: cfg.discount,
            values: BTreeMap::new(),
        }
    }

    /// Learned value of taking `action` in `state`; zero if never updated.
    pub fn value(&self, state: &S, action: A) -> f64 {
        self.values
            .get(state)
            .and_then(|row| row.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Highest recorded value in `state`, or zero when nothing is recorded.
    pub fn best_value(&self, state: &S) -> f64 {
        self.values
            .get(state)
            .and_then(|row| row.values().copied().reduce(f64::max))
            .unwrap_or(0.0)
    }

    /// Apply `Q(s,a) += lr * (reward + discount * max Q(s') - Q(s,a))`.
    pub fn update(&mut self, state: &S, action: A, reward: f64, next_state: &S) {
        let target = reward + self.discount * self.best_value(next_state);
        let current = self.value(state, action);
        let updated = current + self.learning_rate * (target - current);
        self.values
            .entry(state.clone())
            .or_default()
            .insert(action, updated);
    }

    /// Number of states with at least one recorded action.
    pub fn state_count(&self) -> usize {
        self.values.len()
    }

    /// The learning rate this table was built with.
    pub const fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// The discount factor this table was built with.
    pub const fn discount(&self) -> f64 {
        self.discount
    }
}

/// Index of the first maximum in `scores`, or 0 for an empty slice.
///
/// Earlier entries win ties, so callers get a stable choice in action-list
/// order. NaN never wins.
pub fn first_best(scores: &[f64]) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, &score) in scores.iter().enumerate() {
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}
