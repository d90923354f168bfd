//! Bounded record of the fittest dead agents of one species.
//!
//! When a mobile species dies out, the simulation rebuilds it from this
//! record instead of starting from scratch.

use natsel_agents::{Predator, Prey};

/// Ranking inputs for the leaderboard.
pub trait Fitness {
    /// Successful eats over the agent's life.
    fn consumed(&self) -> u32;

    /// Ticks the agent survived.
    fn age(&self) -> u64;
}

impl Fitness for Prey {
    fn consumed(&self) -> u32 {
        self.body.consumed
    }

    fn age(&self) -> u64 {
        self.body.age
    }
}

impl Fitness for Predator {
    fn consumed(&self) -> u32 {
        self.body.consumed
    }

    fn age(&self) -> u64 {
        self.body.age
    }
}

/// Dead agents sorted best first: most eats, then oldest.
#[derive(Debug, Clone)]
pub struct Leaderboard<T> {
    entries: Vec<T>,
}

impl<T> Default for Leaderboard<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Leaderboard<T> {
    /// An empty leaderboard.
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, best first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Remove and return every entry, best first.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.entries)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Fitness> Leaderboard<T> {
    /// Insert an agent, keep the order, and drop whatever falls below
    /// `capacity`. Equal agents keep their arrival order.
    pub fn offer(&mut self, agent: T, capacity: usize) {
        self.entries.push(agent);
        self.entries
            .sort_by(|a, b| b.consumed().cmp(&a.consumed()).then_with(|| b.age().cmp(&a.age())));
        self.entries.truncate(capacity);
    }
}
