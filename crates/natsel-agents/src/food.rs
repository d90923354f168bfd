//! Passive, decaying energy sources.
//!
//! Food never moves or perceives anything. Each tick it loses a fixed amount
//! of energy and, with a small probability, drops a neighbour of the same
//! size close by. Prey eat it by contact; see [`crate::entity::consume_in_reach`].

use rand::Rng;
use tracing::trace;

use natsel_types::{EntityId, FoodSnapshot, Parents};

use crate::config::FoodConfig;
use crate::entity::{Bounds, Consumable, Perceivable, Position, Reproducing};

/// A food item.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    /// Identifier, fixed for life.
    pub id: EntityId,
    /// Location in the world.
    pub position: Position,
    /// Radius, added to an eater's reach and an observer's vision.
    pub size: f64,
    /// Remaining energy.
    pub energy: f64,
    /// Set once the item is eaten or decays away; removed at the next cull.
    pub is_eaten: bool,
    /// Founders have none; spawned food records its source twice.
    pub parents: Parents,
}

impl Food {
    /// Create a food item with the initial energy for its size.
    pub fn new(
        id: EntityId,
        position: Position,
        size: f64,
        parents: Parents,
        cfg: &FoodConfig,
    ) -> Self {
        Self {
            id,
            position,
            size,
            energy: cfg.initial_energy(size),
            is_eaten: false,
            parents,
        }
    }

    /// A founder of the default size at a random position.
    pub fn spawn(cfg: &FoodConfig, bounds: Bounds, rng: &mut impl Rng) -> Self {
        let id = EntityId::random(rng);
        let position = bounds.random_position(rng);
        Self::new(id, position, cfg.default_size, Parents::none(), cfg)
    }

    /// Advance one tick: decay, then maybe spread.
    ///
    /// Returns the new neighbour, if one was produced. Food that decays to
    /// zero or below is flagged eaten and produces nothing.
    pub fn update(&mut self, cfg: &FoodConfig, bounds: Bounds, rng: &mut impl Rng) -> Option<Self> {
        if self.is_eaten {
            return None;
        }
        self.energy -= cfg.decay_rate;
        if self.energy <= 0.0 {
            self.is_eaten = true;
            return None;
        }
        if rng.random::<f64>() < cfg.reproduction_probability {
            return Some(self.spread(cfg, bounds, rng));
        }
        None
    }

    /// A same-size neighbour within `size` of this item on each axis.
    fn spread(&self, cfg: &FoodConfig, bounds: Bounds, rng: &mut impl Rng) -> Self {
        let dx = (rng.random::<f64>() - 0.5) * self.size * 2.0;
        let dy = (rng.random::<f64>() - 0.5) * self.size * 2.0;
        let position = bounds.clamp(Position::new(self.position.x + dx, self.position.y + dy));
        let id = EntityId::random(rng);
        trace!(parent = %self.id, child = %id, "food spread");
        Self::new(id, position, self.size, Parents::asexual(self.id), cfg)
    }

    /// Copy out the renderer's view of this item.
    pub const fn to_snapshot(&self) -> FoodSnapshot {
        FoodSnapshot {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            size: self.size,
            energy: self.energy,
        }
    }
}

impl Perceivable for Food {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f64 {
        self.size
    }

    fn is_present(&self) -> bool {
        !self.is_eaten
    }
}

impl Consumable for Food {
    fn surrender(&mut self) -> f64 {
        let energy = self.energy;
        self.energy = 0.0;
        self.is_eaten = true;
        energy
    }
}

impl Reproducing for Food {
    fn parents(&self) -> Parents {
        self.parents
    }
}
