//! State and mechanics shared by prey and predators.
//!
//! The two mobile species differ only in what they perceive, which actions
//! they pick from, and what they eat. Everything else (energy bookkeeping,
//! movement, the reproduction gate, lineage) lives in [`Body`].

use rand::Rng;
use tracing::trace;

use natsel_types::{AgentSnapshot, EntityId, Parents, Species};

use crate::config::SpeciesConfig;
use crate::entity::{Bounds, Position};
use crate::genetics::{BaseStats, Birth, EffectiveStats};
use crate::locomotion::{advance, random_heading};

/// Age at which the mate-seeking bonus stops growing.
const AGE_BONUS_CAP_TICKS: u32 = 500;

/// Mate-seeking bonus earned per tick of age.
const AGE_BONUS_PER_TICK: f64 = 0.01;

/// The physical state of a mobile agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Identifier, fixed for life.
    pub id: EntityId,
    /// Location in the world.
    pub position: Position,
    /// Inherited stats, fixed at birth.
    pub base: BaseStats,
    /// Derived stats, computed once from `base`.
    pub effective: EffectiveStats,
    /// Current energy. The agent is dead at zero or below.
    pub energy: f64,
    /// Energy ceiling.
    pub max_energy: f64,
    /// Ticks survived.
    pub age: u64,
    /// Successful eats, the fitness metric.
    pub consumed: u32,
    /// Heading in radians, persisted between ticks.
    pub heading: f64,
    /// Who produced this agent.
    pub parents: Parents,
}

impl Body {
    /// Build a body with final base stats. Energy depends on `birth`.
    pub fn new(
        id: EntityId,
        position: Position,
        base: BaseStats,
        parents: Parents,
        birth: Birth,
        cfg: &SpeciesConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let energy = match birth {
            Birth::Adult => cfg.initial_energy(base.size),
            Birth::Newborn => cfg.newborn_energy(base.size),
        };
        Self {
            id,
            position,
            base,
            effective: base.effective(),
            energy,
            max_energy: cfg.max_energy(base.size),
            age: 0,
            consumed: 0,
            heading: random_heading(rng),
            parents,
        }
    }

    /// A founder: mutated default stats at a random position.
    pub fn founder(cfg: &SpeciesConfig, bounds: Bounds, rng: &mut impl Rng) -> Self {
        let id = EntityId::random(rng);
        let position = bounds.random_position(rng);
        let base = cfg.default_stats().mutated(cfg, rng);
        Self::new(id, position, base, Parents::none(), Birth::Adult, cfg, rng)
    }

    /// Whether the agent still has energy.
    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    /// Count one more tick of survival.
    pub const fn grow_older(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Energy above which the agent counts as well fed: enough to pay for
    /// one offspring and one more move.
    pub fn well_fed_threshold(&self, cfg: &SpeciesConfig) -> f64 {
        cfg.reproduction_cost(self.base.size) + cfg.movement_cost(&self.base)
    }

    /// Mate-seeking bonus that grows with age and saturates.
    pub fn age_bonus(&self) -> f64 {
        let ticks = u32::try_from(self.age).unwrap_or(u32::MAX).min(AGE_BONUS_CAP_TICKS);
        f64::from(ticks) * AGE_BONUS_PER_TICK
    }

    /// Move one step along `heading` and pay the movement cost.
    ///
    /// The cost is paid in full even when the step is cut short by the edge
    /// of the world.
    pub fn step(&mut self, heading: f64, cfg: &SpeciesConfig, bounds: Bounds, rng: &mut impl Rng) {
        let step = advance(self.position, heading, self.effective.speed, bounds, rng);
        self.position = step.position;
        self.heading = step.heading;
        self.energy -= cfg.movement_cost(&self.base);
    }

    /// Absorb energy from one eaten target, capped at the ceiling.
    pub fn absorb(&mut self, gain: f64) {
        self.consumed = self.consumed.saturating_add(1);
        self.energy = (self.energy + gain).min(self.max_energy);
    }

    /// Whether there is enough energy to pay for an offspring.
    pub fn can_reproduce(&self, cfg: &SpeciesConfig) -> bool {
        self.energy > cfg.reproduction_cost(self.base.size)
    }

    /// Whether `other` is close enough to mate with.
    pub fn touches(&self, other: &Self) -> bool {
        self.position.distance_to(other.position) <= self.effective.size + other.effective.size
    }

    /// Roll the reproduction gate and, on success, pay the cost and build the
    /// newborn's body.
    ///
    /// With a mate the newborn gets the mutated average of both parents;
    /// without one it gets a mutated copy of this body. The newborn is placed
    /// at a random position in the world.
    pub fn conceive(
        &mut self,
        mate: Option<&Self>,
        cfg: &SpeciesConfig,
        bounds: Bounds,
        rng: &mut impl Rng,
    ) -> Option<Self> {
        if rng.random::<f64>() >= cfg.reproduction_probability() {
            return None;
        }
        self.energy -= cfg.reproduction_cost(self.base.size);

        let (stats, parents) = match mate {
            Some(mate) => (self.base.average(&mate.base), Parents::pair(self.id, mate.id)),
            None => (self.base, Parents::asexual(self.id)),
        };
        let id = EntityId::random(rng);
        let position = bounds.random_position(rng);
        let base = stats.mutated(cfg, rng);
        trace!(parent = %self.id, child = %id, sexual = mate.is_some(), "offspring conceived");
        Some(Self::new(id, position, base, parents, Birth::Newborn, cfg, rng))
    }

    /// A mutated adult copy with no recorded parents, used to pad a
    /// regenerated generation.
    pub fn adult_clone(&self, cfg: &SpeciesConfig, bounds: Bounds, rng: &mut impl Rng) -> Self {
        let id = EntityId::random(rng);
        let position = bounds.random_position(rng);
        let base = self.base.mutated(cfg, rng);
        Self::new(id, position, base, Parents::none(), Birth::Adult, cfg, rng)
    }

    /// Prepare a leaderboard survivor for the next generation: full adult
    /// energy, zero age and eats, and a fresh random position.
    pub fn reset_for_generation(
        &mut self,
        cfg: &SpeciesConfig,
        bounds: Bounds,
        rng: &mut impl Rng,
    ) {
        self.energy = cfg.initial_energy(self.base.size);
        self.age = 0;
        self.consumed = 0;
        self.position = bounds.random_position(rng);
    }

    /// Give up all energy to an eater.
    pub const fn surrender(&mut self) -> f64 {
        let energy = self.energy;
        self.energy = 0.0;
        energy
    }

    /// Copy out the renderer's view.
    pub fn to_snapshot(&self, species: Species, last_action: Option<&str>) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            species,
            x: self.position.x,
            y: self.position.y,
            vision_stat: self.base.vision,
            size_stat: self.base.size,
            speed_stat: self.base.speed,
            effective_vision: self.effective.vision,
            effective_size: self.effective.size,
            effective_speed: self.effective.speed,
            energy: self.energy,
            max_energy: self.max_energy,
            age: self.age,
            entity_consumed: self.consumed,
            direction_angle: self.heading,
            last_action: last_action.map(str::to_owned),
            parent_a: self.parents.first(),
            parent_b: self.parents.second(),
        }
    }
}
