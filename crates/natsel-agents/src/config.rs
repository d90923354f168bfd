//! Tunable parameters for food and the two mobile species.
//!
//! The defaults here are the reference constants the simulator ships with.
//! Every value is read at the moment it is needed rather than copied into
//! entities, so an override written between ticks applies on the next tick.
//! The exceptions are values fixed at birth: base stats, effective stats and
//! the learning parameters of an agent's policy.

use natsel_types::ReproductionMode;

use crate::genetics::BaseStats;

/// Parameters governing food decay and spreading.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodConfig {
    /// Radius of newly created food (default: 5).
    pub default_size: f64,

    /// Per-tick chance that a food item spawns a neighbour (default: 0.01).
    pub reproduction_probability: f64,

    /// Energy lost by every food item each tick (default: 0.01).
    pub decay_rate: f64,

    /// Initial energy per unit of size (default: 25).
    pub energy_per_size: f64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            default_size: 5.0,
            reproduction_probability: 0.01,
            decay_rate: 0.01,
            energy_per_size: 25.0,
        }
    }
}

impl FoodConfig {
    /// Energy a fresh food item of the given size starts with.
    pub fn initial_energy(&self, size: f64) -> f64 {
        size * self.energy_per_size
    }
}

/// Weights of the linear movement cost over the three base stats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementCostWeights {
    /// Cost per unit of size stat.
    pub size: f64,
    /// Cost per unit of speed stat.
    pub speed: f64,
    /// Cost per unit of vision stat.
    pub vision: f64,
}

/// Multipliers from size stat to the various energy quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyFactors {
    /// Starting energy of a founder or regenerated adult (default: 6).
    pub initial: f64,
    /// Energy ceiling (default: 6).
    pub max: f64,
    /// Starting energy of a newborn (default: 2).
    pub newborn: f64,
    /// Energy a parent spends to produce one offspring (default: 3).
    pub reproduction_cost: f64,
}

impl Default for EnergyFactors {
    fn default() -> Self {
        Self {
            initial: 6.0,
            max: 6.0,
            newborn: 2.0,
            reproduction_cost: 3.0,
        }
    }
}

/// Learning parameters copied into each agent's policy at birth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyConfig {
    /// Step size of the temporal-difference update (default: 0.1).
    pub learning_rate: f64,
    /// Weight of the bootstrapped next-state value (default: 0.9).
    pub discount: f64,
    /// Width of one distance bucket in the state key (default: 5).
    pub distance_quantum: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.9,
            distance_quantum: 5.0,
        }
    }
}

/// Parameters for one mobile species (prey or predator).
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesConfig {
    /// Base vision given to founders before mutation.
    pub default_vision_stat: f64,
    /// Base size given to founders before mutation.
    pub default_size_stat: f64,
    /// Base speed given to founders before mutation.
    pub default_speed_stat: f64,
    /// Largest magnitude a single mutation can shift a stat by.
    pub mutation_rate: f64,
    /// Lower clamp for every mutated stat.
    pub min_mutated_value: f64,
    /// Upper clamp for every mutated stat.
    pub max_mutated_value: f64,
    /// Success chance of an asexual reproduction attempt.
    pub self_reproduction_probability: f64,
    /// Success chance of a sexual reproduction attempt.
    pub cross_reproduction_probability: f64,
    /// Which reproduction path the species uses.
    pub reproduction_mode: ReproductionMode,
    /// Chance that a random move picks a fresh heading.
    pub change_direction_probability: f64,
    /// Movement cost weights.
    pub movement_cost: MovementCostWeights,
    /// Energy multipliers.
    pub energy: EnergyFactors,
    /// Learning parameters for newborn policies.
    pub policy: PolicyConfig,
}

impl SpeciesConfig {
    /// Reference parameters for prey.
    pub fn prey() -> Self {
        Self {
            default_vision_stat: 10.0,
            default_size_stat: 5.0,
            default_speed_stat: 10.0,
            mutation_rate: 4.0,
            min_mutated_value: 1.0,
            max_mutated_value: 50.0,
            self_reproduction_probability: 0.05,
            cross_reproduction_probability: 0.5,
            reproduction_mode: ReproductionMode::Cross,
            change_direction_probability: 0.1,
            movement_cost: MovementCostWeights {
                size: 0.5,
                speed: 0.4,
                vision: 0.1,
            },
            energy: EnergyFactors::default(),
            policy: PolicyConfig::default(),
        }
    }

    /// Reference parameters for predators.
    pub fn predator() -> Self {
        Self {
            default_vision_stat: 12.0,
            default_size_stat: 7.0,
            default_speed_stat: 12.0,
            movement_cost: MovementCostWeights {
                size: 0.4,
                speed: 0.5,
                vision: 0.1,
            },
            ..Self::prey()
        }
    }

    /// Founder stats before mutation.
    pub const fn default_stats(&self) -> BaseStats {
        BaseStats {
            vision: self.default_vision_stat,
            size: self.default_size_stat,
            speed: self.default_speed_stat,
        }
    }

    /// Success chance of one reproduction attempt under the current mode.
    pub const fn reproduction_probability(&self) -> f64 {
        match self.reproduction_mode {
            ReproductionMode::SelfCloning => self.self_reproduction_probability,
            ReproductionMode::Cross => self.cross_reproduction_probability,
        }
    }

    /// Starting energy of a founder or regenerated adult.
    pub fn initial_energy(&self, size_stat: f64) -> f64 {
        size_stat * self.energy.initial
    }

    /// Energy ceiling for the given size stat.
    pub fn max_energy(&self, size_stat: f64) -> f64 {
        size_stat * self.energy.max
    }

    /// Starting energy of a newborn.
    pub fn newborn_energy(&self, size_stat: f64) -> f64 {
        size_stat * self.energy.newborn
    }

    /// Energy a parent spends per offspring.
    pub fn reproduction_cost(&self, size_stat: f64) -> f64 {
        size_stat * self.energy.reproduction_cost
    }

    /// Energy debited by one move, independent of distance actually covered.
    pub fn movement_cost(&self, stats: &BaseStats) -> f64 {
        let w = self.movement_cost;
        stats.size * w.size + stats.speed * w.speed + stats.vision * w.vision
    }
}
