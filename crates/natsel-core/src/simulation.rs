//! The population manager and its tick.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Prey** -- every prey updates against the live food, predator, and
//!    prey collections. Offspring are admitted once the pass is over.
//! 2. **Predators** -- every predator updates against the live prey.
//!    Offspring are admitted once the pass is over.
//! 3. **Food** -- every food item decays and may spread.
//! 4. **Cull** -- agents with no energy leave their collection for the
//!    species leaderboard; eaten or decayed food is dropped.
//! 5. **Regenerate** -- if either mobile species is empty, both are rebuilt
//!    from their leaderboards and food is reseeded from scratch.
//! 6. **Top up** -- if food is scarce, a fresh batch is added.
//!
//! Nothing in a tick can fail. Perception reads the collections in place,
//! so an agent sees the effects of every agent that updated before it in
//! the same tick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use natsel_agents::{
    Bounds, EntityRef, Food, Peers, Perceivable, Predator, PredatorWorld, Prey, PreyWorld,
};
use natsel_types::{EntityId, PopulationStats, WorldSnapshot};

use crate::config::{ConfigError, SimulationConfig};
use crate::leaderboard::Leaderboard;
use crate::population::admit;
use crate::stats::population_stats;

/// Errors raised by configuration-changing operations on a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The supplied configuration failed validation.
    #[error("invalid configuration: {source}")]
    InvalidConfig {
        /// The underlying validation error.
        #[from]
        source: ConfigError,
    },
}

/// What happened during the most recent tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The tick number this report describes.
    pub tick: u64,
    /// Prey offspring admitted.
    pub preys_born: u32,
    /// Predator offspring admitted.
    pub predators_born: u32,
    /// Food items spread from existing food.
    pub foods_spawned: u32,
    /// Prey drained by predators.
    pub preys_killed: u32,
    /// Prey removed at the cull.
    pub preys_died: u32,
    /// Predators removed at the cull.
    pub predators_died: u32,
    /// Food removed at the cull, eaten or decayed.
    pub foods_removed: u32,
    /// Parents evicted to make room for offspring.
    pub evictions: u32,
    /// Whether the mobile populations were rebuilt this tick.
    pub regenerated: bool,
    /// Food added by the scarcity top-up.
    pub foods_topped_up: u32,
}

/// The simulation: three populations, two leaderboards, and the
/// configuration that drives them.
#[derive(Debug)]
pub struct Simulation<R = StdRng> {
    config: SimulationConfig,
    rng: R,
    tick: u64,
    foods: Vec<Food>,
    preys: Vec<Prey>,
    predators: Vec<Predator>,
    fittest_preys: Leaderboard<Prey>,
    fittest_predators: Leaderboard<Predator>,
    last_report: TickReport,
}

impl Simulation<StdRng> {
    /// Create an empty simulation, seeded from `world.seed` when present and
    /// from the OS otherwise. Call [`Self::initialize`] to populate it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let rng = match config.world.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    /// Create an empty simulation with a fixed seed. Two simulations built
    /// from the same config and seed evolve identically.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `config` fails validation.
    pub fn seeded(config: SimulationConfig, seed: u64) -> Result<Self, SimError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Create an empty simulation drawing from the given random source.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `config` fails validation.
    pub fn with_rng(config: SimulationConfig, rng: R) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            tick: 0,
            foods: Vec::new(),
            preys: Vec::new(),
            predators: Vec::new(),
            fittest_preys: Leaderboard::new(),
            fittest_predators: Leaderboard::new(),
            last_report: TickReport::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Discard everything and populate all three species at their initial
    /// counts. Safe to call repeatedly to restart a run.
    pub fn initialize(&mut self) {
        let bounds = self.bounds();
        self.tick = 0;
        self.last_report = TickReport::default();
        self.foods.clear();
        self.preys.clear();
        self.predators.clear();
        self.fittest_preys.clear();
        self.fittest_predators.clear();

        let Self {
            config,
            rng,
            foods,
            preys,
            predators,
            ..
        } = self;
        let population = &config.population;
        for _ in 0..population.initial_preys {
            admit(preys, Prey::spawn(&config.prey, bounds, rng), capacity(population.max_preys));
        }
        for _ in 0..population.initial_foods {
            admit(foods, Food::spawn(&config.food, bounds, rng), capacity(population.max_foods));
        }
        for _ in 0..population.initial_predators {
            admit(
                predators,
                Predator::spawn(&config.predator, bounds, rng),
                capacity(population.max_predators),
            );
        }

        info!(
            preys = preys.len(),
            foods = foods.len(),
            predators = predators.len(),
            width = bounds.width,
            height = bounds.height,
            "Simulation initialized"
        );
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) {
        self.tick = self.tick.saturating_add(1);
        let bounds = self.bounds();
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        self.update_preys(bounds, &mut report);
        self.update_predators(bounds, &mut report);
        self.update_foods(bounds, &mut report);
        self.cull(&mut report);

        if self.preys.is_empty() || self.predators.is_empty() {
            self.regenerate(bounds);
            report.regenerated = true;
        }

        report.foods_topped_up = self.top_up_food(bounds);

        debug!(
            tick = report.tick,
            preys = self.preys.len(),
            predators = self.predators.len(),
            foods = self.foods.len(),
            preys_born = report.preys_born,
            predators_born = report.predators_born,
            preys_killed = report.preys_killed,
            preys_died = report.preys_died,
            predators_died = report.predators_died,
            regenerated = report.regenerated,
            "Tick complete"
        );
        self.last_report = report;
    }

    // -----------------------------------------------------------------------
    // Tick phases
    // -----------------------------------------------------------------------

    fn update_preys(&mut self, bounds: Bounds, report: &mut TickReport) {
        let Self {
            config,
            rng,
            foods,
            preys,
            predators,
            ..
        } = self;

        let mut born = Vec::new();
        for index in 0..preys.len() {
            let Some((prey, mates)) = Peers::split(preys.as_mut_slice(), index) else {
                continue;
            };
            let mut world = PreyWorld {
                foods: foods.as_mut_slice(),
                predators: predators.as_slice(),
                mates,
                bounds,
            };
            if let Some(child) = prey.update(&mut world, &config.prey, rng) {
                born.push(child);
            }
        }

        let cap = capacity(config.population.max_preys);
        for child in born {
            report.evictions = add_count(report.evictions, admit(preys, child, cap));
            report.preys_born = report.preys_born.saturating_add(1);
        }
    }

    fn update_predators(&mut self, bounds: Bounds, report: &mut TickReport) {
        let Self {
            config,
            rng,
            preys,
            predators,
            ..
        } = self;

        let alive_before = preys.iter().filter(|p| p.is_alive()).count();
        let mut born = Vec::new();
        for index in 0..predators.len() {
            let Some((predator, mates)) = Peers::split(predators.as_mut_slice(), index) else {
                continue;
            };
            let mut world = PredatorWorld {
                preys: preys.as_mut_slice(),
                mates,
                bounds,
            };
            if let Some(child) = predator.update(&mut world, &config.predator, rng) {
                born.push(child);
            }
        }
        let alive_after = preys.iter().filter(|p| p.is_alive()).count();
        report.preys_killed = add_count(0, alive_before.saturating_sub(alive_after));

        let cap = capacity(config.population.max_predators);
        for child in born {
            report.evictions = add_count(report.evictions, admit(predators, child, cap));
            report.predators_born = report.predators_born.saturating_add(1);
        }
    }

    fn update_foods(&mut self, bounds: Bounds, report: &mut TickReport) {
        let Self {
            config, rng, foods, ..
        } = self;

        let mut spawned = Vec::new();
        for food in foods.iter_mut() {
            if let Some(child) = food.update(&config.food, bounds, rng) {
                spawned.push(child);
            }
        }

        let cap = capacity(config.population.max_foods);
        for child in spawned {
            report.evictions = add_count(report.evictions, admit(foods, child, cap));
            report.foods_spawned = report.foods_spawned.saturating_add(1);
        }
    }

    fn cull(&mut self, report: &mut TickReport) {
        let population = &self.config.population;

        let (alive, dead): (Vec<Prey>, Vec<Prey>) =
            std::mem::take(&mut self.preys).into_iter().partition(Prey::is_alive);
        self.preys = alive;
        report.preys_died = add_count(0, dead.len());
        let cap = capacity(population.max_fittest_preys);
        for prey in dead {
            self.fittest_preys.offer(prey, cap);
        }

        let (alive, dead): (Vec<Predator>, Vec<Predator>) = std::mem::take(&mut self.predators)
            .into_iter()
            .partition(Predator::is_alive);
        self.predators = alive;
        report.predators_died = add_count(0, dead.len());
        let cap = capacity(population.max_fittest_predators);
        for predator in dead {
            self.fittest_predators.offer(predator, cap);
        }

        let before = self.foods.len();
        self.foods.retain(Perceivable::is_present);
        report.foods_removed = add_count(0, before.saturating_sub(self.foods.len()));
    }

    /// Rebuild both mobile species from their leaderboards and reseed food.
    ///
    /// Each leaderboard entry comes back reset, together with one mutated
    /// adult copy of it. Survivors of the species that did not collapse stay
    /// where they are. A species still empty afterwards is reseeded with
    /// founders.
    fn regenerate(&mut self, bounds: Bounds) {
        let tick = self.tick;
        let Self {
            config,
            rng,
            foods,
            preys,
            predators,
            fittest_preys,
            fittest_predators,
            ..
        } = self;
        let population = &config.population;
        let fittest_prey_count = fittest_preys.len();
        let fittest_predator_count = fittest_predators.len();

        let cap = capacity(population.max_preys);
        for mut survivor in fittest_preys.drain() {
            survivor.reset_for_generation(&config.prey, bounds, rng);
            let copy = survivor.adult_clone(&config.prey, bounds, rng);
            admit(preys, survivor, cap);
            admit(preys, copy, cap);
        }
        if preys.is_empty() {
            for _ in 0..population.initial_preys {
                admit(preys, Prey::spawn(&config.prey, bounds, rng), cap);
            }
        }

        let cap = capacity(population.max_predators);
        for mut survivor in fittest_predators.drain() {
            survivor.reset_for_generation(&config.predator, bounds, rng);
            let copy = survivor.adult_clone(&config.predator, bounds, rng);
            admit(predators, survivor, cap);
            admit(predators, copy, cap);
        }
        if predators.is_empty() {
            for _ in 0..population.initial_predators {
                admit(predators, Predator::spawn(&config.predator, bounds, rng), cap);
            }
        }

        foods.clear();
        let cap = capacity(population.max_foods);
        for _ in 0..population.initial_foods {
            admit(foods, Food::spawn(&config.food, bounds, rng), cap);
        }

        info!(
            tick,
            fittest_preys = fittest_prey_count,
            fittest_predators = fittest_predator_count,
            preys = preys.len(),
            predators = predators.len(),
            "Generation regenerated"
        );
    }

    /// Add a batch of fresh food when the count falls below the minimum.
    /// The batch is `initial_foods`, or the deficit if that is larger, and
    /// ignores the food cap. Returns the number of items added.
    fn top_up_food(&mut self, bounds: Bounds) -> u32 {
        let population = &self.config.population;
        let minimum = capacity(population.minimum_food_count);
        if self.foods.len() >= minimum {
            return 0;
        }
        let deficit = add_count(0, minimum.saturating_sub(self.foods.len()));
        let batch = population.initial_foods.max(deficit);
        let cap = capacity(population.max_foods);
        for _ in 0..batch {
            let food = Food::spawn(&self.config.food, bounds, &mut self.rng);
            admit(&mut self.foods, food, cap);
        }
        debug!(added = batch, foods = self.foods.len(), "Food topped up");
        batch
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of ticks run since the last initialization.
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Current world extent.
    pub const fn bounds(&self) -> Bounds {
        Bounds::new(self.config.world.width, self.config.world.height)
    }

    /// Live food.
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    /// Live prey.
    pub fn preys(&self) -> &[Prey] {
        &self.preys
    }

    /// Live predators.
    pub fn predators(&self) -> &[Predator] {
        &self.predators
    }

    /// Mutable food collection, for drivers that stage scenarios.
    pub const fn foods_mut(&mut self) -> &mut Vec<Food> {
        &mut self.foods
    }

    /// Mutable prey collection, for drivers that stage scenarios.
    pub const fn preys_mut(&mut self) -> &mut Vec<Prey> {
        &mut self.preys
    }

    /// Mutable predator collection, for drivers that stage scenarios.
    pub const fn predators_mut(&mut self) -> &mut Vec<Predator> {
        &mut self.predators
    }

    /// Best dead prey of the current generation.
    pub const fn fittest_preys(&self) -> &Leaderboard<Prey> {
        &self.fittest_preys
    }

    /// Best dead predators of the current generation.
    pub const fn fittest_predators(&self) -> &Leaderboard<Predator> {
        &self.fittest_predators
    }

    /// Every live entity: food first, then prey, then predators.
    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        self.foods
            .iter()
            .map(EntityRef::Food)
            .chain(self.preys.iter().map(EntityRef::Prey))
            .chain(self.predators.iter().map(EntityRef::Predator))
    }

    /// Look up a live entity by id.
    pub fn find(&self, id: EntityId) -> Option<EntityRef<'_>> {
        self.entities().find(|e| e.id() == id)
    }

    /// Head counts and averages.
    pub fn stats(&self) -> PopulationStats {
        population_stats(&self.foods, &self.preys, &self.predators)
    }

    /// A detached copy of everything a renderer needs.
    pub fn snapshot(&self) -> WorldSnapshot {
        let bounds = self.bounds();
        WorldSnapshot {
            tick: self.tick,
            width: bounds.width,
            height: bounds.height,
            foods: self.foods.iter().map(Food::to_snapshot).collect(),
            preys: self.preys.iter().map(Prey::to_snapshot).collect(),
            predators: self.predators.iter().map(Predator::to_snapshot).collect(),
            stats: self.stats(),
        }
    }

    /// What happened during the most recent tick.
    pub const fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// The live configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Edit the live configuration in place. Changes apply from the next
    /// tick; prefer [`SimulationConfig::set`] on the returned value for
    /// validated edits.
    pub const fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    /// Swap in a whole new configuration after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] and keeps the old configuration
    /// if `config` fails validation.
    pub fn replace_config(&mut self, config: SimulationConfig) -> Result<(), SimError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Resize the world. Entities outside the new extent are pulled back in
    /// by their next move.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if either dimension is not
    /// positive and finite.
    pub fn set_bounds(&mut self, width: f64, height: f64) -> Result<(), SimError> {
        let mut next = self.config.clone();
        next.world.width = width;
        next.world.height = height;
        self.replace_config(next)
    }
}

fn capacity(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

fn add_count(total: u32, n: usize) -> u32 {
    total.saturating_add(u32::try_from(n).unwrap_or(u32::MAX))
}
