//! Prey: eat food, flee predators, seek mates, and learn which pays off.
//!
//! # Tick
//!
//! 1. Dead prey do nothing.
//! 2. Age, look around, and score each action as learned value plus a
//!    shaped immediate reward. The first best-scoring action wins.
//! 3. Move, then eat every food item in contact range.
//! 4. If energy allows, try to reproduce.
//! 5. Look around again and feed the reward of the chosen action back into
//!    the policy.

use rand::Rng;
use tracing::trace;

use natsel_types::{AgentSnapshot, EntityId, Parents, PreyAction, ReproductionMode, Species};

use crate::body::Body;
use crate::config::SpeciesConfig;
use crate::entity::{Bounds, Consumable, Perceivable, Position, Reproducing, consume_in_reach};
use crate::food::Food;
use crate::genetics::{BaseStats, Birth};
use crate::locomotion::wander;
use crate::perception::{Peers, Proximity, Sighting, closeness, nearest};
use crate::policy::{QTable, first_best};
use crate::predator::Predator;

// ---------------------------------------------------------------------------
// Reward shaping
// ---------------------------------------------------------------------------

const FOOD_BASE: f64 = 10.0;
const FOOD_CLOSENESS: f64 = 10.0;
const FOOD_SATED_PENALTY: f64 = -2.0;
const FLEE_PER_UNIT: f64 = 3.0;
const FLEE_NOTHING_PENALTY: f64 = -5.0;
const MATE_BASE: f64 = 5.0;
const MATE_HUNGRY_PENALTY: f64 = -3.0;
const RANDOM_MOVE: f64 = -1.0;

/// Discretized view a prey learns over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreyState {
    /// Nearest visible food.
    pub food: Proximity,
    /// Nearest visible predator.
    pub predator: Proximity,
    /// Nearest visible mate.
    pub mate: Proximity,
    /// Whether energy is above the well-fed threshold.
    pub well_fed: bool,
}

/// Everything a prey interacts with during its update.
#[derive(Debug)]
pub struct PreyWorld<'a> {
    /// Food to see and eat.
    pub foods: &'a mut [Food],
    /// Predators to see and flee.
    pub predators: &'a [Predator],
    /// Every other prey.
    pub mates: Peers<'a, Prey>,
    /// World extent.
    pub bounds: Bounds,
}

/// Nearest target per category.
#[derive(Debug, Clone, Copy)]
struct View {
    food: Option<Sighting>,
    predator: Option<Sighting>,
    mate: Option<Sighting>,
}

/// A prey agent.
#[derive(Debug, Clone)]
pub struct Prey {
    /// Physical state.
    pub body: Body,
    policy: QTable<PreyState, PreyAction>,
    last_action: Option<PreyAction>,
}

impl Prey {
    /// Build a prey with final base stats.
    pub fn new(
        id: EntityId,
        position: Position,
        base: BaseStats,
        parents: Parents,
        birth: Birth,
        cfg: &SpeciesConfig,
        rng: &mut impl Rng,
    ) -> Self {
        Self::from_body(Body::new(id, position, base, parents, birth, cfg, rng), cfg)
    }

    /// Wrap a body with a fresh policy.
    pub const fn from_body(body: Body, cfg: &SpeciesConfig) -> Self {
        Self {
            body,
            policy: QTable::new(cfg.policy),
            last_action: None,
        }
    }

    /// A founder with mutated default stats at a random position.
    pub fn spawn(cfg: &SpeciesConfig, bounds: Bounds, rng: &mut impl Rng) -> Self {
        Self::from_body(Body::founder(cfg, bounds, rng), cfg)
    }

    /// Action chosen on the most recent tick.
    pub const fn last_action(&self) -> Option<PreyAction> {
        self.last_action
    }

    /// The learned action values.
    pub const fn policy(&self) -> &QTable<PreyState, PreyAction> {
        &self.policy
    }

    /// Whether the prey still has energy.
    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }

    /// Advance one tick. Returns an offspring if one was produced.
    pub fn update(
        &mut self,
        world: &mut PreyWorld<'_>,
        cfg: &SpeciesConfig,
        rng: &mut impl Rng,
    ) -> Option<Self> {
        if !self.is_alive() {
            return None;
        }
        self.body.grow_older();

        let view = self.observe(world);
        let state = self.state_key(&view, cfg);
        let (action, reward) = self.decide(&state, &view, cfg);
        self.last_action = Some(action);

        self.act(action, &view, cfg, world.bounds, rng);
        self.eat(world.foods);
        let offspring = self.breed(world.mates, cfg, world.bounds, rng);

        let next = self.observe(world);
        let next_state = self.state_key(&next, cfg);
        self.policy.update(&state, action, reward, &next_state);
        offspring
    }

    /// Roll the reproduction gate with an optional mate.
    ///
    /// On success the cost is debited from this prey only and the newborn is
    /// returned. A failed roll leaves everything unchanged.
    pub fn reproduce(
        &mut self,
        mate: Option<&Self>,
        cfg: &SpeciesConfig,
        bounds: Bounds,
        rng: &mut impl Rng,
    ) -> Option<Self> {
        self.body
            .conceive(mate.map(|m| &m.body), cfg, bounds, rng)
            .map(|body| Self::from_body(body, cfg))
    }

    /// A mutated adult copy with a fresh policy.
    pub fn adult_clone(&self, cfg: &SpeciesConfig, bounds: Bounds, rng: &mut impl Rng) -> Self {
        Self::from_body(self.body.adult_clone(cfg, bounds, rng), cfg)
    }

    /// Prepare a leaderboard survivor for the next generation. The learned
    /// policy is kept.
    pub fn reset_for_generation(
        &mut self,
        cfg: &SpeciesConfig,
        bounds: Bounds,
        rng: &mut impl Rng,
    ) {
        self.body.reset_for_generation(cfg, bounds, rng);
        self.last_action = None;
    }

    /// Copy out the renderer's view.
    pub fn to_snapshot(&self) -> AgentSnapshot {
        self.body
            .to_snapshot(Species::Prey, self.last_action.map(PreyAction::as_str))
    }

    // -----------------------------------------------------------------------
    // Tick phases
    // -----------------------------------------------------------------------

    fn observe(&self, world: &PreyWorld<'_>) -> View {
        let here = self.body.position;
        let vision = self.body.effective.vision;
        View {
            food: nearest(here, vision, world.foods.iter()),
            predator: nearest(here, vision, world.predators.iter()),
            mate: nearest(here, vision, world.mates.iter()),
        }
    }

    fn state_key(&self, view: &View, cfg: &SpeciesConfig) -> PreyState {
        let quantum = cfg.policy.distance_quantum;
        PreyState {
            food: Proximity::of(view.food.as_ref(), quantum),
            predator: Proximity::of(view.predator.as_ref(), quantum),
            mate: Proximity::of(view.mate.as_ref(), quantum),
            well_fed: self.body.energy > self.body.well_fed_threshold(cfg),
        }
    }

    fn reward(&self, action: PreyAction, view: &View, cfg: &SpeciesConfig) -> f64 {
        let threshold = self.body.well_fed_threshold(cfg);
        let vision = self.body.effective.vision;
        match action {
            PreyAction::MoveTowardsFood => {
                if self.body.energy < threshold {
                    FOOD_CLOSENESS.mul_add(closeness(view.food.as_ref(), vision), FOOD_BASE)
                } else {
                    FOOD_SATED_PENALTY
                }
            }
            PreyAction::MoveAwayFromPredator => view
                .predator
                .map_or(FLEE_NOTHING_PENALTY, |p| FLEE_PER_UNIT * (vision - p.distance)),
            PreyAction::MoveTowardsMate => {
                if self.body.energy > threshold {
                    let near = closeness(view.mate.as_ref(), vision);
                    MATE_BASE.mul_add(1.0 + near, self.body.age_bonus())
                } else {
                    MATE_HUNGRY_PENALTY
                }
            }
            PreyAction::RandomMove => RANDOM_MOVE,
        }
    }

    /// Pick the first action with the best value-plus-reward, and return it
    /// with its immediate reward.
    fn decide(&self, state: &PreyState, view: &View, cfg: &SpeciesConfig) -> (PreyAction, f64) {
        let options = PreyAction::ALL.map(|action| {
            let reward = self.reward(action, view, cfg);
            (action, reward, self.policy.value(state, action) + reward)
        });
        let scores = options.map(|(_, _, score)| score);
        options
            .get(first_best(&scores))
            .map_or((PreyAction::RandomMove, RANDOM_MOVE), |&(action, reward, _)| (action, reward))
    }

    fn act(
        &mut self,
        action: PreyAction,
        view: &View,
        cfg: &SpeciesConfig,
        bounds: Bounds,
        rng: &mut impl Rng,
    ) {
        let here = self.body.position;
        let directed = match action {
            PreyAction::MoveTowardsFood => view.food.map(|s| here.heading_to(s.position)),
            PreyAction::MoveAwayFromPredator => {
                view.predator.map(|s| here.heading_away_from(s.position))
            }
            PreyAction::MoveTowardsMate => view.mate.map(|s| here.heading_to(s.position)),
            PreyAction::RandomMove => None,
        };
        // Nothing to head for: wander instead. The policy still credits the
        // chosen action, not a random move.
        let heading = directed
            .unwrap_or_else(|| wander(self.body.heading, cfg.change_direction_probability, rng));
        self.body.step(heading, cfg, bounds, rng);
    }

    fn eat(&mut self, foods: &mut [Food]) {
        for gain in consume_in_reach(self.body.position, self.body.effective.size, foods) {
            self.body.absorb(gain);
        }
    }

    /// At most one offspring per tick: the first successful mating ends the
    /// scan.
    fn breed(
        &mut self,
        mates: Peers<'_, Self>,
        cfg: &SpeciesConfig,
        bounds: Bounds,
        rng: &mut impl Rng,
    ) -> Option<Self> {
        if !self.body.can_reproduce(cfg) {
            return None;
        }
        let child = match cfg.reproduction_mode {
            ReproductionMode::SelfCloning => self.reproduce(None, cfg, bounds, rng),
            ReproductionMode::Cross => {
                let mut child = None;
                for mate in mates.iter() {
                    if !mate.is_alive() || !self.body.touches(&mate.body) {
                        continue;
                    }
                    child = self.reproduce(Some(mate), cfg, bounds, rng);
                    if child.is_some() {
                        break;
                    }
                }
                child
            }
        };
        if let Some(c) = &child {
            trace!(parent = %self.body.id, child = %c.body.id, "prey born");
        }
        child
    }
}

impl Perceivable for Prey {
    fn id(&self) -> EntityId {
        self.body.id
    }

    fn position(&self) -> Position {
        self.body.position
    }

    fn radius(&self) -> f64 {
        self.body.effective.size
    }

    fn is_present(&self) -> bool {
        self.body.is_alive()
    }
}

impl Consumable for Prey {
    fn surrender(&mut self) -> f64 {
        self.body.surrender()
    }
}

impl Reproducing for Prey {
    fn parents(&self) -> Parents {
        self.body.parents
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::FoodConfig;

    fn bounds() -> Bounds {
        Bounds::new(200.0, 200.0)
    }

    fn default_stats() -> BaseStats {
        SpeciesConfig::prey().default_stats()
    }

    fn prey_at(x: f64, y: f64, cfg: &SpeciesConfig, rng: &mut SmallRng) -> Prey {
        Prey::new(
            EntityId::random(rng),
            Position::new(x, y),
            default_stats(),
            Parents::none(),
            Birth::Adult,
            cfg,
            rng,
        )
    }

    fn food_at(x: f64, y: f64, rng: &mut SmallRng) -> Food {
        let cfg = FoodConfig::default();
        Food::new(
            EntityId::random(rng),
            Position::new(x, y),
            cfg.default_size,
            Parents::none(),
            &cfg,
        )
    }

    fn no_breeding() -> SpeciesConfig {
        SpeciesConfig {
            cross_reproduction_probability: 0.0,
            self_reproduction_probability: 0.0,
            ..SpeciesConfig::prey()
        }
    }

    #[test]
    fn dead_prey_do_nothing() {
        let cfg = SpeciesConfig::prey();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut prey = prey_at(10.0, 10.0, &cfg, &mut rng);
        prey.body.energy = 0.0;
        let mut foods: Vec<Food> = Vec::new();
        let mut world = PreyWorld {
            foods: &mut foods,
            predators: &[],
            mates: Peers::empty(),
            bounds: bounds(),
        };
        assert!(prey.update(&mut world, &cfg, &mut rng).is_none());
        assert_eq!(prey.body.age, 0);
        assert!(prey.last_action().is_none());
    }

    #[test]
    fn hungry_prey_heads_for_visible_food() {
        // Food 5 away on the x axis, nothing else in sight, energy below the
        // well-fed threshold.
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut prey = prey_at(100.0, 100.0, &cfg, &mut rng);
        prey.body.energy = prey.body.well_fed_threshold(&cfg) - 1.0;
        let mut foods = vec![food_at(105.0, 100.0, &mut rng)];
        let mut world = PreyWorld {
            foods: &mut foods,
            predators: &[],
            mates: Peers::empty(),
            bounds: bounds(),
        };
        prey.update(&mut world, &cfg, &mut rng);
        assert_eq!(prey.last_action(), Some(PreyAction::MoveTowardsFood));
        assert!(foods[0].is_eaten);
        assert_eq!(prey.body.consumed, 1);
    }

    #[test]
    fn sated_prey_does_not_chase_food() {
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut prey = prey_at(100.0, 100.0, &cfg, &mut rng);
        assert!(prey.body.energy > prey.body.well_fed_threshold(&cfg));
        let mut foods = vec![food_at(120.0, 100.0, &mut rng)];
        let mut world = PreyWorld {
            foods: &mut foods,
            predators: &[],
            mates: Peers::empty(),
            bounds: bounds(),
        };
        prey.update(&mut world, &cfg, &mut rng);
        assert_ne!(prey.last_action(), Some(PreyAction::MoveTowardsFood));
    }

    #[test]
    fn nearby_predator_triggers_flight() {
        let cfg = no_breeding();
        let pcfg = SpeciesConfig::predator();
        let mut rng = SmallRng::seed_from_u64(4);
        let mut prey = prey_at(100.0, 100.0, &cfg, &mut rng);
        let predators = vec![Predator::new(
            EntityId::random(&mut rng),
            Position::new(95.0, 100.0),
            pcfg.default_stats(),
            Parents::none(),
            Birth::Adult,
            &pcfg,
            &mut rng,
        )];
        let mut foods: Vec<Food> = Vec::new();
        let mut world = PreyWorld {
            foods: &mut foods,
            predators: &predators,
            mates: Peers::empty(),
            bounds: bounds(),
        };
        prey.update(&mut world, &cfg, &mut rng);
        assert_eq!(prey.last_action(), Some(PreyAction::MoveAwayFromPredator));
        assert!(prey.body.position.x > 100.0);
    }

    #[test]
    fn eating_never_exceeds_max_energy() {
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut prey = prey_at(50.0, 50.0, &cfg, &mut rng);
        prey.body.energy = 1.0;
        let mut foods: Vec<Food> = (0..4).map(|_| food_at(50.0, 50.0, &mut rng)).collect();
        let mut world = PreyWorld {
            foods: &mut foods,
            predators: &[],
            mates: Peers::empty(),
            bounds: bounds(),
        };
        prey.update(&mut world, &cfg, &mut rng);
        assert!(prey.body.energy <= prey.body.max_energy);
        assert_eq!(prey.body.consumed, 4);
        assert!(foods.iter().all(|f| f.is_eaten));
    }

    #[test]
    fn reproduce_gate_and_cost() {
        let mut cfg = SpeciesConfig::prey();
        let mut rng = SmallRng::seed_from_u64(6);
        let mut a = prey_at(50.0, 50.0, &cfg, &mut rng);
        let b = prey_at(51.0, 50.0, &cfg, &mut rng);

        cfg.cross_reproduction_probability = 0.0;
        assert!(a.reproduce(Some(&b), &cfg, bounds(), &mut rng).is_none());
        assert!((a.body.energy - 30.0).abs() < 1e-9);

        cfg.cross_reproduction_probability = 1.0;
        let child = a.reproduce(Some(&b), &cfg, bounds(), &mut rng).unwrap();
        assert!((a.body.energy - 15.0).abs() < 1e-9);
        assert_eq!(child.parents(), Parents::pair(a.body.id, b.body.id));
        assert!(child.last_action().is_none());
        assert_eq!(child.policy().state_count(), 0);
    }

    #[test]
    fn cross_breeding_yields_at_most_one_offspring() {
        let mut cfg = SpeciesConfig::prey();
        cfg.cross_reproduction_probability = 1.0;
        let mut rng = SmallRng::seed_from_u64(7);
        let mut herd: Vec<Prey> = (0..4).map(|_| prey_at(100.0, 100.0, &cfg, &mut rng)).collect();
        let mut foods: Vec<Food> = Vec::new();
        let (first, mates) = Peers::split(&mut herd, 0).unwrap();
        let mut world = PreyWorld {
            foods: &mut foods,
            predators: &[],
            mates,
            bounds: bounds(),
        };
        let before = first.body.energy;
        let child = first.update(&mut world, &cfg, &mut rng).unwrap();
        let cost = cfg.reproduction_cost(first.body.base.size);
        let moved = cfg.movement_cost(&first.body.base);
        assert!((first.body.energy - (before - moved - cost)).abs() < 1e-9);
        assert_eq!(child.parents().first(), Some(first.body.id));
    }

    #[test]
    fn policy_learns_from_chosen_action() {
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(8);
        let mut prey = prey_at(100.0, 100.0, &cfg, &mut rng);
        let mut foods: Vec<Food> = Vec::new();
        let mut world = PreyWorld {
            foods: &mut foods,
            predators: &[],
            mates: Peers::empty(),
            bounds: bounds(),
        };
        prey.update(&mut world, &cfg, &mut rng);
        assert_eq!(prey.policy().state_count(), 1);
    }

    #[test]
    fn hungry_prey_with_no_food_in_sight_still_seeks_food() {
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(10);
        let mut prey = prey_at(100.0, 100.0, &cfg, &mut rng);
        prey.body.energy = prey.body.well_fed_threshold(&cfg) - 1.0;
        let start = prey.body.position;
        let mut foods: Vec<Food> = Vec::new();
        let mut world = PreyWorld {
            foods: &mut foods,
            predators: &[],
            mates: Peers::empty(),
            bounds: bounds(),
        };
        let state = prey.state_key(&prey.observe(&world), &cfg);

        prey.update(&mut world, &cfg, &mut rng);

        assert_eq!(prey.last_action(), Some(PreyAction::MoveTowardsFood));
        assert!(prey.policy().value(&state, PreyAction::MoveTowardsFood) > 0.0);
        assert!(prey.policy().value(&state, PreyAction::RandomMove).abs() < f64::EPSILON);
        assert!(prey.body.position.distance_to(start) > 0.0);
    }

    #[test]
    fn choice_does_not_depend_on_the_random_source() {
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(11);
        let template = prey_at(100.0, 100.0, &cfg, &mut rng);
        let mut chosen = Vec::new();
        for seed in 0..50 {
            let mut prey = template.clone();
            let mut foods = vec![food_at(110.0, 100.0, &mut rng)];
            let mut world = PreyWorld {
                foods: &mut foods,
                predators: &[],
                mates: Peers::empty(),
                bounds: bounds(),
            };
            prey.update(&mut world, &cfg, &mut SmallRng::seed_from_u64(seed));
            chosen.push(prey.last_action());
        }
        assert!(chosen.iter().all(|a| *a == chosen[0]));
    }

    #[test]
    fn best_learned_value_is_always_exploited() {
        // Sated with nothing in sight, shaping alone favours seeking a mate.
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(12);
        let mut prey = prey_at(100.0, 100.0, &cfg, &mut rng);
        let mut foods: Vec<Food> = Vec::new();
        let world = PreyWorld {
            foods: &mut foods,
            predators: &[],
            mates: Peers::empty(),
            bounds: bounds(),
        };
        let view = prey.observe(&world);
        let state = prey.state_key(&view, &cfg);
        assert_eq!(prey.decide(&state, &view, &cfg).0, PreyAction::MoveTowardsMate);

        prey.policy.update(&state, PreyAction::RandomMove, 1000.0, &state);

        for seed in 0..100 {
            let mut learner = prey.clone();
            let mut foods: Vec<Food> = Vec::new();
            let mut world = PreyWorld {
                foods: &mut foods,
                predators: &[],
                mates: Peers::empty(),
                bounds: bounds(),
            };
            learner.update(&mut world, &cfg, &mut SmallRng::seed_from_u64(seed));
            assert_eq!(learner.last_action(), Some(PreyAction::RandomMove));
        }
    }

    #[test]
    fn consumed_prey_is_no_longer_present() {
        let cfg = SpeciesConfig::prey();
        let mut rng = SmallRng::seed_from_u64(9);
        let mut prey = prey_at(10.0, 10.0, &cfg, &mut rng);
        let gained = prey.surrender();
        assert!((gained - 30.0).abs() < 1e-9);
        assert!(!prey.is_present());
        assert!(prey.body.energy.abs() < f64::EPSILON);
    }
}
