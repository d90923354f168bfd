//! Predators: hunt prey and seek mates.
//!
//! Same tick shape as [`crate::prey`] with a smaller action set and no
//! flight. A predator that touches a living prey drains it completely and
//! keeps half of what it took.

use rand::Rng;
use tracing::trace;

use natsel_types::{AgentSnapshot, EntityId, Parents, PredatorAction, ReproductionMode, Species};

use crate::body::Body;
use crate::config::SpeciesConfig;
use crate::entity::{Bounds, Perceivable, Position, Reproducing, consume_in_reach};
use crate::genetics::{BaseStats, Birth};
use crate::locomotion::wander;
use crate::perception::{Peers, Proximity, Sighting, closeness, nearest};
use crate::policy::{QTable, first_best};
use crate::prey::Prey;

/// Share of a prey's energy a predator keeps.
const DIGESTION: f64 = 0.5;

const HUNT_BASE: f64 = 20.0;
const HUNT_CLOSENESS: f64 = 10.0;
const HUNT_SATED_PENALTY: f64 = -2.0;
const MATE_BASE: f64 = 10.0;
const MATE_CLOSENESS: f64 = 5.0;
const MATE_HUNGRY_PENALTY: f64 = -3.0;
const RANDOM_MOVE: f64 = -1.0;

/// Discretized view a predator learns over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PredatorState {
    /// Nearest visible prey.
    pub prey: Proximity,
    /// Nearest visible mate.
    pub mate: Proximity,
    /// Whether energy is above the well-fed threshold.
    pub well_fed: bool,
}

/// Everything a predator interacts with during its update.
#[derive(Debug)]
pub struct PredatorWorld<'a> {
    /// Prey to see and eat.
    pub preys: &'a mut [Prey],
    /// Every other predator.
    pub mates: Peers<'a, Predator>,
    /// World extent.
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Copy)]
struct View {
    prey: Option<Sighting>,
    mate: Option<Sighting>,
}

/// A predator agent.
#[derive(Debug, Clone)]
pub struct Predator {
    /// Physical state.
    pub body: Body,
    policy: QTable<PredatorState, PredatorAction>,
    last_action: Option<PredatorAction>,
}

impl Predator {
    /// Build a predator with final base stats.
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
    pub const fn last_action(&self) -> Option<PredatorAction> {
        self.last_action
    }

    /// The learned action values.
    pub const fn policy(&self) -> &QTable<PredatorState, PredatorAction> {
        &self.policy
    }

    /// Whether the predator still has energy.
    pub fn is_alive(&self) -> bool {
        self.body.is_alive()
    }

    /// Advance one tick. Returns an offspring if one was produced.
    pub fn update(
        &mut self,
        world: &mut PredatorWorld<'_>,
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
        self.hunt(world.preys);
        let offspring = self.breed(world.mates, cfg, world.bounds, rng);

        let next = self.observe(world);
        let next_state = self.state_key(&next, cfg);
        self.policy.update(&state, action, reward, &next_state);
        offspring
    }

    /// Roll the reproduction gate with an optional mate.
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

    /// Prepare a leaderboard survivor for the next generation.
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
            .to_snapshot(Species::Predator, self.last_action.map(PredatorAction::as_str))
    }

    fn observe(&self, world: &PredatorWorld<'_>) -> View {
        let here = self.body.position;
        let vision = self.body.effective.vision;
        View {
            prey: nearest(here, vision, world.preys.iter()),
            mate: nearest(here, vision, world.mates.iter()),
        }
    }

    fn state_key(&self, view: &View, cfg: &SpeciesConfig) -> PredatorState {
        let quantum = cfg.policy.distance_quantum;
        PredatorState {
            prey: Proximity::of(view.prey.as_ref(), quantum),
            mate: Proximity::of(view.mate.as_ref(), quantum),
            well_fed: self.body.energy > self.body.well_fed_threshold(cfg),
        }
    }

    fn reward(&self, action: PredatorAction, view: &View, cfg: &SpeciesConfig) -> f64 {
        let threshold = self.body.well_fed_threshold(cfg);
        let vision = self.body.effective.vision;
        match action {
            PredatorAction::MoveTowardsPrey => {
                if self.body.energy < threshold {
                    HUNT_CLOSENESS.mul_add(closeness(view.prey.as_ref(), vision), HUNT_BASE)
                } else {
                    HUNT_SATED_PENALTY
                }
            }
            PredatorAction::MoveTowardsMate => {
                if self.body.energy > threshold {
                    MATE_CLOSENESS.mul_add(closeness(view.mate.as_ref(), vision), MATE_BASE)
                        + self.body.age_bonus()
                } else {
                    MATE_HUNGRY_PENALTY
                }
            }
            PredatorAction::RandomMove => RANDOM_MOVE,
        }
    }

    fn decide(
        &self,
        state: &PredatorState,
        view: &View,
        cfg: &SpeciesConfig,
    ) -> (PredatorAction, f64) {
        let options = PredatorAction::ALL.map(|action| {
            let reward = self.reward(action, view, cfg);
            (action, reward, self.policy.value(state, action) + reward)
        });
        let scores = options.map(|(_, _, score)| score);
        options
            .get(first_best(&scores))
            .map_or((PredatorAction::RandomMove, RANDOM_MOVE), |&(action, reward, _)| {
                (action, reward)
            })
    }

    fn act(
        &mut self,
        action: PredatorAction,
        view: &View,
        cfg: &SpeciesConfig,
        bounds: Bounds,
        rng: &mut impl Rng,
    ) {
        let here = self.body.position;
        let directed = match action {
            PredatorAction::MoveTowardsPrey => view.prey.map(|s| here.heading_to(s.position)),
            PredatorAction::MoveTowardsMate => view.mate.map(|s| here.heading_to(s.position)),
            PredatorAction::RandomMove => None,
        };
        let heading = directed
            .unwrap_or_else(|| wander(self.body.heading, cfg.change_direction_probability, rng));
        self.body.step(heading, cfg, bounds, rng);
    }

    fn hunt(&mut self, preys: &mut [Prey]) {
        let kills = consume_in_reach(self.body.position, self.body.effective.size, preys);
        for drained in kills {
            trace!(predator = %self.body.id, energy = drained, "prey killed");
            self.body.absorb(drained * DIGESTION);
        }
    }

    /// At most one offspring per tick.
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
        match cfg.reproduction_mode {
            ReproductionMode::SelfCloning => self.reproduce(None, cfg, bounds, rng),
            ReproductionMode::Cross => {
                for mate in mates.iter() {
                    if !mate.is_alive() || !self.body.touches(&mate.body) {
                        continue;
                    }
                    if let Some(child) = self.reproduce(Some(mate), cfg, bounds, rng) {
                        return Some(child);
                    }
                }
                None
            }
        }
    }
}

impl Perceivable for Predator {
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

impl Reproducing for Predator {
    fn parents(&self) -> Parents {
        self.body.parents
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn bounds() -> Bounds {
        Bounds::new(200.0, 200.0)
    }

    fn predator_at(x: f64, y: f64, cfg: &SpeciesConfig, rng: &mut SmallRng) -> Predator {
        Predator::new(
            EntityId::random(rng),
            Position::new(x, y),
            cfg.default_stats(),
            Parents::none(),
            Birth::Adult,
            cfg,
            rng,
        )
    }

    fn prey_at(x: f64, y: f64, rng: &mut SmallRng) -> Prey {
        let cfg = SpeciesConfig::prey();
        Prey::new(
            EntityId::random(rng),
            Position::new(x, y),
            cfg.default_stats(),
            Parents::none(),
            Birth::Adult,
            &cfg,
            rng,
        )
    }

    fn no_breeding() -> SpeciesConfig {
        SpeciesConfig {
            cross_reproduction_probability: 0.0,
            self_reproduction_probability: 0.0,
            ..SpeciesConfig::predator()
        }
    }

    #[test]
    fn contact_kills_prey_and_feeds_half() {
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut predator = predator_at(100.0, 100.0, &cfg, &mut rng);
        predator.body.energy = 10.0;
        let mut preys = vec![prey_at(100.0, 100.0, &mut rng)];
        let prey_energy = preys[0].body.energy;
        let mut world = PredatorWorld {
            preys: &mut preys,
            mates: Peers::empty(),
            bounds: bounds(),
        };
        predator.update(&mut world, &cfg, &mut rng);

        assert!(preys[0].body.energy.abs() < f64::EPSILON);
        assert!(!preys[0].is_alive());
        assert_eq!(predator.body.consumed, 1);
        let moved = cfg.movement_cost(&predator.body.base);
        let expected = (10.0 - moved + prey_energy * DIGESTION).min(predator.body.max_energy);
        assert!((predator.body.energy - expected).abs() < 1e-9);
    }

    #[test]
    fn dead_prey_cannot_be_eaten_twice() {
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut first = predator_at(100.0, 100.0, &cfg, &mut rng);
        let mut second = predator_at(100.0, 100.0, &cfg, &mut rng);
        first.body.energy = 10.0;
        second.body.energy = 10.0;
        let mut preys = vec![prey_at(100.0, 100.0, &mut rng)];
        let mut world = PredatorWorld {
            preys: &mut preys,
            mates: Peers::empty(),
            bounds: bounds(),
        };
        first.update(&mut world, &cfg, &mut rng);
        second.update(&mut world, &cfg, &mut rng);
        assert_eq!(first.body.consumed, 1);
        assert_eq!(second.body.consumed, 0);
    }

    #[test]
    fn hungry_predator_hunts_visible_prey() {
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut predator = predator_at(100.0, 100.0, &cfg, &mut rng);
        predator.body.energy = 20.0;
        let mut preys = vec![prey_at(120.0, 100.0, &mut rng)];
        let mut world = PredatorWorld {
            preys: &mut preys,
            mates: Peers::empty(),
            bounds: bounds(),
        };
        predator.update(&mut world, &cfg, &mut rng);
        assert_eq!(predator.last_action(), Some(PredatorAction::MoveTowardsPrey));
        assert!(predator.body.position.x > 100.0);
    }

    #[test]
    fn well_fed_predator_seeks_mate_and_breeds() {
        let mut cfg = SpeciesConfig::predator();
        cfg.cross_reproduction_probability = 1.0;
        let mut rng = SmallRng::seed_from_u64(4);
        let mut pack: Vec<Predator> =
            (0..2).map(|_| predator_at(100.0, 100.0, &cfg, &mut rng)).collect();
        let mut preys: Vec<Prey> = Vec::new();
        let (hunter, mates) = Peers::split(&mut pack, 0).unwrap();
        let mut world = PredatorWorld {
            preys: &mut preys,
            mates,
            bounds: bounds(),
        };
        let child = hunter.update(&mut world, &cfg, &mut rng).unwrap();
        assert_eq!(hunter.last_action(), Some(PredatorAction::MoveTowardsMate));
        assert_eq!(child.parents().second(), Some(pack[1].body.id));
        assert_eq!(child.to_snapshot().species, Species::Predator);
    }

    #[test]
    fn snapshot_reports_last_action_name() {
        let cfg = no_breeding();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut predator = predator_at(100.0, 100.0, &cfg, &mut rng);
        assert!(predator.to_snapshot().last_action.is_none());
        let mut preys: Vec<Prey> = Vec::new();
        let mut world = PredatorWorld {
            preys: &mut preys,
            mates: Peers::empty(),
            bounds: bounds(),
        };
        predator.update(&mut world, &cfg, &mut rng);
        let snap = predator.to_snapshot();
        assert_eq!(snap.age, 1);
        assert!(snap.last_action.is_some());
    }
}
