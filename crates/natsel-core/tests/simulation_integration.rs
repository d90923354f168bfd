//! Whole-tick tests for the population manager.
//!
//! Each test builds a seeded simulation, stages a situation through the
//! mutable collection accessors, and checks what one or more ticks leave
//! behind.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::too_many_lines,
    clippy::cast_precision_loss
)]

use natsel_core::{Simulation, SimulationConfig, TunableValue};

fn started(seed: u64) -> Simulation {
    let mut sim = Simulation::seeded(SimulationConfig::default(), seed).unwrap();
    sim.initialize();
    sim
}

fn within(value: f64, max: f64) -> bool {
    (0.0..=max).contains(&value)
}

// ---------------------------------------------------------------------------
// Regeneration
// ---------------------------------------------------------------------------

#[test]
fn prey_collapse_regenerates_a_fresh_generation() {
    let mut sim = started(7);
    for (i, prey) in sim.preys_mut().iter_mut().enumerate() {
        prey.body.energy = 0.0;
        prey.body.age = 40;
        prey.body.consumed = u32::try_from(i).unwrap();
    }

    sim.tick();

    let report = *sim.last_report();
    assert!(report.regenerated);
    assert_eq!(report.preys_died, 20);
    assert!(!sim.preys().is_empty());
    for prey in sim.preys() {
        assert_eq!(prey.body.age, 0);
        assert_eq!(prey.body.consumed, 0);
        assert!(prey.is_alive());
    }
    // Ten leaderboard survivors plus one copy each.
    assert_eq!(sim.preys().len(), 20);
    assert!(sim.fittest_preys().is_empty());
    assert!(sim.fittest_predators().is_empty());
}

#[test]
fn empty_leaderboard_falls_back_to_founders() {
    let mut sim = started(8);
    sim.preys_mut().clear();

    sim.tick();

    assert!(sim.last_report().regenerated);
    assert_eq!(sim.preys().len(), 20);
    assert!(sim.preys().iter().all(|p| p.body.parents.is_founder()));
}

#[test]
fn regeneration_reseeds_food_from_scratch() {
    let mut sim = started(9);
    sim.predators_mut().clear();
    sim.foods_mut().truncate(3);

    sim.tick();

    assert!(sim.last_report().regenerated);
    assert_eq!(sim.foods().len(), 200);
    assert_eq!(sim.predators().len(), 10);
}

// ---------------------------------------------------------------------------
// Food top-up
// ---------------------------------------------------------------------------

#[test]
fn scarce_food_is_topped_up_past_the_cap() {
    let mut sim = started(10);
    sim.config_mut()
        .set("Simulation.MAX_FOODS", TunableValue::Number(50.0))
        .unwrap();
    sim.foods_mut().truncate(2);

    sim.tick();

    let report = *sim.last_report();
    assert!(!report.regenerated);
    assert!(report.foods_topped_up >= 200);
    let minimum = sim.config().population.minimum_food_count as usize;
    assert!(sim.foods().len() >= minimum);
    assert!(sim.foods().len() > 50);
}

#[test]
fn top_up_covers_a_deficit_larger_than_the_batch() {
    let mut sim = started(11);
    sim.config_mut().set("Simulation.INITIAL_FOODS", 5_u32).unwrap();
    sim.config_mut()
        .set("Simulation.MINIMUM_FOOD_COUNT", 400_u32)
        .unwrap();

    sim.tick();

    assert!(sim.foods().len() >= 400);
}

// ---------------------------------------------------------------------------
// Invariants across many ticks
// ---------------------------------------------------------------------------

#[test]
fn no_dead_entity_survives_a_tick() {
    let mut sim = started(12);
    for _ in 0..60 {
        sim.tick();
        assert!(sim.preys().iter().all(|p| p.body.energy > 0.0));
        assert!(sim.predators().iter().all(|p| p.body.energy > 0.0));
        assert!(sim.foods().iter().all(|f| !f.is_eaten));
    }
}

#[test]
fn agents_stay_inside_the_world() {
    let mut sim = started(13);
    for _ in 0..40 {
        sim.tick();
        let bounds = sim.bounds();
        for prey in sim.preys() {
            assert!(within(prey.body.position.x, bounds.width));
            assert!(within(prey.body.position.y, bounds.height));
        }
        for predator in sim.predators() {
            assert!(within(predator.body.position.x, bounds.width));
            assert!(within(predator.body.position.y, bounds.height));
        }
        for food in sim.foods() {
            assert!(within(food.position.x, bounds.width));
            assert!(within(food.position.y, bounds.height));
        }
    }
}

#[test]
fn shrinking_the_world_pulls_agents_in_on_their_next_move() {
    let mut sim = started(14);
    sim.tick();
    sim.set_bounds(100.0, 80.0).unwrap();

    sim.tick();

    for prey in sim.preys() {
        assert!(within(prey.body.position.x, 100.0));
        assert!(within(prey.body.position.y, 80.0));
    }
    for predator in sim.predators() {
        assert!(within(predator.body.position.x, 100.0));
        assert!(within(predator.body.position.y, 80.0));
    }
}

#[test]
fn seeded_runs_are_identical() {
    let mut a = started(99);
    let mut b = started(99);
    for _ in 0..30 {
        a.tick();
        b.tick();
    }
    assert_eq!(a.snapshot(), b.snapshot());
    assert_eq!(a.last_report(), b.last_report());
}

#[test]
fn snapshot_matches_live_collections() {
    let mut sim = started(15);
    sim.tick();
    let snapshot = sim.snapshot();

    assert_eq!(snapshot.tick, 1);
    assert_eq!(snapshot.preys.len(), sim.preys().len());
    assert_eq!(snapshot.predators.len(), sim.predators().len());
    assert_eq!(snapshot.foods.len(), sim.foods().len());
    assert_eq!(snapshot.stats.prey_count as usize, sim.preys().len());
    // Newborns admitted after the pass have not acted yet.
    assert!(snapshot.preys.iter().any(|p| p.last_action.is_some()));
}

// ---------------------------------------------------------------------------
// Live configuration
// ---------------------------------------------------------------------------

#[test]
fn rejected_edit_leaves_the_run_untouched() {
    let mut sim = started(16);
    let before = sim.config().clone();

    let result = sim
        .config_mut()
        .set("Prey.DEFAULT_SELF_REPRODUCTION_PROBABILITY", TunableValue::Number(3.0));

    assert!(result.is_err());
    assert_eq!(sim.config(), &before);
    sim.tick();
}

#[test]
fn flat_snapshot_round_trips_into_a_running_simulation() {
    let mut source = started(17);
    source
        .config_mut()
        .set("Predator.MUTATION_RATE", TunableValue::Number(1.5))
        .unwrap();
    source
        .config_mut()
        .set("Prey.REPRODUCTION_TYPE", TunableValue::Text("self".to_owned()))
        .unwrap();
    let json = source.config().to_flat_json().unwrap();

    let mut target = started(18);
    target.config_mut().apply_flat_json(&json).unwrap();

    assert_eq!(target.config(), source.config());
    target.tick();
}
