//! Aggregate population statistics.
//!
//! Averages over an empty population are `None`, never NaN.

use natsel_agents::{Body, Food, Predator, Prey};
use natsel_types::{PopulationStats, SpeciesAverages};

/// Mean stats and energy over a set of bodies, or `None` if there are none.
pub fn averages<'a, I>(bodies: I) -> Option<SpeciesAverages>
where
    I: IntoIterator<Item = &'a Body>,
{
    let mut count: u32 = 0;
    let mut sum = SpeciesAverages {
        size: 0.0,
        speed: 0.0,
        vision: 0.0,
        energy: 0.0,
    };
    for body in bodies {
        count = count.saturating_add(1);
        sum.size += body.base.size;
        sum.speed += body.base.speed;
        sum.vision += body.base.vision;
        sum.energy += body.energy;
    }
    if count == 0 {
        return None;
    }
    let n = f64::from(count);
    Some(SpeciesAverages {
        size: sum.size / n,
        speed: sum.speed / n,
        vision: sum.vision / n,
        energy: sum.energy / n,
    })
}

/// Head counts and averages for the three collections.
pub fn population_stats(foods: &[Food], preys: &[Prey], predators: &[Predator]) -> PopulationStats {
    PopulationStats {
        food_count: saturating_count(foods.len()),
        prey_count: saturating_count(preys.len()),
        predator_count: saturating_count(predators.len()),
        prey: averages(preys.iter().map(|p| &p.body)),
        predator: averages(predators.iter().map(|p| &p.body)),
    }
}

fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
