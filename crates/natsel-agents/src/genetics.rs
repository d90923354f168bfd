//! Inherited stats, bounded mutation, and the stats derived from them.
//!
//! Base stats are the genome: they are mutated once at birth and never
//! change afterwards. Effective stats are what movement and perception
//! actually use, and are derived from the base stats once at construction.

use rand::Rng;

use crate::config::SpeciesConfig;

/// The three inherited stats of a mobile agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStats {
    /// Raw vision.
    pub vision: f64,
    /// Raw size.
    pub size: f64,
    /// Raw speed.
    pub speed: f64,
}

/// Stats derived from [`BaseStats`] and used at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStats {
    /// Perception radius: vision plus size.
    pub vision: f64,
    /// Body radius: size.
    pub size: f64,
    /// Step length: speed minus size.
    pub speed: f64,
}

/// How an agent came into the world, which decides its starting energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Birth {
    /// Founder or regenerated adult: starts at the initial-energy formula.
    Adult,
    /// Offspring of a reproduction: starts at the lower newborn formula.
    Newborn,
}

impl BaseStats {
    /// Midpoint of two parents' stats.
    pub fn average(&self, other: &Self) -> Self {
        Self {
            vision: (self.vision + other.vision) / 2.0,
            size: (self.size + other.size) / 2.0,
            speed: (self.speed + other.speed) / 2.0,
        }
    }

    /// Mutate every stat independently under the species' bounds.
    pub fn mutated(&self, cfg: &SpeciesConfig, rng: &mut impl Rng) -> Self {
        Self {
            vision: mutate(self.vision, cfg, rng),
            size: mutate(self.size, cfg, rng),
            speed: mutate(self.speed, cfg, rng),
        }
    }

    /// Derive the runtime stats.
    pub fn effective(&self) -> EffectiveStats {
        EffectiveStats {
            vision: self.vision + self.size,
            size: self.size,
            speed: self.speed - self.size,
        }
    }
}

/// Shift `value` by a random amount of up to `mutation_rate` in either
/// direction, then clamp it into `[min_mutated_value, max_mutated_value]`.
///
/// The result is inside the bounds for every input, including infinities
/// and NaN (which lands on the lower bound).
pub fn mutate(value: f64, cfg: &SpeciesConfig, rng: &mut impl Rng) -> f64 {
    let sign = if rng.random::<f64>() < 0.5 { -1.0 } else { 1.0 };
    let shift = sign * rng.random::<f64>() * cfg.mutation_rate;
    clamp_stat(value + shift, cfg.min_mutated_value, cfg.max_mutated_value)
}

/// Clamp without panicking on NaN or an inverted range. An inverted range
/// resolves to `max`.
fn clamp_stat(value: f64, min: f64, max: f64) -> f64 {
    // f64::max returns the non-NaN operand.
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn effective_stats_are_derived_from_base() {
        let base = BaseStats {
            vision: 10.0,
            size: 5.0,
            speed: 12.0,
        };
        let eff = base.effective();
        assert!(close(eff.vision, 15.0));
        assert!(close(eff.size, 5.0));
        assert!(close(eff.speed, 7.0));
        assert_eq!(base.effective(), eff);
    }

    #[test]
    fn mutation_stays_within_bounds_for_any_input() {
        let cfg = SpeciesConfig::prey();
        let inputs = [
            -1000.0,
            0.0,
            0.5,
            1.0,
            25.0,
            49.9,
            50.0,
            1e12,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NAN,
        ];
        for seed in 0..50_u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            for value in inputs {
                let m = mutate(value, &cfg, &mut rng);
                assert!(
                    (cfg.min_mutated_value..=cfg.max_mutated_value).contains(&m),
                    "mutate({value}) = {m} escaped bounds"
                );
            }
        }
    }

    #[test]
    fn mutation_shift_is_bounded_by_rate() {
        let cfg = SpeciesConfig::prey();
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..500 {
            let m = mutate(25.0, &cfg, &mut rng);
            assert!((m - 25.0).abs() <= cfg.mutation_rate);
        }
    }

    #[test]
    fn zero_rate_only_clamps() {
        let mut cfg = SpeciesConfig::prey();
        cfg.mutation_rate = 0.0;
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(close(mutate(12.5, &cfg, &mut rng), 12.5));
        assert!(close(mutate(0.2, &cfg, &mut rng), cfg.min_mutated_value));
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let mut cfg = SpeciesConfig::prey();
        cfg.min_mutated_value = 40.0;
        cfg.max_mutated_value = 10.0;
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(close(mutate(25.0, &cfg, &mut rng), 10.0));
    }

    #[test]
    fn average_is_midpoint() {
        let a = BaseStats {
            vision: 10.0,
            size: 4.0,
            speed: 8.0,
        };
        let b = BaseStats {
            vision: 20.0,
            size: 6.0,
            speed: 12.0,
        };
        let avg = a.average(&b);
        assert!(close(avg.vision, 15.0));
        assert!(close(avg.size, 5.0));
        assert!(close(avg.speed, 10.0));
    }
}
