//! Headings and single-step movement inside the world bounds.

use std::f64::consts::TAU;

use rand::Rng;

use crate::entity::{Bounds, Position};

/// A uniformly random heading in `[0, 2π)`.
pub fn random_heading(rng: &mut impl Rng) -> f64 {
    rng.random::<f64>() * TAU
}

/// Heading for a wandering step: keep `current` unless the direction-change
/// roll succeeds.
pub fn wander(current: f64, change_probability: f64, rng: &mut impl Rng) -> f64 {
    if rng.random::<f64>() < change_probability {
        random_heading(rng)
    } else {
        current
    }
}

/// Result of one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Where the mover ended up, always inside the bounds.
    pub position: Position,
    /// Heading to carry into the next tick.
    pub heading: f64,
}

/// Advance `from` by `speed` along `heading`.
///
/// Leaving the world clamps the position to the nearest edge and replaces
/// the heading with a fresh random one instead of reflecting it.
pub fn advance(
    from: Position,
    heading: f64,
    speed: f64,
    bounds: Bounds,
    rng: &mut impl Rng,
) -> Step {
    let target = Position::new(
        heading.cos().mul_add(speed, from.x),
        heading.sin().mul_add(speed, from.y),
    );
    if bounds.contains(target) {
        Step {
            position: target,
            heading,
        }
    } else {
        Step {
            position: bounds.clamp(target),
            heading: random_heading(rng),
        }
    }
}
