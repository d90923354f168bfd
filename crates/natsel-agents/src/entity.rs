//! Identity, geometry, and the capability traits shared by all species.
//!
//! Each species lives in its own typed collection, so code never has to ask
//! "what kind of entity is this?" at runtime. Where a single handle over any
//! species is needed, [`EntityRef`] is a tagged borrow matched by pattern.

use rand::Rng;

use natsel_types::{EntityId, Parents, Species};

use crate::food::Food;
use crate::predator::Predator;
use crate::prey::Prey;

/// A point in the continuous world plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Heading in radians that points from `self` toward `other`.
    pub fn heading_to(self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Heading in radians that points from `other` away through `self`.
    pub fn heading_away_from(self, other: Self) -> f64 {
        (self.y - other.y).atan2(self.x - other.x)
    }
}

/// The rectangular world, `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Bounds {
    /// Create bounds of the given size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether a point lies inside the world, edges included.
    pub fn contains(&self, p: Position) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// Nearest point inside the world.
    pub fn clamp(&self, p: Position) -> Position {
        Position {
            x: p.x.max(0.0).min(self.width),
            y: p.y.max(0.0).min(self.height),
        }
    }

    /// A uniformly random point inside the world.
    pub fn random_position(&self, rng: &mut impl Rng) -> Position {
        Position {
            x: rng.random::<f64>() * self.width,
            y: rng.random::<f64>() * self.height,
        }
    }
}

/// Something other entities can see.
pub trait Perceivable {
    /// Stable identifier.
    fn id(&self) -> EntityId;

    /// Current position.
    fn position(&self) -> Position;

    /// Radius added to an observer's vision when deciding visibility, and
    /// to an eater's reach when deciding contact.
    fn radius(&self) -> f64;

    /// Whether the entity still exists for the rest of this tick. Eaten food
    /// and drained prey stop being perceivable the moment they are consumed.
    fn is_present(&self) -> bool;
}

/// Something that can be eaten.
pub trait Consumable: Perceivable {
    /// Hand over all remaining energy and mark the entity consumed.
    fn surrender(&mut self) -> f64;
}

/// Something that records its lineage.
pub trait Reproducing {
    /// The ids of the entities that produced this one.
    fn parents(&self) -> Parents;
}

/// Consume every present target whose contact radius overlaps the eater's.
///
/// Returns the raw energy surrendered by each target, in slice order. Targets
/// consumed earlier in the same tick are skipped.
pub fn consume_in_reach<T: Consumable>(
    eater: Position,
    eater_radius: f64,
    targets: &mut [T],
) -> Vec<f64> {
    targets
        .iter_mut()
        .filter(|t| t.is_present() && eater.distance_to(t.position()) <= t.radius() + eater_radius)
        .map(Consumable::surrender)
        .collect()
}

/// A borrowed handle over an entity of any species.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    /// A food item.
    Food(&'a Food),
    /// A prey.
    Prey(&'a Prey),
    /// A predator.
    Predator(&'a Predator),
}

impl EntityRef<'_> {
    /// Which species the entity belongs to.
    pub const fn species(&self) -> Species {
        match self {
            Self::Food(_) => Species::Food,
            Self::Prey(_) => Species::Prey,
            Self::Predator(_) => Species::Predator,
        }
    }

    /// The entity's identifier.
    pub fn id(&self) -> EntityId {
        match self {
            Self::Food(f) => f.id(),
            Self::Prey(p) => p.id(),
            Self::Predator(p) => p.id(),
        }
    }

    /// The entity's position.
    pub fn position(&self) -> Position {
        match self {
            Self::Food(f) => f.position(),
            Self::Prey(p) => Perceivable::position(*p),
            Self::Predator(p) => Perceivable::position(*p),
        }
    }

    /// The entity's recorded parents.
    pub fn parents(&self) -> Parents {
        match self {
            Self::Food(f) => f.parents(),
            Self::Prey(p) => p.parents(),
            Self::Predator(p) => p.parents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn distance_and_headings() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!(close(a.distance_to(b), 5.0));
        assert!(close(a.heading_to(Position::new(0.0, 1.0)), PI / 2.0));
        assert!(close(a.heading_away_from(Position::new(1.0, 0.0)), PI));
    }

    #[test]
    fn clamp_pulls_points_inside() {
        let bounds = Bounds::new(100.0, 50.0);
        let p = bounds.clamp(Position::new(-5.0, 75.0));
        assert!(close(p.x, 0.0));
        assert!(close(p.y, 50.0));
        assert!(bounds.contains(p));
        assert!(!bounds.contains(Position::new(100.5, 10.0)));
    }

    #[test]
    fn random_positions_stay_inside() {
        let bounds = Bounds::new(40.0, 30.0);
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            assert!(bounds.contains(bounds.random_position(&mut rng)));
        }
    }
}
