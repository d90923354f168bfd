//! What an agent can see and how that is folded into a policy state.
//!
//! Perception is a pure query over borrowed collections. Nothing is copied:
//! an agent later in the update order sees the energy and eaten flags left
//! behind by the agents before it.

use natsel_types::EntityId;

use crate::entity::{Perceivable, Position};

/// The nearest visible member of one target category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    /// Identifier of the seen entity.
    pub id: EntityId,
    /// Where it was when observed.
    pub position: Position,
    /// Distance from the observer.
    pub distance: f64,
}

/// Find the nearest present target strictly inside `vision + target.radius()`.
///
/// Ties on distance resolve to the earliest target in iteration order.
pub fn nearest<'a, T, I>(observer: Position, vision: f64, targets: I) -> Option<Sighting>
where
    T: Perceivable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<Sighting> = None;
    for target in targets {
        if !target.is_present() {
            continue;
        }
        let position = target.position();
        let distance = observer.distance_to(position);
        if distance >= vision + target.radius() {
            continue;
        }
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Sighting {
                id: target.id(),
                position,
                distance,
            });
        }
    }
    best
}

/// Read-only view over every member of a collection except one.
///
/// Built by [`Peers::split`] so an agent can hold itself mutably while
/// looking at the rest of its own species.
#[derive(Debug)]
pub struct Peers<'a, T> {
    before: &'a [T],
    after: &'a [T],
}

impl<T> Clone for Peers<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Peers<'_, T> {}

impl<'a, T> Peers<'a, T> {
    /// A view over the two halves around an excluded element.
    pub const fn new(before: &'a [T], after: &'a [T]) -> Self {
        Self { before, after }
    }

    /// A view with no peers at all.
    pub const fn empty() -> Self {
        Self {
            before: &[],
            after: &[],
        }
    }

    /// Borrow element `index` mutably and everything else as peers.
    ///
    /// Returns `None` when `index` is out of range.
    pub fn split(all: &'a mut [T], index: usize) -> Option<(&'a mut T, Self)> {
        let (before, rest) = all.split_at_mut_checked(index)?;
        let (current, after) = rest.split_first_mut()?;
        Some((current, Self::new(before, after)))
    }

    /// Iterate over every peer in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &'a T> + use<'a, T> {
        self.before.iter().chain(self.after.iter())
    }

    /// Number of peers.
    pub const fn len(&self) -> usize {
        self.before.len().saturating_add(self.after.len())
    }

    /// Whether there are no peers.
    pub const fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// One coordinate of a policy state: a distance bucket, or nothing in sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Proximity {
    /// A target was seen in the given distance bucket.
    Bucket(u32),
    /// No target of this category is visible.
    Unseen,
}

impl Proximity {
    /// Upper bound on bucket indices, so far-sighted mutants share a bucket.
    pub const MAX_BUCKET: u32 = 1024;

    /// Quantize a sighting into `quantum`-wide buckets.
    ///
    /// A non-positive or non-finite quantum collapses every sighting into
    /// bucket 0.
    pub fn of(sighting: Option<&Sighting>, quantum: f64) -> Self {
        let Some(seen) = sighting else {
            return Self::Unseen;
        };
        if !(quantum.is_finite() && quantum > 0.0) {
            return Self::Bucket(0);
        }
        let raw = (seen.distance / quantum).floor();
        if !(raw >= 0.0) {
            return Self::Bucket(0);
        }
        let capped = raw.min(f64::from(Self::MAX_BUCKET));
        // Safe: 0 <= capped <= MAX_BUCKET, which fits in u32.
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let bucket = capped as u32;
        Self::Bucket(bucket)
    }
}

/// Closeness of a sighting in `[0, 1]`: 1 when touching, 0 at the edge of
/// vision or when nothing is seen.
pub fn closeness(sighting: Option<&Sighting>, vision: f64) -> f64 {
    match sighting {
        Some(seen) if vision > 0.0 => ((vision - seen.distance) / vision).clamp(0.0, 1.0),
        _ => 0.0,
    }
}
