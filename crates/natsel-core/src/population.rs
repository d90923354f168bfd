//! Capacity-aware admission into a species collection.

use tracing::trace;

use natsel_agents::{Perceivable, Reproducing};

/// Append `entity`, first evicting its parents if the collection is full.
///
/// The cap is soft. Eviction removes whichever recorded parents are still in
/// the collection (possibly none), and the newcomer is appended either way,
/// so a full collection with no living parents grows by one.
///
/// Returns the number of entities evicted.
pub fn admit<T>(collection: &mut Vec<T>, entity: T, capacity: usize) -> usize
where
    T: Perceivable + Reproducing,
{
    let mut evicted: usize = 0;
    if collection.len() >= capacity {
        for parent in entity.parents().iter() {
            if let Some(index) = collection.iter().position(|e| e.id() == parent) {
                collection.remove(index);
                evicted = evicted.saturating_add(1);
                trace!(parent = %parent, child = %entity.id(), "parent evicted at capacity");
            }
        }
    }
    collection.push(entity);
    evicted
}
