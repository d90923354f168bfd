//! Identifiers and lineage records.
//!
//! Every entity in the simulation carries an [`EntityId`] that never
//! changes for its lifetime. Identifiers are drawn from the simulation's
//! injected random source rather than the OS so that a seeded run hands
//! out the same ids every time.
//!
//! Parent links are plain id values, not references. An id that no longer
//! resolves to a live entity simply means that lineage is gone.

use rand::Rng;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for a food item, prey, or predator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random (version 4) identifier from the given source.
    pub fn random(rng: &mut impl Rng) -> Self {
        let mut bytes = [0_u8; 16];
        rng.fill(&mut bytes);
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EntityId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<EntityId> for Uuid {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// The two parent slots recorded on every entity.
///
/// `None` in a slot means "no parent". Entities created at initialization
/// have no parents; asexual offspring record the same parent in both slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Parents([Option<EntityId>; 2]);

impl Parents {
    /// Parents of a founder entity: both slots empty.
    pub const fn none() -> Self {
        Self([None, None])
    }

    /// Parents of an entity with two distinct contributors.
    pub const fn pair(first: EntityId, second: EntityId) -> Self {
        Self([Some(first), Some(second)])
    }

    /// Parents of an asexually produced entity: the same id twice.
    pub const fn asexual(parent: EntityId) -> Self {
        Self([Some(parent), Some(parent)])
    }

    /// The first parent slot.
    pub const fn first(&self) -> Option<EntityId> {
        self.0[0]
    }

    /// The second parent slot.
    pub const fn second(&self) -> Option<EntityId> {
        self.0[1]
    }

    /// Iterate over the occupied parent slots, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.0.iter().flatten().copied()
    }

    /// Whether both slots are empty.
    pub const fn is_founder(&self) -> bool {
        self.0[0].is_none() && self.0[1].is_none()
    }
}
