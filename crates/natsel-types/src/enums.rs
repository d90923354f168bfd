//! Enumeration types for the simulator.
//!
//! Species tags, the reproduction mode switch, and the fixed action sets the
//! two mobile species choose from every tick. Action sets are ordered: the
//! order of `ALL` is the tie-break order when two actions score the same.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The three species sharing the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Species {
    /// Passive, decaying energy source.
    Food,
    /// Mobile agent that eats food and flees predators.
    Prey,
    /// Mobile apex agent that eats prey.
    Predator,
}

impl Species {
    /// Prefix used for this species in the flat configuration surface.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Prey => "Prey",
            Self::Predator => "Predator",
        }
    }
}

impl core::fmt::Display for Species {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a mobile species produces offspring.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum ReproductionMode {
    /// Asexual: a mutated clone of a single parent.
    #[serde(rename = "self")]
    SelfCloning,
    /// Sexual: a mutated average of two touching parents.
    #[default]
    #[serde(rename = "cross")]
    Cross,
}

impl ReproductionMode {
    /// Configuration spelling of this mode (`self` or `cross`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelfCloning => "self",
            Self::Cross => "cross",
        }
    }

    /// Parse the configuration spelling, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "self" => Some(Self::SelfCloning),
            "cross" => Some(Self::Cross),
            _ => None,
        }
    }
}

/// Actions available to prey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum PreyAction {
    /// Head toward the nearest visible food.
    MoveTowardsFood,
    /// Head directly away from the nearest visible predator.
    MoveAwayFromPredator,
    /// Head toward the nearest visible prey of the same species.
    MoveTowardsMate,
    /// Keep (or occasionally resample) the current heading.
    RandomMove,
}

impl PreyAction {
    /// Every prey action, in tie-break order.
    pub const ALL: [Self; 4] = [
        Self::MoveTowardsFood,
        Self::MoveAwayFromPredator,
        Self::MoveTowardsMate,
        Self::RandomMove,
    ];

    /// Stable action name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoveTowardsFood => "moveTowardsFood",
            Self::MoveAwayFromPredator => "moveAwayFromPredator",
            Self::MoveTowardsMate => "moveTowardsMate",
            Self::RandomMove => "randomMove",
        }
    }
}

/// Actions available to predators. There is no flee action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum PredatorAction {
    /// Head toward the nearest visible prey.
    MoveTowardsPrey,
    /// Head toward the nearest visible predator.
    MoveTowardsMate,
    /// Keep (or occasionally resample) the current heading.
    RandomMove,
}

impl PredatorAction {
    /// Every predator action, in tie-break order.
    pub const ALL: [Self; 3] = [Self::MoveTowardsPrey, Self::MoveTowardsMate, Self::RandomMove];

    /// Stable action name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoveTowardsPrey => "moveTowardsPrey",
            Self::MoveTowardsMate => "moveTowardsMate",
            Self::RandomMove => "randomMove",
        }
    }
}
