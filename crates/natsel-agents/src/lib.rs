//! Entity behaviour for the natural selection simulator.
//!
//! This crate knows how a single food item, prey, or predator behaves for
//! one tick given borrowed views of its surroundings. It does not own any
//! population; admission, culling, and regeneration live in `natsel-core`.
//!
//! # Modules
//!
//! - [`config`] -- Per-species tunables and energy formulas
//! - [`entity`] -- Positions, bounds, and the capability traits
//! - [`genetics`] -- Base and effective stats, bounded mutation
//! - [`policy`] -- Tabular action-value learning
//! - [`perception`] -- Visibility queries and policy state quantization
//! - [`locomotion`] -- Headings and bounded movement
//! - [`body`] -- State shared by both mobile species
//! - [`food`] -- Decaying, spreading food
//! - [`prey`] -- Prey decision loop
//! - [`predator`] -- Predator decision loop

pub mod body;
pub mod config;
pub mod entity;
pub mod food;
pub mod genetics;
pub mod locomotion;
pub mod perception;
pub mod policy;
pub mod predator;
pub mod prey;

pub use body::Body;
pub use config::{EnergyFactors, FoodConfig, MovementCostWeights, PolicyConfig, SpeciesConfig};
pub use entity::{Bounds, Consumable, EntityRef, Perceivable, Position, Reproducing};
pub use food::Food;
pub use genetics::{BaseStats, Birth, EffectiveStats};
pub use perception::Peers;
pub use policy::QTable;
pub use predator::{Predator, PredatorWorld};
pub use prey::{Prey, PreyWorld};
