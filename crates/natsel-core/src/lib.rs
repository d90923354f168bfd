//! Population management and the tick loop for the natural selection
//! simulator.
//!
//! This crate owns the three populations and drives them one tick at a time:
//! agents act, offspring are admitted, the dead are culled into fitness
//! leaderboards, and collapsed generations are rebuilt from them.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `natsel-config.yaml` and the
//!   flat string-keyed parameter surface.
//! - [`control`] -- Shared pause, stop, and pacing state for a run.
//! - [`leaderboard`] -- Bounded ranking of dead agents by fitness.
//! - [`population`] -- Capacity-aware admission with parent eviction.
//! - [`runner`] -- Async timer-driven tick loop.
//! - [`simulation`] -- [`Simulation`] and its tick phases.
//! - [`stats`] -- Head counts and per-species averages.

pub mod config;
pub mod control;
pub mod leaderboard;
pub mod population;
pub mod runner;
pub mod simulation;
pub mod stats;

pub use config::{ConfigError, SimulationConfig, TunableValue};
pub use control::{EndReason, RunControl};
pub use simulation::{SimError, Simulation, TickReport};
