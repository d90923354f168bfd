//! Shared type definitions for the natural selection simulator.
//!
//! This crate holds the vocabulary every other crate speaks: entity
//! identifiers, species and action enumerations, and the read-only snapshot
//! structs handed to the rendering collaborator. Snapshot types derive
//! `ts-rs` bindings so the canvas renderer can consume them directly.
//!
//! # Modules
//!
//! - [`ids`] -- [`EntityId`] and the [`Parents`] lineage pair
//! - [`enums`] -- Species, reproduction mode, and per-species action sets
//! - [`snapshot`] -- Serializable world, entity, and statistics snapshots

pub mod enums;
pub mod ids;
pub mod snapshot;

pub use enums::{PredatorAction, PreyAction, ReproductionMode, Species};
pub use ids::{EntityId, Parents};
pub use snapshot::{AgentSnapshot, FoodSnapshot, PopulationStats, SpeciesAverages, WorldSnapshot};

#[cfg(test)]
mod tests {
    //! Binding generation for the rendering collaborator.

    #[test]
    fn export_bindings() {
        // ts-rs writes the TypeScript files into `bindings/` relative to the
        // crate root when `export_all` runs.
        use ts_rs::TS;

        assert!(crate::ids::EntityId::export_all().is_ok());
        assert!(crate::enums::Species::export_all().is_ok());
        assert!(crate::enums::ReproductionMode::export_all().is_ok());
        assert!(crate::enums::PreyAction::export_all().is_ok());
        assert!(crate::enums::PredatorAction::export_all().is_ok());
        assert!(crate::snapshot::FoodSnapshot::export_all().is_ok());
        assert!(crate::snapshot::AgentSnapshot::export_all().is_ok());
        assert!(crate::snapshot::SpeciesAverages::export_all().is_ok());
        assert!(crate::snapshot::PopulationStats::export_all().is_ok());
        assert!(crate::snapshot::WorldSnapshot::export_all().is_ok());
    }
}
