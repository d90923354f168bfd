//! Read-only snapshots handed to the rendering collaborator.
//!
//! Snapshots are plain copies taken between ticks. Nothing in them refers
//! back into the live simulation, so a renderer can hold one for as long as
//! it likes while the engine keeps ticking.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Species;
use crate::ids::EntityId;

/// A food item as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FoodSnapshot {
    /// Entity identifier.
    pub id: EntityId,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Radius.
    pub size: f64,
    /// Remaining energy.
    pub energy: f64,
}

/// A prey or predator as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentSnapshot {
    /// Entity identifier.
    pub id: EntityId,
    /// Which mobile species this agent belongs to.
    pub species: Species,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Inherited vision stat.
    pub vision_stat: f64,
    /// Inherited size stat.
    pub size_stat: f64,
    /// Inherited speed stat.
    pub speed_stat: f64,
    /// Vision radius used for perception.
    pub effective_vision: f64,
    /// Body radius used for contact checks.
    pub effective_size: f64,
    /// Distance travelled per move.
    pub effective_speed: f64,
    /// Current energy.
    pub energy: f64,
    /// Energy ceiling.
    pub max_energy: f64,
    /// Ticks survived.
    pub age: u64,
    /// Number of successful eats.
    pub entity_consumed: u32,
    /// Current heading in radians.
    pub direction_angle: f64,
    /// Name of the action chosen on the last tick, if any.
    pub last_action: Option<String>,
    /// First parent, if any.
    pub parent_a: Option<EntityId>,
    /// Second parent, if any.
    pub parent_b: Option<EntityId>,
}

/// Mean inherited stats and energy over one living population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeciesAverages {
    /// Mean size stat.
    pub size: f64,
    /// Mean speed stat.
    pub speed: f64,
    /// Mean vision stat.
    pub vision: f64,
    /// Mean energy.
    pub energy: f64,
}

/// Head counts and per-species averages.
///
/// Averages are `None` when the population they describe is empty, so a
/// consumer never has to deal with a division by zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationStats {
    /// Number of live food items.
    pub food_count: u32,
    /// Number of live prey.
    pub prey_count: u32,
    /// Number of live predators.
    pub predator_count: u32,
    /// Prey averages, or `None` with no prey alive.
    pub prey: Option<SpeciesAverages>,
    /// Predator averages, or `None` with no predators alive.
    pub predator: Option<SpeciesAverages>,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Number of ticks completed since the last initialization.
    pub tick: u64,
    /// World width.
    pub width: f64,
    /// World height.
    pub height: f64,
    /// All live food.
    pub foods: Vec<FoodSnapshot>,
    /// All live prey.
    pub preys: Vec<AgentSnapshot>,
    /// All live predators.
    pub predators: Vec<AgentSnapshot>,
    /// Head counts and averages.
    pub stats: PopulationStats,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_serialize_missing_averages_as_null() {
        let stats = PopulationStats::default();
        let json = serde_json::to_value(stats).unwrap();
        assert!(json["prey"].is_null());
        assert!(json["predator"].is_null());
        assert_eq!(json["food_count"], 0);
    }

    #[test]
    fn world_snapshot_roundtrip() {
        let snapshot = WorldSnapshot {
            tick: 3,
            width: 800.0,
            height: 600.0,
            foods: Vec::new(),
            preys: Vec::new(),
            predators: Vec::new(),
            stats: PopulationStats::default(),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }
}
