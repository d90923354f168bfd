//! Configuration loading and the flat tunable surface.
//!
//! The canonical configuration lives in `natsel-config.yaml` at the project
//! root. `world`, `population` and `logging` are typed sections with serde
//! defaults. `food`, `prey` and `predator` are maps of parameter name to
//! value, applied over the built-in species defaults through the same flat
//! surface the parameter panel writes to:
//!
//! ```yaml
//! prey:
//!   MUTATION_RATE: 6
//!   REPRODUCTION_TYPE: self
//! ```
//!
//! is equivalent to `set("Prey.MUTATION_RATE", 6)` followed by
//! `set("Prey.REPRODUCTION_TYPE", "self")`.
//!
//! Every flat key has the form `"<Section>.<PARAMETER>"` where the section
//! is one of `Simulation`, `Food`, `Prey` or `Predator`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use natsel_agents::{FoodConfig, SpeciesConfig};
use natsel_types::ReproductionMode;

/// Errors that can occur when loading or editing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Failed to read or write a flat JSON snapshot.
    #[error("invalid config snapshot JSON: {source}")]
    Json {
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The key does not name any tunable.
    #[error("unknown config key: {key}")]
    UnknownKey {
        /// The offending key.
        key: String,
    },

    /// The value has the wrong shape for the key.
    #[error("config key {key} expects a {expected} value")]
    TypeMismatch {
        /// The key being written.
        key: String,
        /// What the key accepts.
        expected: &'static str,
    },

    /// The value has the right shape but is out of range.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// The key being written or validated.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}

/// A tunable value as it appears in the flat surface.
///
/// Untagged, so a JSON object like `{"Prey.MUTATION_RATE": 4,
/// "Prey.REPRODUCTION_TYPE": "cross"}` reads and writes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TunableValue {
    /// A numeric parameter. Counts must be whole and non-negative.
    Number(f64),
    /// A textual parameter, currently only the reproduction mode.
    Text(String),
}

impl From<f64> for TunableValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for TunableValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for TunableValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A flat key-value snapshot of every tunable.
pub type FlatConfig = BTreeMap<String, TunableValue>;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level simulation configuration.
///
/// The simulation owns one of these and reads it on every tick, so edits
/// made between ticks apply to the next tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// World size, seed, and timing.
    pub world: WorldConfig,
    /// Initial counts, capacity caps, and leaderboard sizes.
    pub population: PopulationConfig,
    /// Food parameters.
    pub food: FoodConfig,
    /// Prey parameters.
    pub prey: SpeciesConfig,
    /// Predator parameters.
    pub predator: SpeciesConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            population: PopulationConfig::default(),
            food: FoodConfig::default(),
            prey: SpeciesConfig::prey(),
            predator: SpeciesConfig::predator(),
            logging: LoggingConfig::default(),
        }
    }
}

/// On-disk shape of `natsel-config.yaml`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    world: WorldConfig,
    #[serde(default)]
    population: PopulationConfig,
    #[serde(default)]
    food: FlatConfig,
    #[serde(default)]
    prey: FlatConfig,
    #[serde(default)]
    predator: FlatConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or any
    /// flat-surface error raised by a species section.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or the
    /// first error raised while applying and validating species sections.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yml::from_str(yaml)?;
        let mut config = Self {
            world: file.world,
            population: file.population,
            logging: file.logging,
            ..Self::default()
        };
        for (section, params) in [
            (Section::Food, &file.food),
            (Section::Prey, &file.prey),
            (Section::Predator, &file.predator),
        ] {
            for (param, value) in params {
                config.write(&format!("{}.{param}", section.as_str()), value)?;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Check every cross-field constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world.width > 0.0 && self.world.width.is_finite()) {
            return Err(invalid("World.WIDTH", "must be positive and finite"));
        }
        if !(self.world.height > 0.0 && self.world.height.is_finite()) {
            return Err(invalid("World.HEIGHT", "must be positive and finite"));
        }
        check_probability("Food.REPRODUCTION_PROBABILITY", self.food.reproduction_probability)?;
        check_non_negative("Food.DECAY_RATE", self.food.decay_rate)?;
        check_non_negative("Food.DEFAULT_SIZE", self.food.default_size)?;
        check_non_negative("Food.ENERGY_PER_SIZE", self.food.energy_per_size)?;
        validate_species(Section::Prey, &self.prey)?;
        validate_species(Section::Predator, &self.predator)
    }

    // -----------------------------------------------------------------------
    // Flat surface
    // -----------------------------------------------------------------------

    /// Every flat key, in a stable order.
    pub fn keys() -> Vec<String> {
        [
            (Section::Simulation, SIMULATION_PARAMS),
            (Section::Food, FOOD_PARAMS),
            (Section::Prey, SPECIES_PARAMS),
            (Section::Predator, SPECIES_PARAMS),
        ]
        .into_iter()
        .flat_map(|(section, params)| {
            params
                .iter()
                .map(move |p| format!("{}.{p}", section.as_str()))
        })
        .collect()
    }

    /// Read one tunable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] if `key` names no tunable.
    pub fn get(&self, key: &str) -> Result<TunableValue, ConfigError> {
        let (section, param) = split_key(key)?;
        let value = match section {
            Section::Simulation => self.population.get(param).map(TunableValue::from),
            Section::Food => food_get(&self.food, param).map(TunableValue::Number),
            Section::Prey => species_get(&self.prey, param),
            Section::Predator => species_get(&self.predator, param),
        };
        value.ok_or_else(|| unknown(key))
    }

    /// Write one tunable. A failed write leaves the config unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`], [`ConfigError::TypeMismatch`] or
    /// [`ConfigError::InvalidValue`].
    pub fn set(&mut self, key: &str, value: impl Into<TunableValue>) -> Result<(), ConfigError> {
        let mut next = self.clone();
        next.write(key, &value.into())?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Snapshot every tunable as a flat map.
    pub fn to_flat(&self) -> FlatConfig {
        Self::keys()
            .into_iter()
            .filter_map(|key| self.get(&key).ok().map(|value| (key, value)))
            .collect()
    }

    /// Apply a flat map of overrides atomically: either every entry applies
    /// or none does.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any entry or by validation.
    pub fn apply_flat(&mut self, values: &FlatConfig) -> Result<(), ConfigError> {
        let mut next = self.clone();
        for (key, value) in values {
            next.write(key, value)?;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Serialize the flat snapshot as JSON, the form the browser-side store
    /// persists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if serialization fails.
    pub fn to_flat_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&self.to_flat())?)
    }

    /// Apply a JSON flat snapshot atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON, or any error
    /// [`Self::apply_flat`] can raise.
    pub fn apply_flat_json(&mut self, json: &str) -> Result<(), ConfigError> {
        let values: FlatConfig = serde_json::from_str(json)?;
        self.apply_flat(&values)
    }

    /// Write without validation. Callers validate the whole config after.
    fn write(&mut self, key: &str, value: &TunableValue) -> Result<(), ConfigError> {
        let (section, param) = split_key(key)?;
        match section {
            Section::Simulation => {
                let count = count(key, value)?;
                if self.population.set(param, count) {
                    Ok(())
                } else {
                    Err(unknown(key))
                }
            }
            Section::Food => {
                let slot = food_slot(&mut self.food, param).ok_or_else(|| unknown(key))?;
                *slot = number(key, value)?;
                Ok(())
            }
            Section::Prey => species_set(&mut self.prey, key, param, value),
            Section::Predator => species_set(&mut self.predator, key, param, value),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed sections
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// World width.
    #[serde(default = "default_width")]
    pub width: f64,

    /// World height.
    #[serde(default = "default_height")]
    pub height: f64,

    /// Random seed for reproducible runs. Absent means seed from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks. Zero means run until stopped.
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: None,
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
        }
    }
}

/// Population sizes and caps.
///
/// Caps are soft: admission evicts the newcomer's parents when a collection
/// is full, then appends regardless.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Prey created by `initialize` (default: 20).
    #[serde(default = "default_initial_preys")]
    pub initial_preys: u32,

    /// Food created by `initialize`, and the size of each top-up batch
    /// (default: 200).
    #[serde(default = "default_initial_foods")]
    pub initial_foods: u32,

    /// Predators created by `initialize` (default: 10).
    #[serde(default = "default_initial_predators")]
    pub initial_predators: u32,

    /// Prey capacity (default: 30).
    #[serde(default = "default_max_preys")]
    pub max_preys: u32,

    /// Food capacity (default: 300).
    #[serde(default = "default_max_foods")]
    pub max_foods: u32,

    /// Predator capacity (default: 15).
    #[serde(default = "default_max_predators")]
    pub max_predators: u32,

    /// Food count below which a top-up batch is added (default: 10).
    #[serde(default = "default_minimum_food_count")]
    pub minimum_food_count: u32,

    /// Prey leaderboard size (default: 10).
    #[serde(default = "default_max_fittest_preys")]
    pub max_fittest_preys: u32,

    /// Predator leaderboard size (default: 5).
    #[serde(default = "default_max_fittest_predators")]
    pub max_fittest_predators: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_preys: default_initial_preys(),
            initial_foods: default_initial_foods(),
            initial_predators: default_initial_predators(),
            max_preys: default_max_preys(),
            max_foods: default_max_foods(),
            max_predators: default_max_predators(),
            minimum_food_count: default_minimum_food_count(),
            max_fittest_preys: default_max_fittest_preys(),
            max_fittest_predators: default_max_fittest_predators(),
        }
    }
}

impl PopulationConfig {
    fn get(&self, param: &str) -> Option<u32> {
        match param {
            "INITIAL_PREYS" => Some(self.initial_preys),
            "INITIAL_FOODS" => Some(self.initial_foods),
            "INITIAL_PREDATORS" => Some(self.initial_predators),
            "MAX_PREYS" => Some(self.max_preys),
            "MAX_FOODS" => Some(self.max_foods),
            "MAX_PREDATORS" => Some(self.max_predators),
            "MINIMUM_FOOD_COUNT" => Some(self.minimum_food_count),
            "MAX_FITTEST_PREYS_FROM_LAST_GENERATION" => Some(self.max_fittest_preys),
            "MAX_FITTEST_PREDATORS_FROM_LAST_GENERATION" => Some(self.max_fittest_predators),
            _ => None,
        }
    }

    fn set(&mut self, param: &str, value: u32) -> bool {
        let slot = match param {
            "INITIAL_PREYS" => &mut self.initial_preys,
            "INITIAL_FOODS" => &mut self.initial_foods,
            "INITIAL_PREDATORS" => &mut self.initial_predators,
            "MAX_PREYS" => &mut self.max_preys,
            "MAX_FOODS" => &mut self.max_foods,
            "MAX_PREDATORS" => &mut self.max_predators,
            "MINIMUM_FOOD_COUNT" => &mut self.minimum_food_count,
            "MAX_FITTEST_PREYS_FROM_LAST_GENERATION" => &mut self.max_fittest_preys,
            "MAX_FITTEST_PREDATORS_FROM_LAST_GENERATION" => &mut self.max_fittest_predators,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Logging configuration for the engine binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (default: `"info"`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit a population summary every this many ticks (default: 100).
    /// Zero limits the summary to generations that regenerate.
    #[serde(default = "default_stats_interval")]
    pub stats_interval: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            stats_interval: default_stats_interval(),
        }
    }
}

// ---------------------------------------------------------------------------
// Flat key plumbing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Simulation,
    Food,
    Prey,
    Predator,
}

impl Section {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Simulation => "Simulation",
            Self::Food => "Food",
            Self::Prey => "Prey",
            Self::Predator => "Predator",
        }
    }
}

const SIMULATION_PARAMS: &[&str] = &[
    "INITIAL_PREYS",
    "INITIAL_FOODS",
    "INITIAL_PREDATORS",
    "MAX_PREYS",
    "MAX_FOODS",
    "MAX_PREDATORS",
    "MINIMUM_FOOD_COUNT",
    "MAX_FITTEST_PREYS_FROM_LAST_GENERATION",
    "MAX_FITTEST_PREDATORS_FROM_LAST_GENERATION",
];

const FOOD_PARAMS: &[&str] = &[
    "DEFAULT_SIZE",
    "REPRODUCTION_PROBABILITY",
    "DECAY_RATE",
    "ENERGY_PER_SIZE",
];

const SPECIES_PARAMS: &[&str] = &[
    "DEFAULT_VISION_STAT",
    "DEFAULT_SIZE_STAT",
    "DEFAULT_SPEED_STAT",
    "MUTATION_RATE",
    "MIN_MUTATED_VALUE",
    "MAX_MUTATED_VALUE",
    "DEFAULT_SELF_REPRODUCTION_PROBABILITY",
    "DEFAULT_CROSS_REPRODUCTION_PROBABILITY",
    "REPRODUCTION_TYPE",
    "CHANGE_DIRECTION_PROBABILITY",
    "LEARNING_RATE",
    "DISCOUNT_FACTOR",
];

fn split_key(key: &str) -> Result<(Section, &str), ConfigError> {
    let (section, param) = key.split_once('.').ok_or_else(|| unknown(key))?;
    let section = match section {
        "Simulation" => Section::Simulation,
        "Food" => Section::Food,
        "Prey" => Section::Prey,
        "Predator" => Section::Predator,
        _ => return Err(unknown(key)),
    };
    Ok((section, param))
}

fn food_get(cfg: &FoodConfig, param: &str) -> Option<f64> {
    match param {
        "DEFAULT_SIZE" => Some(cfg.default_size),
        "REPRODUCTION_PROBABILITY" => Some(cfg.reproduction_probability),
        "DECAY_RATE" => Some(cfg.decay_rate),
        "ENERGY_PER_SIZE" => Some(cfg.energy_per_size),
        _ => None,
    }
}

fn food_slot<'a>(cfg: &'a mut FoodConfig, param: &str) -> Option<&'a mut f64> {
    match param {
        "DEFAULT_SIZE" => Some(&mut cfg.default_size),
        "REPRODUCTION_PROBABILITY" => Some(&mut cfg.reproduction_probability),
        "DECAY_RATE" => Some(&mut cfg.decay_rate),
        "ENERGY_PER_SIZE" => Some(&mut cfg.energy_per_size),
        _ => None,
    }
}

fn species_get(cfg: &SpeciesConfig, param: &str) -> Option<TunableValue> {
    if param == "REPRODUCTION_TYPE" {
        return Some(TunableValue::from(cfg.reproduction_mode.as_str()));
    }
    let value = match param {
        "DEFAULT_VISION_STAT" => cfg.default_vision_stat,
        "DEFAULT_SIZE_STAT" => cfg.default_size_stat,
        "DEFAULT_SPEED_STAT" => cfg.default_speed_stat,
        "MUTATION_RATE" => cfg.mutation_rate,
        "MIN_MUTATED_VALUE" => cfg.min_mutated_value,
        "MAX_MUTATED_VALUE" => cfg.max_mutated_value,
        "DEFAULT_SELF_REPRODUCTION_PROBABILITY" => cfg.self_reproduction_probability,
        "DEFAULT_CROSS_REPRODUCTION_PROBABILITY" => cfg.cross_reproduction_probability,
        "CHANGE_DIRECTION_PROBABILITY" => cfg.change_direction_probability,
        "LEARNING_RATE" => cfg.policy.learning_rate,
        "DISCOUNT_FACTOR" => cfg.policy.discount,
        _ => return None,
    };
    Some(TunableValue::Number(value))
}

fn species_set(
    cfg: &mut SpeciesConfig,
    key: &str,
    param: &str,
    value: &TunableValue,
) -> Result<(), ConfigError> {
    if param == "REPRODUCTION_TYPE" {
        let TunableValue::Text(text) = value else {
            return Err(mismatch(key, "text"));
        };
        cfg.reproduction_mode = ReproductionMode::parse(text)
            .ok_or_else(|| invalid(key, "expected \"self\" or \"cross\""))?;
        return Ok(());
    }
    let slot = match param {
        "DEFAULT_VISION_STAT" => &mut cfg.default_vision_stat,
        "DEFAULT_SIZE_STAT" => &mut cfg.default_size_stat,
        "DEFAULT_SPEED_STAT" => &mut cfg.default_speed_stat,
        "MUTATION_RATE" => &mut cfg.mutation_rate,
        "MIN_MUTATED_VALUE" => &mut cfg.min_mutated_value,
        "MAX_MUTATED_VALUE" => &mut cfg.max_mutated_value,
        "DEFAULT_SELF_REPRODUCTION_PROBABILITY" => &mut cfg.self_reproduction_probability,
        "DEFAULT_CROSS_REPRODUCTION_PROBABILITY" => &mut cfg.cross_reproduction_probability,
        "CHANGE_DIRECTION_PROBABILITY" => &mut cfg.change_direction_probability,
        "LEARNING_RATE" => &mut cfg.policy.learning_rate,
        "DISCOUNT_FACTOR" => &mut cfg.policy.discount,
        _ => return Err(unknown(key)),
    };
    *slot = number(key, value)?;
    Ok(())
}

fn validate_species(section: Section, cfg: &SpeciesConfig) -> Result<(), ConfigError> {
    let key = |param: &str| format!("{}.{param}", section.as_str());
    check_non_negative(&key("MUTATION_RATE"), cfg.mutation_rate)?;
    check_probability(
        &key("DEFAULT_SELF_REPRODUCTION_PROBABILITY"),
        cfg.self_reproduction_probability,
    )?;
    check_probability(
        &key("DEFAULT_CROSS_REPRODUCTION_PROBABILITY"),
        cfg.cross_reproduction_probability,
    )?;
    check_probability(&key("CHANGE_DIRECTION_PROBABILITY"), cfg.change_direction_probability)?;
    check_probability(&key("LEARNING_RATE"), cfg.policy.learning_rate)?;
    check_probability(&key("DISCOUNT_FACTOR"), cfg.policy.discount)?;
    for (param, value) in [
        ("DEFAULT_VISION_STAT", cfg.default_vision_stat),
        ("DEFAULT_SIZE_STAT", cfg.default_size_stat),
        ("DEFAULT_SPEED_STAT", cfg.default_speed_stat),
        ("MIN_MUTATED_VALUE", cfg.min_mutated_value),
        ("MAX_MUTATED_VALUE", cfg.max_mutated_value),
    ] {
        if !value.is_finite() {
            return Err(invalid(&key(param), "must be finite"));
        }
    }
    if cfg.min_mutated_value > cfg.max_mutated_value {
        return Err(invalid(
            &key("MIN_MUTATED_VALUE"),
            "must not exceed MAX_MUTATED_VALUE",
        ));
    }
    Ok(())
}

fn number(key: &str, value: &TunableValue) -> Result<f64, ConfigError> {
    match value {
        TunableValue::Number(n) => Ok(*n),
        TunableValue::Text(_) => Err(mismatch(key, "number")),
    }
}

fn count(key: &str, value: &TunableValue) -> Result<u32, ConfigError> {
    let n = number(key, value)?;
    if !(n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX)) {
        return Err(invalid(key, "must be a whole number between 0 and 4294967295"));
    }
    // Safe: n is a whole number in [0, u32::MAX].
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let whole = n as u32;
    Ok(whole)
}

fn check_probability(key: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(key, "must be within [0, 1]"))
    }
}

fn check_non_negative(key: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(key, "must be non-negative and finite"))
    }
}

fn unknown(key: &str) -> ConfigError {
    ConfigError::UnknownKey { key: key.to_owned() }
}

fn mismatch(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::TypeMismatch {
        key: key.to_owned(),
        expected,
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        reason: reason.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

const fn default_width() -> f64 {
    1200.0
}

const fn default_height() -> f64 {
    800.0
}

const fn default_tick_interval_ms() -> u64 {
    50
}

const fn default_initial_preys() -> u32 {
    20
}

const fn default_initial_foods() -> u32 {
    200
}

const fn default_initial_predators() -> u32 {
    10
}

const fn default_max_preys() -> u32 {
    30
}

const fn default_max_foods() -> u32 {
    300
}

const fn default_max_predators() -> u32 {
    15
}

const fn default_minimum_food_count() -> u32 {
    10
}

const fn default_max_fittest_preys() -> u32 {
    10
}

const fn default_max_fittest_predators() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_stats_interval() -> u64 {
    100
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.population.max_preys, 30);
        assert_eq!(config.population.initial_foods, 200);
        assert_eq!(config.population.max_fittest_predators, 5);
        assert!(config.world.seed.is_none());
    }

    #[test]
    fn yaml_sections_override_defaults() {
        let yaml = r"
world:
  width: 640
  height: 480
  seed: 7
population:
  max_preys: 50
prey:
  MUTATION_RATE: 6
  REPRODUCTION_TYPE: self
predator:
  DEFAULT_SPEED_STAT: 20
food:
  DECAY_RATE: 0.5
logging:
  level: debug
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(close(config.world.width, 640.0));
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.population.max_preys, 50);
        assert_eq!(config.population.max_foods, 300);
        assert!(close(config.prey.mutation_rate, 6.0));
        assert_eq!(config.prey.reproduction_mode, ReproductionMode::SelfCloning);
        assert!(close(config.predator.default_speed_stat, 20.0));
        assert!(close(config.predator.mutation_rate, 4.0));
        assert!(close(config.food.decay_rate, 0.5));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = SimulationConfig::parse(include_str!("../../../natsel-config.yaml")).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn yaml_with_unknown_species_param_is_rejected() {
        let err = SimulationConfig::parse("prey:\n  WINGSPAN: 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey { ref key } if key == "Prey.WINGSPAN"));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = SimulationConfig::parse("world: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut config = SimulationConfig::default();
        assert_eq!(config.get("Simulation.MAX_PREYS").unwrap(), TunableValue::Number(30.0));
        config.set("Simulation.MAX_PREYS", 45_u32).unwrap();
        assert_eq!(config.population.max_preys, 45);

        config.set("Prey.REPRODUCTION_TYPE", "self").unwrap();
        assert_eq!(config.get("Prey.REPRODUCTION_TYPE").unwrap(), TunableValue::from("self"));

        config.set("Food.DECAY_RATE", 0.2).unwrap();
        assert!(close(config.food.decay_rate, 0.2));
    }

    #[test]
    fn failed_set_leaves_config_unchanged() {
        let mut config = SimulationConfig::default();
        let before = config.clone();

        assert!(matches!(
            config.set("Prey.NOPE", 1.0),
            Err(ConfigError::UnknownKey { .. })
        ));
        assert!(matches!(
            config.set("Prey.MUTATION_RATE", "fast"),
            Err(ConfigError::TypeMismatch { .. })
        ));
        assert!(matches!(
            config.set("Prey.REPRODUCTION_TYPE", "budding"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("Predator.DEFAULT_CROSS_REPRODUCTION_PROBABILITY", 1.5),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("Simulation.MAX_FOODS", 2.5),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("Prey.MIN_MUTATED_VALUE", 60.0),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(config.set("NoSection", 1.0), Err(ConfigError::UnknownKey { .. })));
        assert_eq!(config, before);
    }

    #[test]
    fn every_key_is_readable() {
        let config = SimulationConfig::default();
        let keys = SimulationConfig::keys();
        assert_eq!(
            keys.len(),
            SIMULATION_PARAMS.len() + FOOD_PARAMS.len() + 2 * SPECIES_PARAMS.len()
        );
        for key in &keys {
            assert!(config.get(key).is_ok(), "{key} not readable");
        }
        assert_eq!(config.to_flat().len(), keys.len());
    }

    #[test]
    fn flat_json_snapshot_round_trips() {
        let mut original = SimulationConfig::default();
        original.set("Predator.MUTATION_RATE", 9.0).unwrap();
        original.set("Prey.REPRODUCTION_TYPE", "self").unwrap();
        let json = original.to_flat_json().unwrap();

        let mut restored = SimulationConfig::default();
        restored.apply_flat_json(&json).unwrap();
        assert_eq!(restored.to_flat(), original.to_flat());
    }

    #[test]
    fn apply_flat_is_atomic() {
        let mut config = SimulationConfig::default();
        let mut values = FlatConfig::new();
        values.insert("Prey.MUTATION_RATE".to_owned(), TunableValue::Number(8.0));
        values.insert("Prey.UNKNOWN".to_owned(), TunableValue::Number(1.0));
        assert!(config.apply_flat(&values).is_err());
        assert!(close(config.prey.mutation_rate, 4.0));
    }

    #[test]
    fn validate_rejects_bad_world() {
        let mut config = SimulationConfig::default();
        config.world.width = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }
}
