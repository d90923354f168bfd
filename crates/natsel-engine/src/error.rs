//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: natsel_core::ConfigError,
    },

    /// The simulation rejected its configuration.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: natsel_core::SimError,
    },

    /// The tick loop could not run.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: natsel_core::runner::RunnerError,
    },
}
